diesel::table! {
    companies (id) {
        id -> Uuid,
        biz_no -> Text,
        name -> Text,
        password_hash -> Text,
        is_active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    employees (id) {
        id -> Uuid,
        company_id -> Uuid,
        emp_no -> Text,
        name -> Text,
        dept -> Text,
        phone -> Text,
        email -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    motion_types (id) {
        id -> Uuid,
        motion_name -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    courses (id) {
        id -> Uuid,
        title -> Text,
        description -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    user_recordings (id) {
        id -> Uuid,
        employee_id -> Uuid,
        motion_type_id -> Uuid,
        score -> Float8,
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    enrollments (id) {
        id -> Uuid,
        employee_id -> Uuid,
        course_id -> Uuid,
        status -> Bool,
        enrolled_at -> Timestamptz,
    }
}

diesel::joinable!(employees -> companies (company_id));
diesel::joinable!(user_recordings -> employees (employee_id));
diesel::joinable!(user_recordings -> motion_types (motion_type_id));
diesel::joinable!(enrollments -> employees (employee_id));
diesel::joinable!(enrollments -> courses (course_id));

diesel::allow_tables_to_appear_in_same_query!(
    companies,
    employees,
    motion_types,
    courses,
    user_recordings,
    enrollments,
);
