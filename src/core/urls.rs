#[derive(Debug)]
pub struct ApiUrls;

impl ApiUrls {
    pub const HEALTH: &'static str = "/health";

    // Company credentials
    pub const TOKEN: &'static str = "/token";
    pub const TOKEN_REFRESH: &'static str = "/token/refresh";

    // Roster
    pub const EMPLOYEES: &'static str = "/employees";
    pub const EMPLOYEES_BULK: &'static str = "/employees/bulk";
    pub const EMPLOYEE_BY_ID: &'static str = "/employees/:id";

    // Recordings
    pub const USER_RECORDING: &'static str = "/users/:emp_no/recording";
}
