pub mod auth;
pub mod employees;

pub use auth::*;
pub use employees::*;
