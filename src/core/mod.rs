pub mod config;
pub mod middleware;
pub mod shared;
pub mod urls;
