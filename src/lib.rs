pub mod core;
pub mod main_module;
pub mod organizations;
pub mod recordings;
pub mod security;
pub mod store;
