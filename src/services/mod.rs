pub mod auth_service;
pub mod email_service;
