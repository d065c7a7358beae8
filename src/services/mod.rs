pub mod auth_service;
pub mod file_service;
pub mod storage;
