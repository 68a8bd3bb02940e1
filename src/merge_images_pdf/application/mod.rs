pub mod config;
pub mod error;
pub mod merge_service;
