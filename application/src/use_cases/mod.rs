//! Use cases (application services)

pub mod attach_document;
pub mod run_round;
pub mod session_service;
