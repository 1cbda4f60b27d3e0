pub mod attempt_service;
pub mod question_service;
pub mod ranking_service;
pub mod session_service;
