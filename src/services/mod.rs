pub mod account_service;
pub mod attempt_service;
pub mod dashboard_service;
pub mod quiz_service;
pub mod scoring_service;
pub mod task_service;
