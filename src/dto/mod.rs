pub mod account_dto;
pub mod dashboard_dto;
pub mod quiz_dto;
pub mod task_dto;
