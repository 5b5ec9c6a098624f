pub mod auth_service;
pub mod chat_service;
pub mod notification_service;
pub mod polling;
pub mod review_service;
pub mod status_workflow;
pub mod work_request_service;
