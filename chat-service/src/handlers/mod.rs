pub mod chat;
pub mod health;
pub mod history;

pub use chat::submit_chat;
pub use health::{health_check, readiness_check, route_not_found, service_status};
pub use history::{delete_history, get_history};
