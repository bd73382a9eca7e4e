// HealthStack module
// Monitored domain groups owned by users, each optionally assigned one worker

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

pub use error::StackError;
pub use models::{CreateHealthStack, HealthStack, Pagination};
pub use repository::HealthStackRepository;
