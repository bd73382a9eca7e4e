// HealthStack data models and DTOs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// HealthStack database model: a monitored group of domains owned by a user,
/// optionally assigned to one worker account.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct HealthStack {
    pub id: i32,
    pub custom_name: Option<String>,
    pub domains: Vec<String>,
    pub delay_between_checks: i32,
    pub emails_to_alert: Vec<String>,
    pub user_id: i32,
    pub worker_id: Option<i32>,
}

/// HealthStack creation DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateHealthStack {
    #[validate(length(max = 254))]
    pub custom_name: Option<String>,
    #[validate(length(min = 1))]
    pub domains: Vec<String>,
    /// Seconds between checks, 2 to 60 inclusive
    #[validate(range(min = 2, max = 60))]
    pub delay_between_checks: i32,
    pub emails_to_alert: Vec<String>,
}

/// Pagination query parameters shared by the list endpoints
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct Pagination {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}
