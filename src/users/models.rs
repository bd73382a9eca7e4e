// User administration DTOs

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Self-service profile update; omitted fields keep their current values
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserUpdate {
    #[validate(length(max = 32))]
    pub password: Option<String>,
    #[validate(length(max = 254))]
    pub full_name: Option<String>,
}

/// Maintainer/root update of another account. Role flags are optional;
/// `is_root` changes are additionally gated on the caller being root.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserUpdateAdmin {
    #[validate(length(max = 32))]
    pub password: Option<String>,
    #[validate(length(max = 254))]
    pub full_name: Option<String>,
    pub is_maintainer: Option<bool>,
    pub is_root: Option<bool>,
}
