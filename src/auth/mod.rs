// Authentication module
// JWT-based authentication: login, token refresh, registration, and the
// role guards protecting every other endpoint

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

pub use error::AuthError;
pub use middleware::{CurrentUser, MaintainerUser, RoleRequirement, RootUser, WorkerUser};
pub use models::{TokenPair, User, UserResponse};
pub use repository::{PgUserStore, UserStore};
pub use service::AuthService;
pub use token::{TokenCodec, TokenKind};
