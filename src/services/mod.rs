pub mod auth_service;
pub mod error;
pub mod ownership;
pub mod projection;
pub mod resource_service;

pub use auth_service::{AuthService, LoginResponse};
pub use error::{ServiceError, ServiceResult};
pub use ownership::OwnershipGuard;
pub use projection::ProjectionExecutor;
pub use resource_service::{ResourceService, Scope};
