pub mod auth;
pub mod config;
pub mod error;
pub mod module;

pub use auth::{ApiKeyHeader, Authenticator};
pub use config::ServiceConfig;
pub use error::ServiceError;
pub use module::Module;
