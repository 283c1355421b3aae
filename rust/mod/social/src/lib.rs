//! Social module: users, follow edges, tweets, likes, media and the feed.
//!
//! # Resources
//!
//! - **User**: identity keyed by the caller's opaque token, created on first use
//! - **Follow**: directed edge, visible as `following` / `followers`
//! - **Tweet**: short text with ordered media attachments and likes
//! - **Media**: uploaded file referenced by id
//!
//! # Usage
//!
//! ```ignore
//! use social::{SocialModule, service::SocialConfig};
//!
//! let module = SocialModule::new(sql, blob, auth, SocialConfig::default())?;
//! let router = module.routes(); // Mount under /api
//! ```

pub mod model;
pub mod service;
pub mod api;

use std::sync::Arc;

use axum::Router;

use chirp_blob::BlobStore;
use chirp_core::{Authenticator, Module, ServiceError};
use chirp_sql::SQLStore;

use crate::service::{SocialConfig, SocialService};

/// Social module implementing the Module trait.
pub struct SocialModule {
    service: Arc<SocialService>,
    auth: Arc<dyn Authenticator>,
}

impl SocialModule {
    /// Create the module, initializing its schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        blob: Arc<dyn BlobStore>,
        auth: Arc<dyn Authenticator>,
        config: SocialConfig,
    ) -> Result<Self, ServiceError> {
        let service = SocialService::new(sql, blob, config)?;
        Ok(Self { service, auth })
    }

    pub fn service(&self) -> &Arc<SocialService> {
        &self.service
    }
}

impl Module for SocialModule {
    fn name(&self) -> &str {
        "api"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone(), self.auth.clone())
    }
}
