pub mod config;
pub mod model;
pub mod multipart;
pub mod repository;
pub mod session;
pub mod types;

use std::sync::Arc;

pub use config::Config;
pub use model::{ApiError, Model, PartnerApi};
pub use repository::Repository;
pub use session::SessionContext;

/// Everything the reducers need from the outside world. Cheap to clone; all
/// stores share the same session and repository.
#[derive(Clone, Debug)]
pub struct Environment {
    pub model: Model,
    pub repository: Repository,
    pub session: SessionContext,
    pub config: Config,
}

impl Environment {
    pub fn new(config: Config, repository: Repository) -> Result<Self, ApiError> {
        let session = SessionContext::default();
        let model = Model::new(&config, session.clone())?;
        Ok(Self {
            model,
            repository,
            session,
            config,
        })
    }

    /// Use a different backend, e.g. an in-memory one.
    pub fn with_api(config: Config, repository: Repository, api: Arc<dyn PartnerApi>) -> Self {
        let model = Model::with_client(config.base_url.clone(), api);
        Self {
            model,
            repository,
            session: SessionContext::default(),
            config,
        }
    }
}
