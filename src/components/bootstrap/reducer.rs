use crate::environment::repository::StorageError;
use crate::environment::Environment;
use crate::store::{Effect, Lifecycle, Ticket};

pub struct BootstrapReducer;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum BootstrapRequest {
    StoredToken,
}

#[derive(Debug)]
pub enum BootstrapAction {
    Initialize,
    Initialized(Ticket<BootstrapRequest>, Result<Option<String>, StorageError>),
}

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct BootstrapState {
    pub is_ready: bool,
    pub base_url: Option<String>,
    /// The token found in storage, to be handed to the auth slice
    pub restored_token: Option<String>,
    pub status: Lifecycle<BootstrapRequest>,
}

pub fn reduce(
    action: BootstrapAction,
    state: &mut BootstrapState,
    environment: &Environment,
) -> Effect<BootstrapAction> {
    log::trace!("{action:?}");
    match action {
        BootstrapAction::Initialize => {
            state.is_ready = false;
            state.base_url = Some(environment.config.base_url.clone());
            let ticket = state.status.pending(BootstrapRequest::StoredToken);
            let repository = environment.repository.clone();
            Effect::future(async move { repository.token() }, move |result| {
                BootstrapAction::Initialized(ticket, result)
            })
        }
        BootstrapAction::Initialized(ticket, result) => {
            if !state.status.settle(&ticket) {
                return Effect::NONE;
            }
            match result {
                Ok(token) => {
                    log::info!(
                        "Ready, {}",
                        if token.is_some() {
                            "found a stored session"
                        } else {
                            "no stored session"
                        }
                    );
                    state.restored_token = token.filter(|t| !t.trim().is_empty());
                }
                Err(e) => {
                    // An unreadable store still lets the app start, logged out.
                    state.restored_token = None;
                    state.status.reject(e);
                }
            }
            state.is_ready = true;
            Effect::NONE
        }
    }
}
