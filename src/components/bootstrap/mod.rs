mod reducer;

use crate::environment::Environment;
use crate::store::{Effect, Reducer};

pub use reducer::{BootstrapAction, BootstrapReducer, BootstrapRequest, BootstrapState};

impl Reducer for BootstrapReducer {
    type Action = BootstrapAction;
    type State = BootstrapState;
    type Environment = Environment;

    fn reduce(
        action: Self::Action,
        state: &mut Self::State,
        environment: &Self::Environment,
    ) -> Effect<Self::Action> {
        reducer::reduce(action, state, environment)
    }

    fn initial_action() -> Option<Self::Action> {
        Some(BootstrapAction::Initialize)
    }
}

pub type BootstrapStore = crate::store::Store<BootstrapReducer>;
