mod reducer;

use crate::environment::Environment;
use crate::store::{Effect, Reducer};

pub use reducer::{AuthAction, AuthReducer, AuthRequest, AuthState};

impl Reducer for AuthReducer {
    type Action = AuthAction;
    type State = AuthState;
    type Environment = Environment;

    fn reduce(
        action: Self::Action,
        state: &mut Self::State,
        environment: &Self::Environment,
    ) -> Effect<Self::Action> {
        reducer::reduce(action, state, environment)
    }
}

pub type AuthStore = crate::store::Store<AuthReducer>;
