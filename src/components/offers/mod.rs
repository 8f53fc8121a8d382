mod reducer;

use crate::environment::Environment;
use crate::store::{Effect, Reducer};

pub use reducer::{OffersAction, OffersReducer, OffersRequest, OffersState};

impl Reducer for OffersReducer {
    type Action = OffersAction;
    type State = OffersState;
    type Environment = Environment;

    fn reduce(
        action: Self::Action,
        state: &mut Self::State,
        environment: &Self::Environment,
    ) -> Effect<Self::Action> {
        reducer::reduce(action, state, environment)
    }
}

pub type OffersStore = crate::store::Store<OffersReducer>;
