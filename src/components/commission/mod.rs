pub mod categories;
mod reducer;

use crate::environment::Environment;
use crate::store::{Effect, Reducer};

pub use categories::{category_of, Category, CategoryTable};
pub use reducer::{CommissionAction, CommissionReducer, CommissionRequest, CommissionState};

impl Reducer for CommissionReducer {
    type Action = CommissionAction;
    type State = CommissionState;
    type Environment = Environment;

    fn reduce(
        action: Self::Action,
        state: &mut Self::State,
        environment: &Self::Environment,
    ) -> Effect<Self::Action> {
        reducer::reduce(action, state, environment)
    }
}

pub type CommissionStore = crate::store::Store<CommissionReducer>;
