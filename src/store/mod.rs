//! A small reducer runtime: actions are applied strictly one after another,
//! effects run cooperatively on the calling task and feed their result back
//! in as actions.

mod effect;
mod fence;
mod lifecycle;

pub use effect::Effect;
pub use fence::{RequestFence, RequestId, Ticket};
pub use lifecycle::Lifecycle;

use std::collections::VecDeque;

use futures_util::future::BoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};

pub trait Reducer {
    type Action: std::fmt::Debug + Send + 'static;
    type State;
    type Environment;

    fn reduce(
        action: Self::Action,
        state: &mut Self::State,
        environment: &Self::Environment,
    ) -> Effect<Self::Action>;

    fn initial_action() -> Option<Self::Action> {
        None
    }
}

pub struct Store<R: Reducer> {
    state: R::State,
    environment: R::Environment,
    in_flight: FuturesUnordered<BoxFuture<'static, R::Action>>,
}

impl<R: Reducer> Store<R> {
    pub fn new(state: R::State, environment: R::Environment) -> Self {
        let mut store = Self {
            state,
            environment,
            in_flight: FuturesUnordered::new(),
        };
        if let Some(action) = R::initial_action() {
            store.send(action);
        }
        store
    }

    pub fn state(&self) -> &R::State {
        &self.state
    }

    pub fn environment(&self) -> &R::Environment {
        &self.environment
    }

    /// Applies the action and every synchronous follow-up. Futures are
    /// queued and only make progress in [`Store::next`] / [`Store::settle`].
    pub fn send(&mut self, action: R::Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            let effect = R::reduce(action, &mut self.state, &self.environment);
            self.schedule(effect, &mut queue);
        }
    }

    fn schedule(&mut self, effect: Effect<R::Action>, queue: &mut VecDeque<R::Action>) {
        match effect {
            Effect::Nothing => (),
            Effect::Action(action) => queue.push_back(action),
            Effect::Future(future) => self.in_flight.push(future),
            Effect::Multiple(effects) => {
                for effect in effects {
                    self.schedule(effect, queue);
                }
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Waits for the next effect to resolve and applies its action.
    /// Returns `false` once nothing is in flight.
    pub async fn next(&mut self) -> bool {
        match self.in_flight.next().await {
            Some(action) => {
                self.send(action);
                true
            }
            None => false,
        }
    }

    pub async fn settle(&mut self) {
        while self.next().await {}
    }

    /// Send the action and wait until all effects it triggered are done.
    pub async fn run(&mut self, action: R::Action) {
        self.send(action);
        self.settle().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CounterReducer;

    #[derive(Debug)]
    enum CounterAction {
        Increment,
        Load(u32),
        Loaded(u32),
        Both,
    }

    #[derive(Default)]
    struct CounterState {
        value: u32,
        history: Vec<u32>,
    }

    impl Reducer for CounterReducer {
        type Action = CounterAction;
        type State = CounterState;
        type Environment = ();

        fn reduce(
            action: Self::Action,
            state: &mut Self::State,
            _environment: &Self::Environment,
        ) -> Effect<Self::Action> {
            match action {
                CounterAction::Increment => {
                    state.value += 1;
                    Effect::NONE
                }
                CounterAction::Load(n) => Effect::future(
                    async move {
                        tokio::time::sleep(std::time::Duration::from_millis(n as u64)).await;
                        n
                    },
                    CounterAction::Loaded,
                ),
                CounterAction::Loaded(n) => {
                    state.history.push(n);
                    Effect::action(CounterAction::Increment)
                }
                CounterAction::Both => Effect::merge2(
                    Effect::action(CounterAction::Increment),
                    Effect::action(CounterAction::Increment),
                ),
            }
        }

        fn initial_action() -> Option<Self::Action> {
            Some(CounterAction::Increment)
        }
    }

    #[test]
    fn initial_action_is_applied() {
        let store = Store::<CounterReducer>::new(CounterState::default(), ());
        assert_eq!(store.state().value, 1);
    }

    #[test]
    fn synchronous_followups_apply_immediately() {
        let mut store = Store::<CounterReducer>::new(CounterState::default(), ());
        store.send(CounterAction::Both);
        assert_eq!(store.state().value, 3);
        assert_eq!(store.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn effects_resolve_in_completion_order() {
        let mut store = Store::<CounterReducer>::new(CounterState::default(), ());
        store.send(CounterAction::Load(50));
        store.send(CounterAction::Load(10));
        assert_eq!(store.in_flight(), 2);
        store.settle().await;
        assert_eq!(store.state().history, vec![10, 50]);
        assert_eq!(store.state().value, 3);
    }
}
