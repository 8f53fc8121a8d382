use std::future::Future;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

/// Work returned by a reducer. Futures are driven by the [`super::Store`]
/// and their output is fed back into the reducer as the next action.
pub enum Effect<A> {
    Nothing,
    Action(A),
    Future(BoxFuture<'static, A>),
    Multiple(Vec<Effect<A>>),
}

impl<A: Send + 'static> Effect<A> {
    pub const NONE: Self = Effect::Nothing;

    pub fn action(action: A) -> Self {
        Effect::Action(action)
    }

    pub fn future<T, F>(future: F, mapper: impl FnOnce(T) -> A + Send + 'static) -> Self
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        Effect::Future(async move { mapper(future.await) }.boxed())
    }

    pub fn merge2(a: Effect<A>, b: Effect<A>) -> Self {
        Effect::Multiple(vec![a, b])
    }
}

impl<A> std::fmt::Debug for Effect<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nothing => write!(f, "Nothing"),
            Self::Action(_) => f.debug_tuple("Action").finish(),
            Self::Future(_) => f.debug_tuple("Future").finish(),
            Self::Multiple(items) => f.debug_tuple("Multiple").field(&items.len()).finish(),
        }
    }
}
