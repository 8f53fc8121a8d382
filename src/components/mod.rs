pub mod auth;
pub mod bootstrap;
pub mod commission;
pub mod offers;

#[cfg(test)]
pub fn test_environment() -> (
    crate::environment::Environment,
    std::sync::Arc<crate::environment::model::mock::MockApi>,
) {
    use crate::environment::model::mock::MockApi;
    use crate::environment::{Config, Environment, Repository};
    use std::sync::Arc;

    let api = Arc::new(MockApi::default());
    let environment = Environment::with_api(Config::default(), Repository::in_memory(), api.clone());
    (environment, api)
}
