mod app;
pub mod components;
pub mod environment;
pub mod helper;
pub mod store;
pub mod view_model;

pub use app::{init_logging, run, App};
pub use environment::{ApiError, Config, Environment, Repository};
