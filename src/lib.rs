pub mod clock;
pub mod config;
pub mod engine;
pub mod format;
pub mod model;
pub mod observability;
pub mod store;
