pub mod api;
pub mod app;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod optimistic;
pub mod render;
pub mod session;
pub mod storage;
pub mod store;
pub mod totals;
mod utils;


pub use api::Mode;
pub use config::Config;
pub use error::Error;
pub use error::ErrorType;
pub use error::Result;
