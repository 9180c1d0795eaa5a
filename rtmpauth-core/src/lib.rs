pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod notify;
pub mod scheduler;
pub mod store;
pub mod stream;
pub mod twitch;

pub use config::Config;
pub use error::{Error, Result};
