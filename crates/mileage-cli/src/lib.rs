pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod stats;
pub mod store;
pub mod sync;

pub use error::{MileageError, Result};
