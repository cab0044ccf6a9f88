pub mod cli;
pub mod error;
pub mod generate;
pub mod logging;
pub mod models;
pub mod ports;
pub mod templates;

pub use error::{GenError, Result};
