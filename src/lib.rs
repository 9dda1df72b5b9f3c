pub mod cli;
pub mod dispatcher;
pub mod error;
pub mod input;
pub mod latency;
pub mod logging;
pub mod shutdown;
pub mod stats;
pub mod worker;

pub use error::{Error, Result};
