use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to install interrupt handler: {0}")]
    SignalHandler(#[from] ctrlc::Error),

    #[error("Thread creation error: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),

    #[error("Logger setup failed: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_ARGUMENTS: i32 = 2;
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_) => exit_code::INVALID_ARGUMENTS,
            _ => exit_code::GENERAL_ERROR,
        }
    }
}
