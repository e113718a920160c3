use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Error channel unavailable: {0}")]
    Channel(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
