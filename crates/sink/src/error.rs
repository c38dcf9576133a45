use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Channel(#[from] logrelay_channels::Error),

    #[error(transparent)]
    Routing(#[from] logrelay_routing::Error),

    #[error("chat client is already set")]
    ClientAlreadySet,

    #[error("invalid log level {0:?}")]
    InvalidLevel(String),

    #[error("relay worker panicked: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
