use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid eviction pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("eviction pattern is not valid UTF-8")]
    NonUtf8Pattern,

    #[error("invalid key {0:?}: only ASCII letters, digits and `-._~` can be sent over HTTP")]
    InvalidKey(String),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to bind the store server: {0}")]
    Bind(#[from] warp::Error),

    #[error("failed to spawn the eviction task: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
