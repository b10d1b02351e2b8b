use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("{0} API key is not set")]
    MissingApiKey(&'static str),
    #[error("invalid or expired API key: {0}")]
    Auth(String),
    #[error("model endpoint returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },
    #[error("invalid model endpoint URL: {0}")]
    InvalidEndpoint(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
}
