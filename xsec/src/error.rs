use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to open file: {0}: {1}")]
    Open(String, std::io::Error),

    #[error("Failed to write file: {0}: {1}")]
    Write(String, std::io::Error),

    #[error("Invalid config: {0}: {1}")]
    Config(String, serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Xse(#[from] xse::Error),
}
