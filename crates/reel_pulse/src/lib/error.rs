#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse market data: {0}")]
    Parse(&'static str),

    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),
}
