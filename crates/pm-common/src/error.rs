/// Error types shared by the standards comparator crates.
///
/// These cover failures talking to the standards REST backend and decoding its JSON. Redis
/// errors never surface; `RedisStore` logs them and degrades.
/// Application-specific errors live in the server crate and wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("backend returned error: status={status} body={body}")]
    Upstream {
        status: reqwest::StatusCode,
        body: String,
    },
}
