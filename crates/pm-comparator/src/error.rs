use pm_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),

    #[error("knowledge base error: {0}")]
    Knowledge(String),

    #[error("unable to load comparison data: {0}")]
    Fetch(String),

    #[error("standard not found: {0}")]
    StandardNotFound(String),

    #[error("section not found: {standard}/{section}")]
    SectionNotFound { standard: String, section: String },
}
