use thiserror::Error;

pub type Result<T> = std::result::Result<T, OtherBucketError>;

#[derive(Debug, Error)]
pub enum OtherBucketError {
    #[error("aggregation `{0}` is not part of the pipeline")]
    ConfigNotFound(String),

    #[error("aggregation `{0}` is not a terms aggregation")]
    NotTermsAggregation(String),

    #[error("aggregation `{0}` is disabled")]
    DisabledAggregation(String),

    #[error("aggregation id `{0}` is used more than once")]
    DuplicateId(String),

    #[error("invalid aggregation pipeline: {0}")]
    InvalidPipeline(#[from] serde_json::Error),
}
