use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    #[error("dataset not loaded")]
    DatasetUnavailable,
    #[error("no data found for {scope} in {year}")]
    NoDataInRange { year: i32, scope: String },
    #[error("no data found for tag: {entity}")]
    EntityNotFound { entity: String },
    #[error("character {entity} not found")]
    EmptyBase { entity: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
