use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteBoardError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("No price data found for symbol '{0}'")]
    NotFound(String),

    #[error("Insufficient data: need at least {needed} price records, got {actual}")]
    InsufficientData { needed: usize, actual: usize },

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl QuoteBoardError {
    /// 是否屬於「查無資料」類錯誤，其餘一律視為非預期錯誤
    pub fn is_not_found(&self) -> bool {
        matches!(self, QuoteBoardError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, QuoteBoardError>;

// 用于从字符串创建错误
impl From<String> for QuoteBoardError {
    fn from(s: String) -> Self {
        QuoteBoardError::Unknown(s)
    }
}

// 用于从&str创建错误
impl From<&str> for QuoteBoardError {
    fn from(s: &str) -> Self {
        QuoteBoardError::Unknown(s.to_string())
    }
}
