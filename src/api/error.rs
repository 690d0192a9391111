// ==========================================
// 商品目录批量导入导出 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，将下层技术错误转换为调用方可理解的错误
// 约束: 行级错误不会出现在这里（在汇总中体现）
// ==========================================

use crate::exporter::ExportError;
use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误 (4xx)
    // ==========================================
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("invalid file: {0}")]
    FormatError(String),

    #[error("file too large: {size} bytes (limit {limit} bytes)")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("not found: {0}")]
    NotFound(String),

    // ==========================================
    // 服务端错误 (5xx)
    // ==========================================
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("export failed: {0}")]
    ExportError(String),

    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// HTTP 状态码映射
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_) | ApiError::UnsupportedFormat(_) | ApiError::FormatError(_) => 400,
            ApiError::PayloadTooLarge { .. } => 413,
            ApiError::NotFound(_) => 404,
            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::ExportError(_)
            | ApiError::InternalError(_)
            | ApiError::Other(_) => 500,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("lock acquisition failed: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg)
            | RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::ForeignKeyViolation(msg)
            | RepositoryError::CheckConstraintViolation(msg) => ApiError::DatabaseError(msg),
            RepositoryError::DataCorruption { field, message } => {
                ApiError::DatabaseError(format!("corrupt {}: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::UnsupportedFormat(_) => ApiError::UnsupportedFormat(err.to_string()),
            ImportError::EmptyFile
            | ImportError::MissingHeader
            | ImportError::ExcelParseError(_)
            | ImportError::CsvParseError(_) => ApiError::FormatError(err.to_string()),
            ImportError::Storage(repo_err) => ApiError::from(repo_err),
            ImportError::FileReadError(msg) | ImportError::InternalError(msg) => {
                ApiError::InternalError(msg)
            }
            ImportError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ExportError 转换
// ==========================================
impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Storage(repo_err) => ApiError::from(repo_err),
            other => ApiError::ExportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
