// ==========================================
// 商品目录批量导入导出 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 传播策略: 行级错误在批次内消化为 RowOutcome；
//           只有文件级错误会向调用方传播
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件级错误（整单失败，无汇总）=====
    #[error("unsupported file type: {0} (only .csv, .xlsx and .xls are accepted)")]
    UnsupportedFormat(String),

    #[error("uploaded file is empty")]
    EmptyFile,

    #[error("file has no header row")]
    MissingHeader,

    #[error("file read failed: {0}")]
    FileReadError(String),

    #[error("Excel parse failed: {0}")]
    ExcelParseError(String),

    #[error("CSV parse failed: {0}")]
    CsvParseError(String),

    // ===== 存储错误 =====
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否属于文件格式类错误（对应 4xx）
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            ImportError::UnsupportedFormat(_)
                | ImportError::EmptyFile
                | ImportError::MissingHeader
                | ImportError::ExcelParseError(_)
                | ImportError::CsvParseError(_)
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            ImportError::FileReadError(err.to_string())
        } else {
            ImportError::CsvParseError(err.to_string())
        }
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
