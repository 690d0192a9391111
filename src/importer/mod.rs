// ==========================================
// 商品目录批量导入导出 - 导入层
// ==========================================
// 职责: 外部文件批量导入商品
// 支持: CSV, Excel (.xlsx / .xls)
// ==========================================

// 模块声明
pub mod bulk_ingestor;
pub mod category_cache;
pub mod deadline;
pub mod error;
pub mod file_parser;
pub mod row_validator;

// 重导出核心类型
pub use bulk_ingestor::{storage_reason, BulkIngestor};
pub use category_cache::{CategoryCache, CategoryLookup};
pub use deadline::{CancelHandle, Deadline};
pub use error::{ImportError, ImportResult};
pub use file_parser::{
    CsvParser, ExcelParser, FileParser, ParsedRow, RowStream, UniversalFileParser, UploadReader,
};
pub use row_validator::RowValidator;
