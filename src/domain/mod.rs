// ==========================================
// 商品目录批量导入导出 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑
// ==========================================

pub mod catalog;
pub mod product;
pub mod types;

// 重导出核心类型
pub use catalog::{CategoryRef, ExportQuery, ProductExportRow, EXPORT_HEADER};
pub use product::{
    BulkSummary, CellValue, NewProduct, RawRow, RowError, RowOutcome, TruncationReason,
    ValidatedProduct,
};
pub use types::{ExportFormat, FileFormat, SortField, SortOrder};
