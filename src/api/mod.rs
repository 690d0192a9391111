// ==========================================
// 商品目录批量导入导出 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行/HTTP 外壳调用
// ==========================================

pub mod error;
pub mod product_bulk_api;
pub mod response;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use product_bulk_api::{ExportParams, ProductBulkApi, UploadRequest};
pub use response::{summary_message, ApiResponse, BulkUploadData};
