// ==========================================
// 商品目录批量导入导出 - 核心库
// ==========================================
// 职责: CSV / Excel 商品批量导入，商品目录 CSV / XLSX 导出
// 技术栈: Rust + SQLite
// 处理模型: 单文件顺序处理，逐行校验与落库，允许部分成功
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部文件
pub mod importer;

// 导出层 - 目录文档
pub mod exporter;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    BulkSummary, CategoryRef, ExportFormat, ExportQuery, FileFormat, RowOutcome, SortField,
    SortOrder, TruncationReason, ValidatedProduct,
};

// 导入 / 导出
pub use exporter::{CatalogExporter, ExportDocument};
pub use importer::{BulkIngestor, CancelHandle, Deadline};

// API
pub use api::{ApiError, ApiResponse, ProductBulkApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "商品目录批量导入导出";
