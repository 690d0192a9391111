// ==========================================
// 商品目录批量导入导出 - 配置层
// ==========================================
// 职责: 系统配置管理，缺省值兜底
// 存储: config_kv 表
// ==========================================

pub mod bulk_config_trait;
pub mod config_manager;

// 重导出核心配置管理器
pub use bulk_config_trait::BulkConfigReader;
pub use config_manager::{config_keys, defaults, ConfigManager};
