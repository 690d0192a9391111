// ==========================================
// 商品目录批量导入导出 - 批量导入配置读取 Trait
// ==========================================
// 职责: 定义批量导入所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;
use std::time::Duration;

// ==========================================
// BulkConfigReader Trait
// ==========================================
// 用途: 批量上传/导出所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait BulkConfigReader: Send + Sync {
    /// 获取批量上传整体截止时长
    ///
    /// # 默认值
    /// - 300 秒（与请求超时上限一致）
    async fn get_bulk_deadline(&self) -> Result<Duration, Box<dyn Error + Send + Sync>>;

    /// 获取上传文件大小上限（字节）
    ///
    /// # 默认值
    /// - 50 MB
    async fn get_max_upload_bytes(&self) -> Result<u64, Box<dyn Error + Send + Sync>>;

    /// 获取进度日志间隔（行）
    ///
    /// # 默认值
    /// - 1000
    async fn get_progress_log_every(&self) -> Result<usize, Box<dyn Error + Send + Sync>>;
}
