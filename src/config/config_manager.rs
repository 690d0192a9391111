// ==========================================
// 商品目录批量导入导出 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::bulk_config_trait::BulkConfigReader;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// 默认值
pub mod defaults {
    /// 批量上传截止时长（秒）
    pub const BULK_UPLOAD_DEADLINE_SECS: u64 = 300;
    /// 上传文件大小上限（50 MB）
    pub const BULK_UPLOAD_MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;
    /// 进度日志间隔（行）
    pub const BULK_UPLOAD_PROGRESS_LOG_EVERY: usize = 1000;
}

/// 配置键
pub mod config_keys {
    pub const BULK_UPLOAD_DEADLINE_SECS: &str = "bulk_upload_deadline_secs";
    pub const BULK_UPLOAD_MAX_FILE_BYTES: &str = "bulk_upload_max_file_bytes";
    pub const BULK_UPLOAD_PROGRESS_LOG_EVERY: &str = "bulk_upload_progress_log_every";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 配置（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取正整数配置，缺失或非法时回退默认值
    fn get_positive_or_default(&self, key: &str, default: u64) -> ConfigResult<u64> {
        let value = self.get_config_value(key)?;
        Ok(value
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or_else(|| {
                tracing::debug!(key = key, default = default, "配置缺失或非法，使用默认值");
                default
            }))
    }
}

#[async_trait]
impl BulkConfigReader for ConfigManager {
    async fn get_bulk_deadline(&self) -> ConfigResult<Duration> {
        let secs = self.get_positive_or_default(
            config_keys::BULK_UPLOAD_DEADLINE_SECS,
            defaults::BULK_UPLOAD_DEADLINE_SECS,
        )?;
        Ok(Duration::from_secs(secs))
    }

    async fn get_max_upload_bytes(&self) -> ConfigResult<u64> {
        self.get_positive_or_default(
            config_keys::BULK_UPLOAD_MAX_FILE_BYTES,
            defaults::BULK_UPLOAD_MAX_FILE_BYTES,
        )
    }

    async fn get_progress_log_every(&self) -> ConfigResult<usize> {
        let every = self.get_positive_or_default(
            config_keys::BULK_UPLOAD_PROGRESS_LOG_EVERY,
            defaults::BULK_UPLOAD_PROGRESS_LOG_EVERY as u64,
        )?;
        Ok(usize::try_from(every).unwrap_or(defaults::BULK_UPLOAD_PROGRESS_LOG_EVERY))
    }
}
