// ==========================================
// 商品批量导入导出 API
// ==========================================
// 职责: 上传边界检查（扩展名、大小上限、空文件）+ 截止时间 + 响应组装
// 约束: 文件级错误 → Err(ApiError)；行级错误 → 成功响应中的 errors
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::response::{summary_message, ApiResponse, BulkUploadData};
use crate::config::{BulkConfigReader, ConfigManager};
use crate::db::{open_sqlite_connection, warn_on_schema_mismatch};
use crate::domain::{ExportFormat, ExportQuery, FileFormat, SortField, SortOrder};
use crate::exporter::{CatalogExporter, ExportDocument};
use crate::importer::{BulkIngestor, Deadline, ImportError, UploadReader};
use crate::repository::ProductRepositoryImpl;
use futures::future::join_all;
use rusqlite::Connection;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

/// 批量上传请求（批量接口使用）
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// 客户端声明的文件名（用于扩展名判断）
    pub file_name: String,
    /// 服务端落盘路径
    pub file_path: PathBuf,
}

/// 商品批量导入导出 API
pub struct ProductBulkApi {
    repo: Arc<ProductRepositoryImpl>,
    config: Arc<ConfigManager>,
}

impl ProductBulkApi {
    /// 创建新的 ProductBulkApi 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（表结构需已初始化）
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        warn_on_schema_mismatch(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从共享连接创建
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        let config = ConfigManager::from_connection(conn.clone())
            .map_err(|e| ApiError::InternalError(format!("config init failed: {}", e)))?;
        Ok(Self {
            repo: Arc::new(ProductRepositoryImpl::from_connection(conn)),
            config: Arc::new(config),
        })
    }

    /// 直接注入组件（测试使用）
    pub fn with_parts(repo: Arc<ProductRepositoryImpl>, config: Arc<ConfigManager>) -> Self {
        Self { repo, config }
    }

    pub fn repository(&self) -> &Arc<ProductRepositoryImpl> {
        &self.repo
    }

    // ==========================================
    // 批量上传
    // ==========================================

    /// 上传磁盘文件
    ///
    /// # 参数
    /// - file_name: 客户端文件名
    /// - file_path: 落盘路径
    /// - cancel: 可选取消信号（例如客户端断开）
    ///
    /// # 返回
    /// - Ok(ApiResponse): 文件可读，可能部分失败或被截断
    /// - Err(ApiError): 扩展名不支持 / 超过大小上限 / 文件格式错误
    #[instrument(skip_all, fields(file_name = %file_name))]
    pub async fn bulk_upload_file(
        &self,
        file_name: &str,
        file_path: &Path,
        cancel: Option<watch::Receiver<bool>>,
    ) -> ApiResult<ApiResponse<BulkUploadData>> {
        let format = accepted_format(file_name)?;
        let size = std::fs::metadata(file_path)
            .map_err(|e| ApiError::InternalError(format!("cannot stat upload: {}", e)))?
            .len();
        self.check_size(size).await?;

        let file = File::open(file_path)
            .map_err(|e| ApiError::InternalError(format!("cannot open upload: {}", e)))?;
        self.run_upload(format, Box::new(file), cancel).await
    }

    /// 上传内存数据
    #[instrument(skip_all, fields(file_name = %file_name, size = bytes.len()))]
    pub async fn bulk_upload_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        cancel: Option<watch::Receiver<bool>>,
    ) -> ApiResult<ApiResponse<BulkUploadData>> {
        let format = accepted_format(file_name)?;
        self.check_size(bytes.len() as u64).await?;
        self.run_upload(format, Box::new(Cursor::new(bytes)), cancel)
            .await
    }

    /// 批量上传多个文件（并发执行，各自独立汇总）
    pub async fn batch_upload(
        &self,
        requests: &[UploadRequest],
    ) -> Vec<ApiResult<ApiResponse<BulkUploadData>>> {
        info!(count = requests.len(), "开始批量上传文件");

        let results = join_all(
            requests
                .iter()
                .map(|req| self.bulk_upload_file(&req.file_name, &req.file_path, None)),
        )
        .await;

        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        info!(
            total = requests.len(),
            succeeded = succeeded,
            failed = requests.len() - succeeded,
            "批量上传完成"
        );
        results
    }

    async fn check_size(&self, size: u64) -> ApiResult<()> {
        let limit = self
            .config
            .get_max_upload_bytes()
            .await
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        if size > limit {
            warn!(size = size, limit = limit, "上传文件超过大小上限");
            return Err(ApiError::PayloadTooLarge { size, limit });
        }
        Ok(())
    }

    async fn run_upload(
        &self,
        format: FileFormat,
        reader: UploadReader,
        cancel: Option<watch::Receiver<bool>>,
    ) -> ApiResult<ApiResponse<BulkUploadData>> {
        let timeout = self
            .config
            .get_bulk_deadline()
            .await
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        let progress_every = self
            .config
            .get_progress_log_every()
            .await
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        let mut deadline = Deadline::after(timeout);
        if let Some(rx) = cancel {
            deadline = deadline.with_cancel(rx);
        }

        let ingestor =
            BulkIngestor::new(self.repo.clone()).with_progress_log_every(progress_every);
        let summary = ingestor.ingest(format, reader, &deadline).await?;

        Ok(ApiResponse::ok_with_message(
            BulkUploadData::from(&summary),
            summary_message(&summary),
        ))
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 导出商品目录
    pub fn export(&self, query: &ExportQuery, format: ExportFormat) -> ApiResult<ExportDocument> {
        let exporter = CatalogExporter::new(self.repo.clone());
        Ok(exporter.export(query, format)?)
    }

    /// 从原始请求参数导出（未知排序字段/方向/格式 → InvalidInput）
    pub fn export_from_params(&self, params: &ExportParams) -> ApiResult<ExportDocument> {
        let (query, format) = params.parse()?;
        self.export(&query, format)
    }
}

// ==========================================
// ExportParams - 导出请求原始参数
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ExportParams {
    pub format: Option<String>,
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl ExportParams {
    /// 解析为强类型查询（format 缺省为 csv）
    pub fn parse(&self) -> ApiResult<(ExportQuery, ExportFormat)> {
        let format = non_blank(&self.format)
            .map(str::parse::<ExportFormat>)
            .transpose()
            .map_err(ApiError::InvalidInput)?
            .unwrap_or(ExportFormat::Csv);

        let category_id = non_blank(&self.category_id)
            .map(|raw| {
                raw.parse::<i64>()
                    .ok()
                    .filter(|id| *id > 0)
                    .ok_or_else(|| {
                        ApiError::InvalidInput(format!("category_id must be a positive integer: {}", raw))
                    })
            })
            .transpose()?;

        let sort_by = non_blank(&self.sort_by)
            .map(str::parse::<SortField>)
            .transpose()
            .map_err(ApiError::InvalidInput)?
            .unwrap_or_default();

        let order = non_blank(&self.order)
            .map(str::parse::<SortOrder>)
            .transpose()
            .map_err(ApiError::InvalidInput)?
            .unwrap_or_default();

        let query = ExportQuery {
            search: non_blank(&self.search).map(str::to_string),
            category_id,
            sort_by,
            order,
        };
        Ok((query, format))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// 扩展名白名单
fn accepted_format(file_name: &str) -> ApiResult<FileFormat> {
    FileFormat::from_file_name(file_name).ok_or_else(|| {
        let ext = Path::new(file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        ApiError::from(ImportError::UnsupportedFormat(ext))
    })
}
