// ==========================================
// 商品目录批量导入导出 - 批量导入编排器
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 解析 → 构建分类缓存 → 逐行(截止检查 → 校验 → 落库) → 汇总
// 约束:
// - 单文件内严格顺序处理，无并行
// - 行级错误只记录不中断；不重试；批次不包事务（部分成功为预期行为）
// - 截止/取消后不再开始新行，剩余行只计数
// ==========================================

use crate::domain::{BulkSummary, FileFormat, RawRow, RowOutcome, TruncationReason};
use crate::importer::category_cache::CategoryCache;
use crate::importer::deadline::Deadline;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{ParsedRow, RowStream, UniversalFileParser, UploadReader};
use crate::importer::row_validator::RowValidator;
use crate::repository::{ProductStore, RepositoryError};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// 默认进度日志间隔（行）
pub const DEFAULT_PROGRESS_LOG_EVERY: usize = 1000;

// ==========================================
// BulkIngestor - 批量导入编排器
// ==========================================
pub struct BulkIngestor<S>
where
    S: ProductStore,
{
    // 数据访问层
    store: Arc<S>,

    // 导入组件
    parser: UniversalFileParser,
    validator: RowValidator,

    progress_log_every: usize,
}

impl<S> BulkIngestor<S>
where
    S: ProductStore,
{
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - store: 商品存储（多个并发请求可共享）
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            parser: UniversalFileParser,
            validator: RowValidator::new(),
            progress_log_every: DEFAULT_PROGRESS_LOG_EVERY,
        }
    }

    /// 设置进度日志间隔（0 视为默认值）
    pub fn with_progress_log_every(mut self, every: usize) -> Self {
        self.progress_log_every = if every == 0 {
            DEFAULT_PROGRESS_LOG_EVERY
        } else {
            every
        };
        self
    }

    /// 导入磁盘文件（格式由扩展名决定）
    pub async fn ingest_path<P: AsRef<Path>>(
        &self,
        file_path: P,
        deadline: &Deadline,
    ) -> ImportResult<BulkSummary> {
        let path = file_path.as_ref();
        let (format, rows) = self.parser.open_path(path)?;
        info!(file_path = %path.display(), format = %format, "开始批量导入商品");
        self.ingest_rows(rows, deadline).await
    }

    /// 导入上传数据
    ///
    /// # 返回
    /// - Ok(BulkSummary): 文件可读（可能部分失败或被截断）
    /// - Err: 文件级错误（格式不支持、空文件、无表头）或分类读取失败
    #[instrument(skip_all, fields(format = %format))]
    pub async fn ingest(
        &self,
        format: FileFormat,
        reader: UploadReader,
        deadline: &Deadline,
    ) -> ImportResult<BulkSummary> {
        let rows = self.parser.open(format, reader).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;
        self.ingest_rows(rows, deadline).await
    }

    /// 对已打开的行序列执行导入
    pub async fn ingest_rows(
        &self,
        mut rows: RowStream,
        deadline: &Deadline,
    ) -> ImportResult<BulkSummary> {
        let start_time = Instant::now();

        // 步骤 1: 构建分类缓存（每批次一次）
        let categories = CategoryCache::build(self.store.as_ref()).await?;
        debug!(categories = categories.len(), "分类缓存就绪");

        // 步骤 2: 逐行处理
        let mut summary = BulkSummary::new();
        while let Some(next) = rows.next() {
            let parsed = match next {
                Ok(parsed) => parsed,
                Err(e) => {
                    error!(error = %e, processed = summary.total_rows, "文件中途读取失败，停止导入");
                    summary.truncation = Some(TruncationReason::ReadFailure {
                        message: e.to_string(),
                    });
                    break;
                }
            };

            // 每行开始前检查截止/取消
            if let Some(reason) = deadline.check() {
                let remaining = 1 + count_remaining(&mut rows);
                summary.rows_parsed = summary.total_rows + remaining;
                warn!(
                    reason = %reason,
                    processed = summary.total_rows,
                    unprocessed = remaining,
                    "截止时间已到，停止处理新行"
                );
                summary.truncation = Some(reason);
                break;
            }

            let outcome = match parsed {
                ParsedRow::Row(raw) => self.process_row(raw, &categories).await,
                ParsedRow::Malformed { row_index, reason } => {
                    debug!(row_index = row_index, reason = %reason, "行解析失败");
                    RowOutcome::Rejected {
                        row_index,
                        reasons: vec![reason],
                    }
                }
            };
            summary.record(outcome);

            if summary.total_rows % self.progress_log_every == 0 {
                info!(
                    processed = summary.total_rows,
                    inserted = summary.inserted,
                    failed = summary.failed,
                    "批量导入进度"
                );
            }
        }

        // 步骤 3: 汇总
        summary.elapsed_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            total = summary.total_rows,
            parsed = summary.rows_parsed,
            inserted = summary.inserted,
            failed = summary.failed,
            truncated = summary.is_truncated(),
            elapsed_ms = summary.elapsed_ms,
            "批量导入完成"
        );

        Ok(summary)
    }

    /// 处理单行：校验 → 落库
    async fn process_row(&self, raw: RawRow, categories: &CategoryCache) -> RowOutcome {
        let row_index = raw.row_index();

        let product = match self.validator.validate(&raw, categories) {
            Ok(product) => product,
            Err(reasons) => {
                debug!(row_index = row_index, reasons = ?reasons, "行校验失败");
                return RowOutcome::Rejected { row_index, reasons };
            }
        };

        let category_id = product.category_id();
        match self.store.create_product(product).await {
            Ok(product_id) => RowOutcome::Inserted {
                row_index,
                product_id,
            },
            Err(e) => {
                warn!(row_index = row_index, error = %e, "商品落库失败");
                RowOutcome::Rejected {
                    row_index,
                    reasons: vec![storage_reason(&e, category_id)],
                }
            }
        }
    }
}

/// 存储错误 → 对调用方稳定且安全的原因文本（原始信息只进日志）
pub fn storage_reason(err: &RepositoryError, category_id: i64) -> String {
    match err {
        RepositoryError::UniqueConstraintViolation(_) => {
            "duplicate product (unique constraint)".to_string()
        }
        RepositoryError::ForeignKeyViolation(_) => {
            format!("category {} no longer exists", category_id)
        }
        RepositoryError::CheckConstraintViolation(_) => {
            "value exceeds a storage limit".to_string()
        }
        _ => "storage error: could not save row".to_string(),
    }
}

/// 截断后剩余行只计数（遇到读取错误即停止）
fn count_remaining(rows: &mut RowStream) -> usize {
    rows.by_ref().take_while(|r| r.is_ok()).count()
}
