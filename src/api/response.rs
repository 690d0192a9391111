// ==========================================
// 商品目录批量导入导出 - API 响应结构
// ==========================================
// 批量上传响应: { success, data: {...}, message? }
// ==========================================

use crate::api::error::ApiError;
use crate::domain::{BulkSummary, RowError, TruncationReason};
use serde::Serialize;

/// 通用响应包装
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// 请求级失败（无汇总）
    pub fn failure(err: &ApiError) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(err.to_string()),
        }
    }
}

// ==========================================
// BulkUploadData - 批量上传响应数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkUploadData {
    pub inserted: usize,
    pub failed: usize,
    pub total: usize,
    pub errors: Vec<RowError>,
    /// 文件中解析到的行数（截断时大于 total）
    pub parsed: usize,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncation_reason: Option<String>,
    pub elapsed_ms: u64,
}

impl From<&BulkSummary> for BulkUploadData {
    fn from(summary: &BulkSummary) -> Self {
        Self {
            inserted: summary.inserted,
            failed: summary.failed,
            total: summary.total_rows,
            errors: summary.errors.clone(),
            parsed: summary.rows_parsed,
            truncated: summary.is_truncated(),
            truncation_reason: summary.truncation.as_ref().map(|reason| match reason {
                TruncationReason::ReadFailure { message } => format!("{}: {}", reason, message),
                other => other.to_string(),
            }),
            elapsed_ms: summary.elapsed_ms,
        }
    }
}

/// 汇总提示信息
pub fn summary_message(summary: &BulkSummary) -> String {
    match &summary.truncation {
        Some(reason) => format!(
            "upload stopped early ({}): {} of {} rows processed, {} inserted, {} failed",
            reason, summary.total_rows, summary.rows_parsed, summary.inserted, summary.failed
        ),
        None if summary.failed > 0 => format!(
            "{} products inserted, {} rows failed",
            summary.inserted, summary.failed
        ),
        None => format!("{} products inserted", summary.inserted),
    }
}
