// ==========================================
// 商品目录批量导入导出 - 目录查询模型
// ==========================================
// 职责: 分类引用、导出查询参数、导出行
// ==========================================

use crate::domain::types::{SortField, SortOrder};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 分类引用（批量导入开始时一次性读取）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

// ==========================================
// ExportQuery - 导出查询参数
// ==========================================
// 纯输入，无身份
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportQuery {
    pub search: Option<String>,
    pub category_id: Option<i64>,
    #[serde(default)]
    pub sort_by: SortField,
    #[serde(default)]
    pub order: SortOrder,
}

impl ExportQuery {
    /// 规范化搜索词（空白视为未提供）
    pub fn normalized_search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

// ==========================================
// ProductExportRow - 导出行
// ==========================================
// 列顺序: id, unique_id, name, price, category, created_at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductExportRow {
    pub id: i64,
    pub unique_id: String,
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// 导出表头
pub const EXPORT_HEADER: [&str; 6] = ["id", "unique_id", "name", "price", "category", "created_at"];
