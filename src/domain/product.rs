// ==========================================
// 商品目录批量导入导出 - 商品领域模型
// ==========================================
// 职责: 原始行、校验后商品、逐行结果、批量汇总
// 生命周期: 除 BulkSummary 外均只存活于单行处理期间
// ==========================================

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CellValue - 原始单元格值
// ==========================================
// CSV 一律为文本；XLSX 数值单元格保留为数值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// 是否为空白（空字符串或仅空白字符）
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
        }
    }
}

// ==========================================
// RawRow - 原始行记录
// ==========================================
// 列顺序与表头一致；row_index 为数据行序号（从 1 开始，不含表头）
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    row_index: usize,
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    pub fn new(row_index: usize, cells: Vec<(String, CellValue)>) -> Self {
        Self { row_index, cells }
    }

    pub fn row_index(&self) -> usize {
        self.row_index
    }

    pub fn cells(&self) -> &[(String, CellValue)] {
        &self.cells
    }

    /// 按列名取值（ASCII 大小写不敏感，取第一个匹配列）
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    /// 按列名取非空值
    pub fn get_non_blank(&self, column: &str) -> Option<&CellValue> {
        self.get(column).filter(|v| !v.is_blank())
    }

    /// 整行是否全部为空
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.is_blank())
    }
}

// ==========================================
// ValidatedProduct - 校验通过的商品
// ==========================================
// 只能由 RowValidator 构造，不存在“部分有效”的实例
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedProduct {
    name: String,
    price: Decimal,
    category_id: i64,
    image: Option<String>,
}

impl ValidatedProduct {
    pub(crate) fn new(
        name: String,
        price: Decimal,
        category_id: i64,
        image: Option<String>,
    ) -> Self {
        Self {
            name,
            price,
            category_id,
            image,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn category_id(&self) -> i64 {
        self.category_id
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }
}

// ==========================================
// NewProduct - 待落库商品
// ==========================================
// 由持久化边界通过 UniqueIdFactory 显式生成 unique_id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub unique_id: String,
    pub product: ValidatedProduct,
}

// ==========================================
// RowOutcome - 逐行处理结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowOutcome {
    Inserted { row_index: usize, product_id: i64 },
    Rejected { row_index: usize, reasons: Vec<String> },
}

impl RowOutcome {
    pub fn row_index(&self) -> usize {
        match self {
            RowOutcome::Inserted { row_index, .. } | RowOutcome::Rejected { row_index, .. } => {
                *row_index
            }
        }
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self, RowOutcome::Inserted { .. })
    }
}

/// 失败行明细（响应中的 errors 元素）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub reasons: Vec<String>,
}

// ==========================================
// TruncationReason - 批次提前结束原因
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TruncationReason {
    /// 超过调用方设定的截止时间
    DeadlineExceeded,
    /// 调用方主动取消（例如连接断开）
    Cancelled,
    /// 文件中途读取失败
    ReadFailure { message: String },
}

impl fmt::Display for TruncationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TruncationReason::DeadlineExceeded => f.write_str("deadline_exceeded"),
            TruncationReason::Cancelled => f.write_str("cancelled"),
            TruncationReason::ReadFailure { .. } => f.write_str("read_failure"),
        }
    }
}

// ==========================================
// BulkSummary - 批量导入汇总
// ==========================================
// 不变量: total_rows = inserted + failed；rows_parsed >= total_rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub total_rows: usize,
    pub rows_parsed: usize,
    pub inserted: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
    pub truncation: Option<TruncationReason>,
    pub elapsed_ms: u64,
    /// 完整逐行结果（审计用，不进入响应体）
    #[serde(skip)]
    pub outcomes: Vec<RowOutcome>,
}

impl BulkSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一行结果（按输入顺序调用）
    pub fn record(&mut self, outcome: RowOutcome) {
        match &outcome {
            RowOutcome::Inserted { .. } => self.inserted += 1,
            RowOutcome::Rejected { row_index, reasons } => {
                self.failed += 1;
                self.errors.push(RowError {
                    row: *row_index,
                    reasons: reasons.clone(),
                });
            }
        }
        self.total_rows = self.inserted + self.failed;
        self.rows_parsed = self.rows_parsed.max(self.total_rows);
        self.outcomes.push(outcome);
    }

    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }

    /// 已解析但未处理的行数
    pub fn unprocessed_rows(&self) -> usize {
        self.rows_parsed.saturating_sub(self.total_rows)
    }
}
