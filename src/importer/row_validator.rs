// ==========================================
// 商品目录批量导入导出 - 行校验器
// ==========================================
// 职责: RawRow → ValidatedProduct 或字段级原因列表
// 约束:
// - 收集全部违规项，不在第一个错误处停止
// - 纯函数：相同输入 + 相同分类集合 → 相同结果
// ==========================================

use crate::domain::{CellValue, RawRow, ValidatedProduct};
use crate::importer::category_cache::CategoryLookup;
use rust_decimal::Decimal;
use std::str::FromStr;

/// 商品名称最大长度（字符）
pub const MAX_NAME_CHARS: usize = 255;

/// 列名
pub mod columns {
    pub const NAME: &str = "name";
    pub const PRICE: &str = "price";
    pub const CATEGORY_ID: &str = "category_id";
    pub const CATEGORY: &str = "category";
    pub const IMAGE: &str = "image";
}

pub struct RowValidator {
    max_price: Decimal,
}

impl Default for RowValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl RowValidator {
    /// DECIMAL(10,2) 上限
    pub fn new() -> Self {
        Self {
            max_price: Decimal::new(9_999_999_999, 2),
        }
    }

    /// 校验单行
    ///
    /// # 参数
    /// - row: 原始行
    /// - categories: 本批次分类缓存
    ///
    /// # 返回
    /// - Ok(ValidatedProduct): 全部字段合法
    /// - Err(Vec<String>): 全部违规原因（按 name / price / category 顺序）
    pub fn validate<L: CategoryLookup + ?Sized>(
        &self,
        row: &RawRow,
        categories: &L,
    ) -> Result<ValidatedProduct, Vec<String>> {
        let mut reasons = Vec::new();

        let name = self.validate_name(row).map_err(|r| reasons.push(r)).ok();
        let price = self.validate_price(row).map_err(|r| reasons.push(r)).ok();
        let category_id = self
            .validate_category(row, categories)
            .map_err(|r| reasons.push(r))
            .ok();
        let image = row
            .get_non_blank(columns::IMAGE)
            .map(|v| v.to_string().trim().to_string());

        match (name, price, category_id) {
            (Some(name), Some(price), Some(category_id)) if reasons.is_empty() => {
                Ok(ValidatedProduct::new(name, price, category_id, image))
            }
            _ => Err(reasons),
        }
    }

    fn validate_name(&self, row: &RawRow) -> Result<String, String> {
        let name = row
            .get_non_blank(columns::NAME)
            .map(|v| v.to_string().trim().to_string())
            .ok_or_else(|| "name required".to_string())?;

        if name.chars().count() > MAX_NAME_CHARS {
            return Err(format!("name must not exceed {} characters", MAX_NAME_CHARS));
        }
        Ok(name)
    }

    fn validate_price(&self, row: &RawRow) -> Result<Decimal, String> {
        let cell = row
            .get_non_blank(columns::PRICE)
            .ok_or_else(|| "price required".to_string())?;

        let price = match cell {
            CellValue::Text(text) => Decimal::from_str(text.trim()).ok(),
            CellValue::Number(n) if n.is_finite() => Decimal::try_from(*n).ok(),
            CellValue::Number(_) => None,
        }
        .ok_or_else(|| "price must be a valid decimal number".to_string())?;

        if price < Decimal::ZERO {
            return Err("price must be non-negative".to_string());
        }

        let price = price.round_dp(2);
        if price > self.max_price {
            return Err(format!("price must not exceed {}", self.max_price));
        }
        Ok(price)
    }

    fn validate_category<L: CategoryLookup + ?Sized>(
        &self,
        row: &RawRow,
        categories: &L,
    ) -> Result<i64, String> {
        // 优先 category_id 列；缺失时回退 category 列（导出文件为分类名称）
        if let Some(cell) = row.get_non_blank(columns::CATEGORY_ID) {
            let id = parse_positive_id(cell)
                .ok_or_else(|| "category_id must be a positive integer".to_string())?;
            return check_exists(id, categories);
        }

        let cell = row
            .get_non_blank(columns::CATEGORY)
            .ok_or_else(|| "category_id required".to_string())?;

        match cell {
            CellValue::Number(_) => {
                let id = parse_positive_id(cell)
                    .ok_or_else(|| "category_id must be a positive integer".to_string())?;
                check_exists(id, categories)
            }
            CellValue::Text(text) => {
                let text = text.trim();
                if let Ok(id) = text.parse::<i64>() {
                    if id <= 0 {
                        return Err("category_id must be a positive integer".to_string());
                    }
                    return check_exists(id, categories);
                }
                categories
                    .resolve_name(text)
                    .ok_or_else(|| format!("category '{}' does not exist", text))
            }
        }
    }
}

fn check_exists<L: CategoryLookup + ?Sized>(id: i64, categories: &L) -> Result<i64, String> {
    if categories.exists(id) {
        Ok(id)
    } else {
        Err(format!("category {} does not exist", id))
    }
}

/// 正整数 id（XLSX 数值单元格允许 3.0 形式）
fn parse_positive_id(cell: &CellValue) -> Option<i64> {
    let id = match cell {
        CellValue::Text(text) => text.trim().parse::<i64>().ok()?,
        CellValue::Number(n) => {
            if !n.is_finite() || n.fract() != 0.0 || n.abs() > i64::MAX as f64 {
                return None;
            }
            *n as i64
        }
    };
    (id > 0).then_some(id)
}
