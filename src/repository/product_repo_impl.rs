// ==========================================
// 商品目录批量导入导出 - 商品仓储实现
// ==========================================
// 职责: 实现 ProductStore / CatalogReader（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// 约束: 单行写入各自原子，批次不包事务（保留部分成功语义）
// ==========================================

use crate::domain::{CategoryRef, ExportQuery, NewProduct, ProductExportRow, ValidatedProduct};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::identity::{UniqueIdFactory, UuidV4Factory};
use crate::repository::product_repo::{CatalogReader, ProductStore};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

/// 时间戳统一格式（定长，便于按字符串排序）
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// 金额统一格式（两位小数）
pub(crate) fn format_price(price: Decimal) -> String {
    format!("{:.2}", price)
}

/// LIKE 模式转义（% _ \）
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

// ==========================================
// ProductRepositoryImpl
// ==========================================
pub struct ProductRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
    id_factory: Arc<dyn UniqueIdFactory>,
}

impl ProductRepositoryImpl {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            id_factory: Arc::new(UuidV4Factory),
        }
    }

    /// 替换 unique_id 生成器
    pub fn with_id_factory(mut self, factory: Arc<dyn UniqueIdFactory>) -> Self {
        self.id_factory = factory;
        self
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 组装待落库商品（显式生成 unique_id）
    pub fn prepare(&self, product: ValidatedProduct) -> NewProduct {
        NewProduct {
            unique_id: self.id_factory.next_unique_id(),
            product,
        }
    }

    /// 插入单个商品
    fn insert_product(&self, new_product: &NewProduct) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = format_timestamp(Utc::now());
        let product = &new_product.product;

        conn.execute(
            r#"
            INSERT INTO products (
                unique_id, name, image, price, category_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                new_product.unique_id,
                product.name(),
                product.image(),
                format_price(product.price()),
                product.category_id(),
                now,
                now,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// 新建分类
    ///
    /// # 返回
    /// - Ok(i64): 分类 id
    /// - Err(UniqueConstraintViolation): 名称重复
    pub fn create_category(&self, name: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = format_timestamp(Utc::now());
        conn.execute(
            "INSERT INTO categories (unique_id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![self.id_factory.next_unique_id(), name.trim(), now, now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 删除分类（级联删除其商品）
    pub fn delete_category(&self, category_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM categories WHERE id = ?1", params![category_id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Category".to_string(),
                id: category_id.to_string(),
            });
        }
        Ok(())
    }

    /// 统计商品数
    pub fn count_products(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count)
    }

    fn query_categories(&self) -> RepositoryResult<Vec<CategoryRef>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY id")?;
        let categories = stmt
            .query_map([], |row| {
                Ok(CategoryRef {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }
}

#[async_trait]
impl ProductStore for ProductRepositoryImpl {
    async fn list_categories(&self) -> RepositoryResult<Vec<CategoryRef>> {
        self.query_categories()
    }

    async fn create_product(&self, product: ValidatedProduct) -> RepositoryResult<i64> {
        let new_product = self.prepare(product);
        self.insert_product(&new_product)
    }
}

impl CatalogReader for ProductRepositoryImpl {
    fn scan_products<E, F>(&self, query: &ExportQuery, mut visit: F) -> Result<usize, E>
    where
        E: From<RepositoryError>,
        F: FnMut(ProductExportRow) -> Result<(), E>,
    {
        // 排序列与方向均来自白名单枚举，其余条件全部参数化
        let sql = format!(
            r#"
            SELECT p.id, p.unique_id, p.name, p.price, c.name, p.created_at
            FROM products p
            JOIN categories c ON c.id = p.category_id
            WHERE (?1 IS NULL OR p.name LIKE ?1 ESCAPE '\')
              AND (?2 IS NULL OR p.category_id = ?2)
            ORDER BY {} {}, p.id ASC
            "#,
            query.sort_by.sql_column(),
            query.order.sql_keyword(),
        );

        let pattern = query.normalized_search().map(like_pattern);

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql).map_err(RepositoryError::from)?;
        let mut rows = stmt
            .query(params![pattern, query.category_id])
            .map_err(RepositoryError::from)?;

        let mut visited = 0usize;
        while let Some(row) = rows.next().map_err(RepositoryError::from)? {
            let record = map_export_row(row)?;
            visit(record)?;
            visited += 1;
        }

        Ok(visited)
    }
}

/// 游标行 → 导出行
fn map_export_row(row: &rusqlite::Row<'_>) -> RepositoryResult<ProductExportRow> {
    let price_raw: String = row.get(3)?;
    let created_raw: String = row.get(5)?;

    let price = Decimal::from_str(&price_raw).map_err(|e| RepositoryError::DataCorruption {
        field: "price".to_string(),
        message: format!("{} ({})", e, price_raw),
    })?;
    let created_at = DateTime::parse_from_rfc3339(&created_raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::DataCorruption {
            field: "created_at".to_string(),
            message: format!("{} ({})", e, created_raw),
        })?;

    Ok(ProductExportRow {
        id: row.get(0)?,
        unique_id: row.get(1)?,
        name: row.get(2)?,
        price,
        category: row.get(4)?,
        created_at,
    })
}
