// ==========================================
// 商品目录批量导入导出 - 商品仓储 Trait
// ==========================================
// 职责: 定义批量导入/导出所需的数据访问接口（不包含实现）
// 红线: Repository 不含业务规则；每次调用独立原子，不跨调用开事务
// ==========================================

use crate::domain::{CategoryRef, ExportQuery, ProductExportRow, ValidatedProduct};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;

// ==========================================
// ProductStore Trait
// ==========================================
// 用途: 批量导入写入边界
// 实现者: ProductRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// 一次性读取全部分类（id + 名称）
    ///
    /// # 说明
    /// - 每个批量导入请求开头调用一次，用于构建分类缓存
    async fn list_categories(&self) -> RepositoryResult<Vec<CategoryRef>>;

    /// 新建单个商品
    ///
    /// # 返回
    /// - Ok(i64): 新商品自增 id
    /// - Err: 唯一约束/外键/存储错误（仅影响当前行）
    async fn create_product(&self, product: ValidatedProduct) -> RepositoryResult<i64>;
}

// ==========================================
// CatalogReader Trait
// ==========================================
// 用途: 导出读取边界（游标逐行回调，不整体物化结果集）
// 实现者: ProductRepositoryImpl
pub trait CatalogReader: Send + Sync {
    /// 按查询条件逐行扫描商品
    ///
    /// # 参数
    /// - query: 过滤/排序条件
    /// - visit: 每行回调，返回 Err 时立即停止扫描
    ///
    /// # 返回
    /// - Ok(usize): 已访问行数
    fn scan_products<E, F>(&self, query: &ExportQuery, visit: F) -> Result<usize, E>
    where
        E: From<RepositoryError>,
        F: FnMut(ProductExportRow) -> Result<(), E>;
}
