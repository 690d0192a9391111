// ==========================================
// 商品目录批量导入导出 - 分类缓存
// ==========================================
// 职责: 每个批量导入请求开头一次性读取全部分类，批次内只读
// 约束: 批次内不刷新（允许有限陈旧，落库时由外键兜底）
// ==========================================

use crate::domain::CategoryRef;
use crate::repository::{ProductStore, RepositoryResult};
use std::collections::{HashMap, HashSet};

// ==========================================
// CategoryLookup Trait
// ==========================================
// 用途: 行校验所需的分类查询接口
// 实现者: CategoryCache
pub trait CategoryLookup {
    /// 分类 id 是否存在
    fn exists(&self, category_id: i64) -> bool;

    /// 分类名称 → id（大小写不敏感，忽略首尾空白）
    fn resolve_name(&self, name: &str) -> Option<i64>;
}

/// 单批次分类缓存
#[derive(Debug, Clone, Default)]
pub struct CategoryCache {
    ids: HashSet<i64>,
    by_name: HashMap<String, i64>,
}

impl CategoryCache {
    /// 从存储一次性构建缓存
    pub async fn build<S: ProductStore + ?Sized>(store: &S) -> RepositoryResult<Self> {
        let categories = store.list_categories().await?;
        tracing::debug!(count = categories.len(), "分类缓存构建完成");
        Ok(Self::from_categories(categories))
    }

    pub fn from_categories<I>(categories: I) -> Self
    where
        I: IntoIterator<Item = CategoryRef>,
    {
        let mut cache = Self::default();
        for category in categories {
            cache.ids.insert(category.id);
            // 同名分类取第一个（表上有唯一约束，正常不会出现）
            cache
                .by_name
                .entry(name_key(&category.name))
                .or_insert(category.id);
        }
        cache
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl CategoryLookup for CategoryCache {
    fn exists(&self, category_id: i64) -> bool {
        self.ids.contains(&category_id)
    }

    fn resolve_name(&self, name: &str) -> Option<i64> {
        self.by_name.get(&name_key(name)).copied()
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
