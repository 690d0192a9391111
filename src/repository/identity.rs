// ==========================================
// 商品目录批量导入导出 - 业务唯一标识工厂
// ==========================================
// 职责: 为新建商品/分类生成 unique_id（36 位 UUID 字符串）
// 由持久化边界显式调用，不依赖隐式生命周期回调
// ==========================================

use uuid::Uuid;

/// unique_id 生成接口
pub trait UniqueIdFactory: Send + Sync {
    fn next_unique_id(&self) -> String;
}

/// 默认实现: UUID v4
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4Factory;

impl UniqueIdFactory for UuidV4Factory {
    fn next_unique_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
