use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 缓存项
#[derive(Debug, Clone)]
struct CacheItem<T> {
    value: T,
    expires_at: Instant,
}

/// 简单的内存缓存实现
///
/// Entries live for a fixed TTL and expired ones are dropped lazily on the
/// next write, so no background task is required. Readers inside the TTL
/// window all observe the same stored snapshot.
#[derive(Debug, Clone)]
pub struct Cache<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<String, CacheItem<T>>>>,
    default_ttl: Duration,
}

impl<T: Clone + Send + Sync + 'static> Cache<T> {
    /// 创建新的缓存实例
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            default_ttl,
        }
    }

    /// 设置缓存项
    pub fn set(&self, key: String, value: T) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// 设置带有自定义TTL的缓存项
    pub fn set_with_ttl(&self, key: String, value: T, ttl: Duration) {
        let item = CacheItem {
            value,
            expires_at: Instant::now() + ttl,
        };

        let mut data = self.data.write();
        // 顺带清理过期项
        let now = Instant::now();
        data.retain(|_, item| item.expires_at > now);
        data.insert(key, item);
    }

    /// 获取缓存项；过期视为不存在
    pub fn get(&self, key: &str) -> Option<T> {
        let data = self.data.read();
        data.get(key)
            .filter(|item| item.expires_at > Instant::now())
            .map(|item| item.value.clone())
    }

    /// 删除缓存项
    pub fn delete(&self, key: &str) -> bool {
        let mut data = self.data.write();
        data.remove(key).is_some()
    }

    /// 清空所有缓存
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.clear();
    }

    /// 获取缓存大小
    pub fn size(&self) -> usize {
        let data = self.data.read();
        data.len()
    }

    /// 检查键是否存在且未过期
    pub fn exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// 生成首页缓存键
///
/// The index feed is the only cached surface. The key embeds the requested
/// page number so a second-page request inside the TTL window is never
/// served the first page's bytes.
pub fn index_page_key(page_number: usize) -> String {
    format!("index_page:{}", page_number)
}
