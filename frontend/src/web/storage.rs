//! LocalStorage 封装模块
//!
//! 使用 `web_sys::Storage` 实现会话核心的 `KeyValueStorage`。

use mineradar_admin::{AdminError, AdminResult, KeyValueStorage};

/// 浏览器 `window.localStorage`
///
/// 隐私模式下 localStorage 可能不可用，此时所有操作返回 `Storage` 错误，
/// 读取方会按"没有会话"处理。
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> AdminResult<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| AdminError::storage("无法获取 window 对象"))?
            .local_storage()
            .map_err(|e| AdminError::storage(format!("{:?}", e)))?
            .ok_or_else(|| AdminError::storage("localStorage 不可用"))
    }
}

impl KeyValueStorage for BrowserStorage {
    fn get(&self, key: &str) -> AdminResult<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| AdminError::storage(format!("{:?}", e)).in_op_with("storage.get", key))
    }

    fn set(&self, key: &str, value: &str) -> AdminResult<()> {
        // 配额已满时 setItem 会抛异常
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| AdminError::storage(format!("{:?}", e)).in_op_with("storage.set", key))
    }

    fn remove(&self, key: &str) -> AdminResult<()> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| AdminError::storage(format!("{:?}", e)).in_op_with("storage.remove", key))
    }
}
