//! 会话存储
//!
//! `KeyValueStorage` 抽象浏览器的 localStorage，`TokenStore` 在其上维护
//! (token, profile) 两个键。写操作只对 crate 内可见：会话的写入权属于 `AuthService`。

use crate::error::{AdminError, AdminResult};
use mineradar_shared::{AdminProfile, STORAGE_PROFILE_KEY, STORAGE_TOKEN_KEY};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

// =========================================================
// 抽象接口定义
// =========================================================

/// 同步的字符串键值存储（与 `window.localStorage` 同构）
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> AdminResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AdminResult<()>;
    fn remove(&self, key: &str) -> AdminResult<()>;
}

/// 内存实现，用于测试以及没有浏览器存储的环境
#[derive(Debug, Default)]
pub struct MemoryStorage {
    map: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.borrow().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> AdminResult<Option<String>> {
        Ok(self.map.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AdminResult<()> {
        self.map
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AdminResult<()> {
        self.map.borrow_mut().remove(key);
        Ok(())
    }
}

// =========================================================
// 会话快照
// =========================================================

/// 存储中当前的会话内容，两个字段可能各自缺失
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub profile: Option<AdminProfile>,
}

impl Session {
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.profile.is_none()
    }

    /// 只有一半的会话（token 与 profile 不同时存在）
    pub fn is_partial(&self) -> bool {
        self.token.is_some() != self.profile.is_some()
    }

    /// 完整会话才返回 (token, profile)
    pub fn complete(&self) -> Option<(&str, &AdminProfile)> {
        match (&self.token, &self.profile) {
            (Some(token), Some(profile)) => Some((token.as_str(), profile)),
            _ => None,
        }
    }
}

// =========================================================
// TokenStore
// =========================================================

#[derive(Clone)]
pub struct TokenStore {
    storage: Rc<dyn KeyValueStorage>,
}

impl TokenStore {
    pub fn new(storage: Rc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// 读取当前会话
    ///
    /// 读失败按缺失处理；profile 无法解析时同样视为缺失。
    pub fn load(&self) -> Session {
        let token = match self.storage.get(STORAGE_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                log::warn!("[TokenStore] failed to read token: {}", e);
                None
            }
        };

        let profile = match self.storage.get(STORAGE_PROFILE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<AdminProfile>(&raw) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    log::warn!("[TokenStore] stored profile is not valid JSON: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!("[TokenStore] failed to read profile: {}", e);
                None
            }
        };

        Session { token, profile }
    }

    /// 当前 token（API 客户端用来附加 Authorization 头）
    pub fn token(&self) -> Option<String> {
        self.load().token
    }

    /// 同时写入 token 与 profile
    ///
    /// 先写 profile 再写 token：任一步失败都会把两个键一起清掉，
    /// 不留下只有一半的会话。
    pub(crate) fn save(&self, token: &str, profile: &AdminProfile) -> AdminResult<()> {
        let serialized = serde_json::to_string(profile).map_err(|e| {
            AdminError::from(e).in_op("store.save")
        })?;

        let written = self
            .storage
            .set(STORAGE_PROFILE_KEY, &serialized)
            .and_then(|_| self.storage.set(STORAGE_TOKEN_KEY, token));

        if let Err(e) = written {
            self.clear();
            return Err(e.in_op("store.save"));
        }
        Ok(())
    }

    /// 只更新 profile，token 保持不变（校验成功后刷新资料）
    pub(crate) fn refresh_profile(&self, profile: &AdminProfile) -> AdminResult<()> {
        let serialized =
            serde_json::to_string(profile).map_err(|e| AdminError::from(e).in_op("store.refresh"))?;
        self.storage
            .set(STORAGE_PROFILE_KEY, &serialized)
            .map_err(|e| e.in_op("store.refresh"))
    }

    /// 删除两个键，可重复调用
    pub(crate) fn clear(&self) {
        for key in [STORAGE_TOKEN_KEY, STORAGE_PROFILE_KEY] {
            if let Err(e) = self.storage.remove(key) {
                log::warn!("[TokenStore] failed to remove {}: {}", key, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(value: serde_json::Value) -> AdminProfile {
        serde_json::from_value(value).unwrap()
    }

    fn store() -> (Rc<MemoryStorage>, TokenStore) {
        let storage = Rc::new(MemoryStorage::new());
        (storage.clone(), TokenStore::new(storage))
    }

    /// 第二次写入失败的存储
    struct FailingTokenWrite {
        inner: MemoryStorage,
    }

    impl KeyValueStorage for FailingTokenWrite {
        fn get(&self, key: &str) -> AdminResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> AdminResult<()> {
            if key == STORAGE_TOKEN_KEY {
                return Err(AdminError::storage("quota exceeded"));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> AdminResult<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_, store) = store();
        let cases = [
            ("abc", json!({ "id": 1, "username": "admin" })),
            ("t-2", json!({ "id": "65f0", "email": "ops@mine.example", "role": "admin" })),
            ("token with spaces", json!({})),
        ];

        for (token, raw) in cases {
            let p = profile(raw);
            store.save(token, &p).unwrap();
            let session = store.load();
            assert_eq!(session.token.as_deref(), Some(token));
            assert_eq!(session.profile, Some(p));
        }
    }

    #[test]
    fn clear_empties_any_prior_state() {
        let (storage, store) = store();

        // 空存储
        store.clear();
        assert!(store.load().is_empty());

        // 完整会话
        store.save("abc", &profile(json!({ "id": 1 }))).unwrap();
        store.clear();
        assert!(store.load().is_empty());

        // 只有 token
        storage.set(STORAGE_TOKEN_KEY, "orphan").unwrap();
        store.clear();
        assert!(store.load().is_empty());

        // 只有损坏的 profile
        storage.set(STORAGE_PROFILE_KEY, "{not json").unwrap();
        store.clear();
        assert!(store.load().is_empty());
        assert!(storage.is_empty());
    }

    #[test]
    fn corrupt_profile_reads_as_partial() {
        let (storage, store) = store();
        storage.set(STORAGE_TOKEN_KEY, "abc").unwrap();
        storage.set(STORAGE_PROFILE_KEY, "{not json").unwrap();

        let session = store.load();
        assert!(session.is_partial());
        assert!(session.complete().is_none());
    }

    #[test]
    fn failed_save_leaves_nothing_behind() {
        let storage = Rc::new(FailingTokenWrite {
            inner: MemoryStorage::new(),
        });
        let store = TokenStore::new(storage.clone());

        let err = store.save("abc", &profile(json!({ "id": 1 }))).unwrap_err();
        assert_eq!(err.operation(), Some("store.save"));
        assert!(store.load().is_empty());
        assert!(storage.inner.is_empty());
    }
}
