//! 运行时配置
//!
//! 配置值通过一个 key 查找函数解析：有覆盖值就用覆盖值，否则回退到默认值。
//! 浏览器构建在编译期通过 `option_env!` 注入，测试直接传入闭包。

use crate::error::{AdminError, AdminResult};
use std::time::Duration;

// =========================================================
// 默认值
// =========================================================

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_VERIFY_TIMEOUT_MS: u64 = 8_000;
pub const DEFAULT_APP_NAME: &str = "Mine Radar Admin Panel";
pub const DEFAULT_APP_VERSION: &str = "1.0.0";
pub const DEFAULT_ENVIRONMENT: &str = "development";

pub const ENV_API_BASE_URL: &str = "MINERADAR_API_BASE_URL";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "MINERADAR_REQUEST_TIMEOUT_MS";
pub const ENV_VERIFY_TIMEOUT_MS: &str = "MINERADAR_VERIFY_TIMEOUT_MS";
pub const ENV_APP_NAME: &str = "MINERADAR_APP_NAME";
pub const ENV_APP_VERSION: &str = "MINERADAR_APP_VERSION";
pub const ENV_ENVIRONMENT: &str = "MINERADAR_ENV";

/// API 客户端配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// 不带结尾 `/` 的 API 根地址
    pub base_url: String,
    /// 普通请求的默认截止时间
    pub request_timeout: Duration,
    /// 路由守卫校验 token 的截止时间
    pub verify_timeout: Duration,
}

impl ClientConfig {
    /// 校验并规范化 base URL
    pub fn new(base_url: &str) -> AdminResult<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            verify_timeout: Duration::from_millis(DEFAULT_VERIFY_TIMEOUT_MS),
        })
    }

    /// 从 key 查找函数解析配置
    ///
    /// 超时值无法解析或为 0 时视为配置错误，而不是静默回退。
    pub fn from_lookup<F>(lookup: F) -> AdminResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_API_BASE_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let mut config = Self::new(&base_url)?;
        if let Some(ms) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            config.request_timeout = parse_timeout(ENV_REQUEST_TIMEOUT_MS, &ms)?;
        }
        if let Some(ms) = lookup(ENV_VERIFY_TIMEOUT_MS) {
            config.verify_timeout = parse_timeout(ENV_VERIFY_TIMEOUT_MS, &ms)?;
        }
        Ok(config)
    }

    /// 编译期环境变量（浏览器构建使用）
    pub fn from_build_env() -> AdminResult<Self> {
        Self::from_lookup(build_env)
    }

    /// 拼接完整 URL，`path` 可带可不带前导 `/`
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// 应用元信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub environment: String,
}

impl AppInfo {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            name: get(ENV_APP_NAME, DEFAULT_APP_NAME),
            version: get(ENV_APP_VERSION, DEFAULT_APP_VERSION),
            environment: get(ENV_ENVIRONMENT, DEFAULT_ENVIRONMENT),
        }
    }

    pub fn from_build_env() -> Self {
        Self::from_lookup(build_env)
    }

    pub fn is_development(&self) -> bool {
        self.environment == DEFAULT_ENVIRONMENT
    }
}

fn build_env(key: &str) -> Option<String> {
    let value = match key {
        ENV_API_BASE_URL => option_env!("MINERADAR_API_BASE_URL"),
        ENV_REQUEST_TIMEOUT_MS => option_env!("MINERADAR_REQUEST_TIMEOUT_MS"),
        ENV_VERIFY_TIMEOUT_MS => option_env!("MINERADAR_VERIFY_TIMEOUT_MS"),
        ENV_APP_NAME => option_env!("MINERADAR_APP_NAME"),
        ENV_APP_VERSION => option_env!("MINERADAR_APP_VERSION"),
        ENV_ENVIRONMENT => option_env!("MINERADAR_ENV"),
        _ => None,
    };
    value.map(str::to_string)
}

fn normalize_base_url(raw: &str) -> AdminResult<String> {
    let url = raw.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(AdminError::config("API base URL is empty").in_op("config.base_url"));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(
            AdminError::config(format!("API base URL must use http or https: {}", url))
                .in_op("config.base_url"),
        );
    }
    Ok(url.to_string())
}

fn parse_timeout(key: &str, raw: &str) -> AdminResult<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(AdminError::config(format!("{} must be a positive integer", key))
            .in_op_with("config.timeout", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdminErrorKind;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn falls_back_to_local_development_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS));

        let info = AppInfo::from_lookup(lookup(&[]));
        assert_eq!(info.name, DEFAULT_APP_NAME);
        assert!(info.is_development());
    }

    #[test]
    fn override_is_normalized() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_BASE_URL, " https://api.mineradar.example/ "),
            (ENV_VERIFY_TIMEOUT_MS, "2500"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://api.mineradar.example");
        assert_eq!(config.verify_timeout, Duration::from_millis(2500));
        assert_eq!(
            config.url("api/admin/users"),
            "https://api.mineradar.example/api/admin/users"
        );
    }

    #[test]
    fn rejects_invalid_values() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_API_BASE_URL, "ftp://x")])).unwrap_err();
        assert_eq!(err.kind, AdminErrorKind::Config);

        let err =
            ClientConfig::from_lookup(lookup(&[(ENV_REQUEST_TIMEOUT_MS, "0")])).unwrap_err();
        assert_eq!(err.kind, AdminErrorKind::Config);
    }
}
