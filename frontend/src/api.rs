//! 浏览器环境下的服务装配

use crate::web::{BrowserStorage, BrowserTimer, FetchHttpClient};
use mineradar_admin::{AdminResult, AdminServices, ClientConfig, GuardPolicy};
use std::rc::Rc;

/// 用编译期环境变量构建全部服务
///
/// `MINERADAR_API_BASE_URL` 不合法时返回配置错误，由 `App` 渲染错误页。
pub fn build_services() -> AdminResult<AdminServices> {
    let config = ClientConfig::from_build_env()?;
    log::info!("[App] API base: {}", config.base_url);

    Ok(AdminServices::new(
        config,
        Rc::new(FetchHttpClient),
        Rc::new(BrowserTimer),
        Rc::new(BrowserStorage),
        GuardPolicy::default(),
    ))
}
