//! 认证模块
//!
//! 把会话核心的 `AuthService` 接入响应式系统，与路由系统解耦。
//! 路由服务通过注入的认证信号来检查认证状态。

use leptos::prelude::*;
use mineradar_admin::{AdminResult, AdminServices};
use mineradar_shared::AdminProfile;

/// 认证上下文
///
/// 服务对象内部使用 `Rc`，不能跨线程，所以放在 `StoredValue::new_local` 中；
/// 上下文本身是 `Copy` 的，可以随意传给组件和闭包。
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// 当前登录的管理员，`None` 表示未登录
    pub profile: RwSignal<Option<AdminProfile>>,
    services: StoredValue<AdminServices, LocalStorage>,
}

impl AuthContext {
    /// 创建新的认证上下文
    ///
    /// 用本地缓存的资料做乐观渲染；任何会话失效都会把 `profile` 置空，
    /// 路由服务据此跳转到登录页。
    pub fn new(services: AdminServices) -> Self {
        let profile = RwSignal::new(services.auth.cached_profile());

        services.events().subscribe(move |reason| {
            log::info!("[Auth] session invalidated: {:?}", reason);
            profile.set(None);
        });

        Self {
            profile,
            services: StoredValue::new_local(services),
        }
    }

    pub fn services(&self) -> AdminServices {
        self.services.get_value()
    }

    /// 获取认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let profile = self.profile;
        Signal::derive(move || profile.with(Option::is_some))
    }

    pub fn display_name(&self) -> Signal<String> {
        let profile = self.profile;
        Signal::derive(move || {
            profile.with(|p| {
                p.as_ref()
                    .map(|p| p.display_name().to_string())
                    .unwrap_or_default()
            })
        })
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 登录并更新认证状态
///
/// 成功后无需手动导航，路由服务会监听认证状态变化并跳转到概览页。
pub async fn login(ctx: &AuthContext, username: String, password: String) -> AdminResult<AdminProfile> {
    let admin = ctx.services().auth.login(&username, &password).await?;
    ctx.profile.set(Some(admin.clone()));
    Ok(admin)
}

/// 注销
///
/// 服务端调用失败也会清空本地会话；导航由路由服务的认证状态监听自动处理。
pub async fn logout(ctx: &AuthContext) {
    ctx.services().auth.logout().await;
    ctx.profile.set(None);
}
