//! Mine Radar 管理后台前端
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义（领域模型）
//! - `web::router`: 路由服务（核心引擎，接入会话核心的路由守卫）
//! - `auth`: 认证状态管理
//! - `components`: UI 组件层
//!
//! 会话、请求和守卫逻辑都在 `mineradar-admin` 中，这里只负责浏览器接入和渲染。

mod api;
mod auth;
mod components {
    pub mod dashboard;
    pub mod filters;
    mod icons;
    pub mod layout;
    pub mod login;
    pub mod notice;
    mod pager;
    pub mod reports;
    pub mod users;
}

use crate::auth::AuthContext;
use crate::components::dashboard::DashboardPage;
use crate::components::login::LoginPage;
use crate::components::reports::ReportsPage;
use crate::components::users::UsersPage;

use leptos::prelude::*;
use mineradar_shared::AdminProfile;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，并实现会话核心需要的
// `HttpClient` / `Timer` / `KeyValueStorage`。
pub(crate) mod web {
    mod http;
    pub mod route;
    pub mod router;
    mod storage;
    mod timer;

    pub use http::FetchHttpClient;
    pub use storage::BrowserStorage;
    pub use timer::BrowserTimer;
}

use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::Reports => view! { <ReportsPage /> }.into_any(),
        AppRoute::Users => view! { <UsersPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 装配服务（配置错误时无法继续）
    let services = match api::build_services() {
        Ok(services) => services,
        Err(e) => {
            log::error!("[App] {}", e);
            return view! {
                <div class="flex items-center justify-center min-h-screen bg-base-200">
                    <div role="alert" class="alert alert-error max-w-lg">
                        <span>{format!("Configuration error: {}", e.message())}</span>
                    </div>
                </div>
            }
            .into_any();
        }
    };
    let guard = StoredValue::new_local(services.guard.clone());

    // 2. 创建认证上下文
    let auth_ctx = AuthContext::new(services);
    provide_context(auth_ctx);

    // 3. 获取认证状态信号，用于注入路由服务（解耦！）
    let is_authenticated = auth_ctx.is_authenticated_signal();
    let profile = auth_ctx.profile;
    let on_authorized = Callback::new(move |admin: AdminProfile| profile.set(Some(admin)));

    view! {
        // 4. 路由器组件：注入认证信号和守卫
        <Router is_authenticated=is_authenticated guard=guard on_authorized=on_authorized>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
    .into_any()
}
