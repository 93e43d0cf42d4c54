//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 验证 -> 处理 -> 加载"的导航流程，验证步骤交给会话核心的 `RouteGuard`。

use leptos::prelude::*;
use leptos::task::spawn_local;
use mineradar_admin::{GuardOutcome, GuardState, RouteGuard};
use mineradar_shared::AdminProfile;
use wasm_bindgen::prelude::*;

use super::route::AppRoute;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 认证状态和守卫都由外部注入，路由本身不了解会话细节。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 当前路由（只读信号）
    current_route: ReadSignal<AppRoute>,
    /// 设置当前路由（写入信号）
    set_route: WriteSignal<AppRoute>,
    /// 受保护页面的守卫状态
    guard_state: RwSignal<GuardState>,
    /// 认证状态检查（注入的信号，实现解耦）
    is_authenticated: Signal<bool>,
    guard: StoredValue<RouteGuard, LocalStorage>,
    /// 守卫放行时回传最新的管理员资料
    on_authorized: Callback<AdminProfile>,
}

impl RouterService {
    fn new(
        is_authenticated: Signal<bool>,
        guard: StoredValue<RouteGuard, LocalStorage>,
        on_authorized: Callback<AdminProfile>,
    ) -> Self {
        // 先用 URL 解析出的路由占位，真正的守卫判定在 provide_router 中完成
        let initial_route = AppRoute::from_path(&current_path());
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            guard_state: RwSignal::new(GuardState::Checking),
            is_authenticated,
            guard,
            on_authorized,
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    pub fn guard_state(&self) -> RwSignal<GuardState> {
        self.guard_state
    }

    /// **核心方法：导航与守卫**
    ///
    /// 流程：请求 -> 验证(Guard) -> 处理 -> 加载
    pub fn navigate(&self, path: &str) {
        let target_route = AppRoute::from_path(path);
        self.navigate_to_route(target_route, true);
    }

    /// 重新检查当前页面（例如刷新按钮）
    pub fn reload(&self) {
        self.navigate_to_route(self.current_route.get_untracked(), false);
    }

    /// 写入 History 并切换页面
    fn commit(&self, route: AppRoute, use_push: bool) {
        if use_push {
            push_history_state(route.to_path());
        } else {
            replace_history_state(route.to_path());
        }
        self.set_route.set(route);
    }

    fn redirect_to_login(&self, use_push: bool) {
        self.commit(AppRoute::auth_failure_redirect(), use_push);
    }

    /// 导航到指定路由
    ///
    /// # Arguments
    /// * `target_route` - 目标路由
    /// * `use_push` - true 使用 pushState, false 使用 replaceState
    fn navigate_to_route(&self, target_route: AppRoute, use_push: bool) {
        // --- Step 1: 已认证用户访问登录页，转到概览页 ---
        if target_route.should_redirect_when_authenticated()
            && self.is_authenticated.get_untracked()
        {
            log::debug!("[Router] Already authenticated. Redirecting to Dashboard.");
            self.navigate_to_route(AppRoute::auth_success_redirect(), use_push);
            return;
        }

        if !target_route.requires_auth() {
            self.commit(target_route, use_push);
            return;
        }

        // --- Step 2: 验证目标路由 ---
        let guard = self.guard.get_value();
        let ticket = guard.begin_navigation();

        match guard.initial_state() {
            GuardState::Redirecting(reason) => {
                log::info!("[Router] Access denied ({:?}). Redirecting to Login.", reason);
                self.guard_state.set(GuardState::Redirecting(reason));
                self.redirect_to_login(use_push);
            }
            GuardState::Authorized(profile) => {
                self.on_authorized.run(profile.clone());
                self.guard_state.set(GuardState::Authorized(profile));
                self.commit(target_route, use_push);
            }
            GuardState::Checking => {
                // --- Step 3: 等待服务端校验，期间页面显示加载中 ---
                self.guard_state.set(GuardState::Checking);
                self.commit(target_route, use_push);

                let router = *self;
                spawn_local(async move {
                    match guard.check(&ticket).await {
                        GuardOutcome::Settled(GuardState::Authorized(profile)) => {
                            router.on_authorized.run(profile.clone());
                            router.guard_state.set(GuardState::Authorized(profile));
                        }
                        GuardOutcome::Settled(GuardState::Redirecting(reason)) => {
                            log::info!("[Router] Verification failed ({:?}). Redirecting to Login.", reason);
                            router.guard_state.set(GuardState::Redirecting(reason));
                            router.redirect_to_login(false);
                        }
                        GuardOutcome::Settled(GuardState::Checking) => {}
                        GuardOutcome::Superseded => {
                            log::debug!("[Router] Navigation #{} superseded.", ticket.id());
                        }
                    }
                });
            }
        }
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let router = *self;

        let closure = Closure::<dyn Fn()>::new(move || {
            // popstate 时也执行守卫逻辑
            let target_route = AppRoute::from_path(&current_path());
            router.navigate_to_route(target_route, false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 设置认证状态变化时的自动重定向
    fn setup_auth_redirect(&self) {
        let router = *self;

        // 使用 Effect 监听认证状态变化
        Effect::new(move |_| {
            let is_auth = router.is_authenticated.get();
            let route = router.current_route.get_untracked();

            if is_auth {
                // 用户刚登录，如果在登录页则重定向到面板
                if route.should_redirect_when_authenticated() {
                    log::debug!("[Router] Auth state changed: logged in, redirecting to dashboard.");
                    router.navigate_to_route(AppRoute::auth_success_redirect(), true);
                }
            } else if route.requires_auth() {
                // 会话失效（登出、401、校验失败），如果在受保护页面则重定向到登录
                log::debug!("[Router] Auth state changed: logged out, redirecting to login.");
                // 作废进行中的校验
                router.guard.with_value(|guard| {
                    guard.begin_navigation();
                });
                router.redirect_to_login(true);
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(
    is_authenticated: Signal<bool>,
    guard: StoredValue<RouteGuard, LocalStorage>,
    on_authorized: Callback<AdminProfile>,
) -> RouterService {
    let router = RouterService::new(is_authenticated, guard, on_authorized);

    // 初始化监听器
    router.init_popstate_listener();
    router.setup_auth_redirect();

    // 首次进入同样经过守卫
    router.navigate_to_route(router.current_route.get_untracked(), false);

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 认证状态信号
    is_authenticated: Signal<bool>,
    /// 受保护页面的守卫
    guard: StoredValue<RouteGuard, LocalStorage>,
    /// 守卫放行时的回调
    on_authorized: Callback<AdminProfile>,
    /// 子组件
    children: Children,
) -> impl IntoView {
    // 提供路由服务到 Context
    provide_router(is_authenticated, guard, on_authorized);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件；受保护页面在守卫放行前显示加载中。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        let authorized = router
            .guard_state()
            .with(|state| matches!(state, GuardState::Authorized(_)));

        if current.requires_auth() && !authorized {
            view! {
                <div class="flex flex-col items-center justify-center min-h-screen gap-4 bg-base-200">
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                    <p class="text-base-content/70">"Verifying session..."</p>
                </div>
            }
            .into_any()
        } else {
            matcher(current)
        }
    }
}

/// 站内链接，点击时走路由服务而不是整页刷新
#[component]
pub fn Link(
    /// 目标路由
    to: AppRoute,
    #[prop(optional, into)] class: String,
    /// 子内容
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate(to.to_path());
    };

    view! {
        <a href=to.to_path() class=class on:click=on_click>
            {children()}
        </a>
    }
}
