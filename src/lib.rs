//! Mine Radar 管理后台的会话核心
//!
//! 与平台无关：浏览器存储、fetch 和定时器都通过 trait 注入，
//! 前端 crate 提供 wasm 实现，测试使用内存实现。

pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod guard;
pub mod request;
pub mod store;

#[cfg(test)]
mod testing;

pub use admin::AdminApi;
pub use api::{ApiClient, RequestOptions};
pub use auth::{AuthPhase, AuthService, CachedSession};
pub use config::{AppInfo, ClientConfig};
pub use error::{AdminError, AdminErrorKind, AdminResult};
pub use events::{InvalidationReason, SessionEvents};
pub use guard::{GuardOutcome, GuardPolicy, GuardState, NavigationTicket, RedirectReason, RouteGuard};
pub use request::{HttpClient, HttpRequest, HttpResponse, Timer};
pub use store::{KeyValueStorage, MemoryStorage, Session, TokenStore};

use std::rc::Rc;

// =========================================================
// 服务装配
// =========================================================

/// 一个标签页内共享的全部服务
///
/// 所有服务共用同一个存储和同一条失效信号。
#[derive(Clone)]
pub struct AdminServices {
    pub client: ApiClient,
    pub auth: AuthService,
    pub guard: RouteGuard,
    pub admin: AdminApi,
}

impl AdminServices {
    pub fn new(
        config: ClientConfig,
        http: Rc<dyn HttpClient>,
        timer: Rc<dyn Timer>,
        storage: Rc<dyn KeyValueStorage>,
        policy: GuardPolicy,
    ) -> Self {
        let client = ApiClient::new(
            config,
            http,
            timer,
            TokenStore::new(storage),
            SessionEvents::new(),
        );
        let auth = AuthService::new(client.clone());
        let guard = RouteGuard::new(auth.clone(), policy);
        let admin = AdminApi::new(client.clone());

        log::debug!(
            "[AdminServices] api at {}, guard policy {:?}",
            client.config().base_url,
            policy
        );
        Self {
            client,
            auth,
            guard,
            admin,
        }
    }

    pub fn events(&self) -> &SessionEvents {
        self.client.events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{MockHttpClient, TokioTimer};
    use crate::testing::{BASE_URL, admin_profile, url};
    use serde_json::json;

    #[tokio::test]
    async fn services_share_one_session() {
        let http = Rc::new(MockHttpClient::new());
        let storage = Rc::new(MemoryStorage::new());
        let services = AdminServices::new(
            ClientConfig::new(BASE_URL).unwrap(),
            http.clone(),
            Rc::new(TokioTimer),
            storage.clone(),
            GuardPolicy::default(),
        );
        http.mock_response(
            &url("/api/admin/auth/login"),
            200,
            json!({ "token": "abc", "admin": admin_profile() }),
        );
        http.mock_response(&url("/api/admin/users"), 401, json!({}));

        services.auth.login("admin", "correct").await.unwrap();
        assert_eq!(services.guard.initial_state(), GuardState::Checking);

        let redirected = Rc::new(std::cell::Cell::new(false));
        let flag = redirected.clone();
        services.events().subscribe(move |_| flag.set(true));

        let err = services
            .admin
            .list_users(&Default::default())
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert!(redirected.get());
        assert!(storage.is_empty());
        assert_eq!(
            services.guard.initial_state(),
            GuardState::Redirecting(RedirectReason::NoSession)
        );
    }
}
