use crate::config::ClientConfig;
use crate::error::{AdminError, AdminResult};
use crate::events::{InvalidationReason, SessionEvents};
use crate::request::{HttpClient, HttpRequest, HttpResponse, Timer};
use crate::store::TokenStore;
use futures::future::{Either, select};
use mineradar_shared::protocol::{ApiRequest, HttpMethod, QueryParams};
use mineradar_shared::{HEADER_ACCEPT, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE, MIME_JSON};
use std::rc::Rc;
use std::time::Duration;

// =========================================================
// 单次请求选项
// =========================================================

/// 单次请求的选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    /// 截止时间，None 表示使用配置里的默认值
    pub timeout: Option<Duration>,
    /// 有 token 时附加 Authorization 头
    pub authenticated: bool,
    /// 401 时发出 `SessionInvalidated`
    pub observe_invalidation: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            authenticated: true,
            observe_invalidation: true,
        }
    }
}

impl RequestOptions {
    /// 不带凭据、也不触发会话失效（登录接口）
    pub fn anonymous() -> Self {
        Self {
            timeout: None,
            authenticated: false,
            observe_invalidation: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn observing(mut self, observe: bool) -> Self {
        self.observe_invalidation = observe;
        self
    }
}

// =========================================================
// ApiClient
// =========================================================

/// 带认证的 API 客户端
///
/// 所有请求都发往同一个 base URL。token 每次请求时从存储读取，
/// 所以登录/登出后无需重建客户端。
#[derive(Clone)]
pub struct ApiClient {
    config: Rc<ClientConfig>,
    http: Rc<dyn HttpClient>,
    timer: Rc<dyn Timer>,
    store: TokenStore,
    events: SessionEvents,
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        http: Rc<dyn HttpClient>,
        timer: Rc<dyn Timer>,
        store: TokenStore,
        events: SessionEvents,
    ) -> Self {
        Self {
            config: Rc::new(config),
            http,
            timer,
            store,
            events,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// 发送一个类型化的接口请求
    pub async fn send<R: ApiRequest>(&self, req: &R) -> AdminResult<R::Response> {
        self.send_with(req, RequestOptions::default()).await
    }

    pub async fn send_with<R: ApiRequest>(
        &self,
        req: &R,
        options: RequestOptions,
    ) -> AdminResult<R::Response> {
        let value = self
            .request(
                R::METHOD,
                &req.path(),
                &req.query(),
                req.body(),
                R::OPERATION,
                options,
            )
            .await?;

        serde_json::from_value(value).map_err(|e| AdminError::from(e).in_op(R::OPERATION))
    }

    /// 通用请求入口
    ///
    /// 2xx 返回解析后的 JSON（空响应体为 `null`），不校验结构；
    /// 其余状态码转换为 `Unauthorized` / `RequestFailed`。
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &QueryParams,
        body: Option<serde_json::Value>,
        operation: &str,
        options: RequestOptions,
    ) -> AdminResult<serde_json::Value> {
        let (req, sent_token) = self.build_request(method, path, query, body, options);
        log::debug!("[ApiClient] {} {} ({})", method.as_str(), path, operation);

        let timeout = options.timeout.unwrap_or(self.config.request_timeout);
        let resp = self
            .dispatch(req, timeout)
            .await
            .map_err(|e| e.in_op(operation.to_string()))?;

        if resp.is_success() {
            return parse_body(&resp.body).map_err(|e| e.in_op(operation.to_string()));
        }

        if resp.status == 401 {
            let err = AdminError::unauthorized(format!("{} rejected: session is no longer valid", operation))
                .with_response(resp.status, resp.body)
                .in_op(operation.to_string());
            if options.observe_invalidation {
                // 请求期间会话已被替换，迟到的 401 不能清掉新会话
                if self.store.token() == sent_token {
                    log::info!("[ApiClient] {} returned 401, invalidating session", operation);
                    self.events.emit(InvalidationReason::Unauthorized);
                } else {
                    log::debug!("[ApiClient] {} returned 401 for a replaced session, ignored", operation);
                }
            }
            return Err(err);
        }

        log::warn!("[ApiClient] {} failed with status {}", operation, resp.status);
        Err(
            AdminError::request_failed(format!("{} failed with status {}", operation, resp.status))
                .with_response(resp.status, resp.body)
                .in_op(operation.to_string()),
        )
    }

    /// 构建请求，同时返回发送时存储里的 token
    fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &QueryParams,
        body: Option<serde_json::Value>,
        options: RequestOptions,
    ) -> (HttpRequest, Option<String>) {
        let mut url = self.config.url(path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.to_query_string());
        }

        let mut req = HttpRequest::new(&url, method).with_header(HEADER_ACCEPT, MIME_JSON);

        let stored = self.store.token();
        if options.authenticated {
            // 没有 token 时完全不带这个头
            if let Some(token) = stored.as_deref().filter(|t| !t.trim().is_empty()) {
                req = req.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
            }
        }

        if let Some(body) = body {
            req = req
                .with_header(HEADER_CONTENT_TYPE, MIME_JSON)
                .with_body(body);
        }
        (req, stored)
    }

    /// 发送请求并与计时器赛跑，先到先得
    async fn dispatch(&self, req: HttpRequest, timeout: Duration) -> AdminResult<HttpResponse> {
        let send = self.http.send(req);
        let deadline = self.timer.sleep(timeout);

        match select(send, deadline).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(AdminError::timeout(format!(
                "no response within {} ms",
                timeout.as_millis()
            ))),
        }
    }
}

fn parse_body(body: &str) -> AdminResult<serde_json::Value> {
    if body.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(body).map_err(AdminError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdminErrorKind;
    use crate::request::MockReply;
    use crate::testing::{BASE_URL, Harness, admin_profile};
    use mineradar_shared::protocol::ListReportsRequest;
    use serde_json::json;
    use std::cell::Cell;

    async fn list_users(h: &Harness, options: RequestOptions) -> AdminResult<serde_json::Value> {
        h.client
            .request(
                HttpMethod::Get,
                "/api/admin/users",
                &QueryParams::new(),
                None,
                "users.list",
                options,
            )
            .await
    }

    #[tokio::test]
    async fn no_authorization_header_without_token() {
        let h = Harness::new();
        h.http
            .mock_response(&format!("{}/api/admin/dashboard/analytics", BASE_URL), 200, json!({ "data": {} }));

        h.client
            .request(
                HttpMethod::Get,
                "/api/admin/dashboard/analytics",
                &QueryParams::new(),
                None,
                "dashboard.analytics",
                RequestOptions::default(),
            )
            .await
            .unwrap();

        let sent = h.http.last_request_to(BASE_URL).unwrap();
        assert!(sent.header(HEADER_AUTHORIZATION).is_none());
        assert!(sent.header(HEADER_CONTENT_TYPE).is_none());
        assert_eq!(sent.header(HEADER_ACCEPT), Some(MIME_JSON));
    }

    #[tokio::test]
    async fn bearer_header_and_content_type_when_applicable() {
        let h = Harness::new();
        h.store.save("abc", &admin_profile()).unwrap();
        let url = format!("{}/api/admin/reports/r1/status", BASE_URL);
        h.http.mock_response(&url, 200, json!({ "success": true }));

        h.client
            .request(
                HttpMethod::Put,
                "/api/admin/reports/r1/status",
                &QueryParams::new(),
                Some(json!({ "status": "resolved" })),
                "reports.update_status",
                RequestOptions::default(),
            )
            .await
            .unwrap();

        let sent = h.http.last_request_to(&url).unwrap();
        assert_eq!(sent.header(HEADER_AUTHORIZATION), Some("Bearer abc"));
        assert_eq!(sent.header(HEADER_CONTENT_TYPE), Some(MIME_JSON));
        assert_eq!(sent.body.as_deref(), Some(r#"{"status":"resolved"}"#));
    }

    #[tokio::test]
    async fn blank_token_never_produces_bearer_header() {
        let h = Harness::new();
        h.store.save("   ", &admin_profile()).unwrap();
        h.http
            .mock_response(&format!("{}/api/admin/users", BASE_URL), 200, json!({ "data": {} }));

        list_users(&h, RequestOptions::default()).await.unwrap();

        let sent = h.http.last_request_to(BASE_URL).unwrap();
        assert!(sent.header(HEADER_AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn anonymous_requests_never_carry_the_token() {
        let h = Harness::new();
        h.store.save("abc", &admin_profile()).unwrap();
        h.http
            .mock_response(&format!("{}/api/ping", BASE_URL), 204, json!(null));

        h.client
            .request(
                HttpMethod::Get,
                "/api/ping",
                &QueryParams::new(),
                None,
                "ping",
                RequestOptions::anonymous(),
            )
            .await
            .unwrap();

        assert!(h.http.last_request_to(BASE_URL).unwrap().header(HEADER_AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn empty_success_body_is_null() {
        let h = Harness::new();
        h.http.mock_reply(
            &format!("{}/api/admin/users/u1", BASE_URL),
            MockReply::Status(204, String::new()),
        );

        let value = h
            .client
            .request(
                HttpMethod::Delete,
                "/api/admin/users/u1",
                &QueryParams::new(),
                None,
                "users.delete",
                RequestOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(value, serde_json::Value::Null);
    }

    #[tokio::test]
    async fn typed_request_encodes_query_without_empty_filters() {
        let h = Harness::new();
        h.http.mock_response(
            &format!("{}/api/admin/reports", BASE_URL),
            200,
            json!({ "data": { "reports": [], "pagination": { "page": 3, "limit": 10, "total": 0, "pages": 0 } } }),
        );

        let req = ListReportsRequest {
            page: 3,
            search: Some(String::new()),
            ..Default::default()
        };
        let page = h.client.send(&req).await.unwrap();

        assert_eq!(page.data.pagination.page, 3);
        let sent = h.http.last_request_to(BASE_URL).unwrap();
        assert_eq!(sent.url, format!("{}/api/admin/reports?page=3&limit=10", BASE_URL));
    }

    #[tokio::test]
    async fn non_success_status_is_request_failed_with_diagnostics() {
        let h = Harness::new();
        h.http.mock_response(
            &format!("{}/api/admin/reports", BASE_URL),
            500,
            json!({ "message": "db down" }),
        );

        let err = h.client.send(&ListReportsRequest::default()).await.unwrap_err();

        assert_eq!(err.kind, AdminErrorKind::RequestFailed);
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.body(), Some(r#"{"message":"db down"}"#));
        assert_eq!(err.operation(), Some("reports.list"));
    }

    #[tokio::test]
    async fn unauthorized_emits_invalidation_only_when_observed() {
        let h = Harness::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        h.events.subscribe(move |_| counter.set(counter.get() + 1));
        h.http
            .mock_response(&format!("{}/api/admin/users", BASE_URL), 401, json!({ "success": false }));

        let err = list_users(&h, RequestOptions::default()).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(hits.get(), 1);

        let err = list_users(&h, RequestOptions::default().observing(false)).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(hits.get(), 1);
    }

    #[tokio::test]
    async fn transport_failure_is_network_error() {
        let h = Harness::new();
        h.http.mock_reply(
            &format!("{}/api/admin/users", BASE_URL),
            MockReply::NetworkError("connection refused".to_string()),
        );

        let err = list_users(&h, RequestOptions::default()).await.unwrap_err();
        assert_eq!(err.kind, AdminErrorKind::Network);
        assert_eq!(err.operation(), Some("users.list"));
    }

    #[tokio::test]
    async fn hung_request_times_out() {
        let h = Harness::new();
        h.http
            .mock_reply(&format!("{}/api/admin/users", BASE_URL), MockReply::Hang);

        let err = list_users(&h, RequestOptions::default().with_timeout(Duration::from_millis(20)))
            .await
            .unwrap_err();
        assert_eq!(err.kind, AdminErrorKind::Timeout);
    }

    #[tokio::test]
    async fn malformed_success_body_is_serialization_error() {
        let h = Harness::new();
        h.http.mock_reply(
            &format!("{}/api/admin/reports", BASE_URL),
            MockReply::Status(200, "<html>".to_string()),
        );

        let err = h.client.send(&ListReportsRequest::default()).await.unwrap_err();
        assert_eq!(err.kind, AdminErrorKind::Serialization);
    }
}
