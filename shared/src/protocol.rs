use crate::{
    AdminProfile, DashboardAnalytics, Report, ReportPage, ReportStatus, UserPage, UserRole,
    UserStatus, DEFAULT_PAGE_SIZE,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

// =========================================================
// 查询参数 (Query Parameters)
// =========================================================

/// URL 查询参数集合
///
/// 值为空（或 None）的键直接省略，不会以空字符串的形式出现在查询串里。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加参数，去除首尾空白后为空的值会被忽略
    pub fn push(&mut self, key: &str, value: impl ToString) -> &mut Self {
        let value = value.to_string();
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.0.push((key.to_string(), trimmed.to_string()));
        }
        self
    }

    pub fn push_opt<V: ToString>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.push(key, v);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 编码为 `application/x-www-form-urlencoded` 查询串（不含 `?`）
    pub fn to_query_string(&self) -> String {
        // 键值都是 String，序列化不会失败
        serde_urlencoded::to_string(&self.0).unwrap_or_default()
    }
}

// =========================================================
// 接口定义 (Endpoint Trait)
// =========================================================

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// 操作名称，用于错误追踪和日志，如 `reports.list`
    const OPERATION: &'static str;

    /// The URL path, relative to the API base URL.
    fn path(&self) -> String;

    fn query(&self) -> QueryParams {
        QueryParams::new()
    }

    fn body(&self) -> Option<serde_json::Value> {
        None
    }
}

/// `{ data: ... }` 响应信封
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 变更类接口的响应，内容只用于提示
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationAck {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

// =========================================================
// 认证接口 (Auth Endpoints)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 登录响应：成功时包含 token 与 admin，失败时可能只有 `success: false`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub admin: Option<AdminProfile>,
    #[serde(default)]
    pub message: Option<String>,
}

impl LoginResponse {
    /// 只有同时拿到非空 token 和 admin 才算登录成功
    pub fn into_session(self) -> Option<(String, AdminProfile)> {
        if self.success == Some(false) {
            return None;
        }
        match (self.token, self.admin) {
            (Some(token), Some(admin)) if !token.trim().is_empty() => Some((token, admin)),
            _ => None,
        }
    }
}

impl ApiRequest for LoginRequest {
    type Response = LoginResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const OPERATION: &'static str = "auth.login";

    fn path(&self) -> String {
        "/api/admin/auth/login".to_string()
    }

    fn body(&self) -> Option<serde_json::Value> {
        Some(json!({ "username": self.username, "password": self.password }))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutRequest;

impl ApiRequest for LogoutRequest {
    // 响应体被忽略
    type Response = serde_json::Value;
    const METHOD: HttpMethod = HttpMethod::Post;
    const OPERATION: &'static str = "auth.logout";

    fn path(&self) -> String {
        "/api/admin/auth/logout".to_string()
    }

    fn body(&self) -> Option<serde_json::Value> {
        Some(json!({}))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub admin: Option<AdminProfile>,
}

impl ApiRequest for VerifyRequest {
    type Response = VerifyResponse;
    const METHOD: HttpMethod = HttpMethod::Get;
    const OPERATION: &'static str = "auth.verify";

    fn path(&self) -> String {
        "/api/admin/auth/verify".to_string()
    }
}

// =========================================================
// 仪表盘 (Dashboard)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardAnalyticsRequest;

impl ApiRequest for DashboardAnalyticsRequest {
    type Response = Envelope<DashboardAnalytics>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const OPERATION: &'static str = "dashboard.analytics";

    fn path(&self) -> String {
        "/api/admin/dashboard/analytics".to_string()
    }
}

// =========================================================
// 举报管理 (Reports)
// =========================================================

/// 举报列表查询
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListReportsRequest {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub status: Option<ReportStatus>,
    pub report_type: Option<String>,
}

impl Default for ListReportsRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: None,
            status: None,
            report_type: None,
        }
    }
}

impl ApiRequest for ListReportsRequest {
    type Response = Envelope<ReportPage>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const OPERATION: &'static str = "reports.list";

    fn path(&self) -> String {
        "/api/admin/reports".to_string()
    }

    fn query(&self) -> QueryParams {
        let mut q = QueryParams::new();
        q.push("page", self.page.max(1))
            .push("limit", self.limit.max(1))
            .push_opt("search", self.search.as_deref())
            .push_opt("status", self.status.map(|s| s.as_str()))
            .push_opt("reportType", self.report_type.as_deref());
        q
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetReportRequest {
    pub id: String,
}

impl ApiRequest for GetReportRequest {
    type Response = Envelope<Report>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const OPERATION: &'static str = "reports.get";

    fn path(&self) -> String {
        format!("/api/admin/reports/{}", self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReportStatusRequest {
    pub id: String,
    pub status: ReportStatus,
}

impl ApiRequest for UpdateReportStatusRequest {
    type Response = MutationAck;
    const METHOD: HttpMethod = HttpMethod::Put;
    const OPERATION: &'static str = "reports.update_status";

    fn path(&self) -> String {
        format!("/api/admin/reports/{}/status", self.id)
    }

    fn body(&self) -> Option<serde_json::Value> {
        Some(json!({ "status": self.status }))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteReportRequest {
    pub id: String,
}

impl ApiRequest for DeleteReportRequest {
    type Response = MutationAck;
    const METHOD: HttpMethod = HttpMethod::Delete;
    const OPERATION: &'static str = "reports.delete";

    fn path(&self) -> String {
        format!("/api/admin/reports/{}", self.id)
    }
}

// =========================================================
// 用户管理 (Users)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListUsersRequest {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

impl Default for ListUsersRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: None,
            role: None,
            status: None,
        }
    }
}

impl ApiRequest for ListUsersRequest {
    type Response = Envelope<UserPage>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const OPERATION: &'static str = "users.list";

    fn path(&self) -> String {
        "/api/admin/users".to_string()
    }

    fn query(&self) -> QueryParams {
        let mut q = QueryParams::new();
        q.push("page", self.page.max(1))
            .push("limit", self.limit.max(1))
            .push_opt("search", self.search.as_deref())
            .push_opt("role", self.role.map(|r| r.as_str()))
            .push_opt("status", self.status.map(|s| s.as_str()));
        q
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRoleRequest {
    pub id: String,
    pub role: UserRole,
}

impl ApiRequest for UpdateUserRoleRequest {
    type Response = MutationAck;
    const METHOD: HttpMethod = HttpMethod::Put;
    const OPERATION: &'static str = "users.update_role";

    fn path(&self) -> String {
        format!("/api/admin/users/{}/role", self.id)
    }

    fn body(&self) -> Option<serde_json::Value> {
        Some(json!({ "role": self.role }))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserStatusRequest {
    pub id: String,
    pub status: UserStatus,
}

impl ApiRequest for UpdateUserStatusRequest {
    type Response = MutationAck;
    const METHOD: HttpMethod = HttpMethod::Put;
    const OPERATION: &'static str = "users.update_status";

    fn path(&self) -> String {
        format!("/api/admin/users/{}/status", self.id)
    }

    fn body(&self) -> Option<serde_json::Value> {
        Some(json!({ "status": self.status }))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteUserRequest {
    pub id: String,
}

impl ApiRequest for DeleteUserRequest {
    type Response = MutationAck;
    const METHOD: HttpMethod = HttpMethod::Delete;
    const OPERATION: &'static str = "users.delete";

    fn path(&self) -> String {
        format!("/api/admin/users/{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_are_omitted_from_query() {
        let req = ListReportsRequest {
            page: 2,
            search: Some("   ".to_string()),
            status: None,
            report_type: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(req.query().to_query_string(), "page=2&limit=10");
    }

    #[test]
    fn query_values_are_form_encoded() {
        let req = ListUsersRequest {
            search: Some("a&b c".to_string()),
            role: Some(UserRole::ReporterUser),
            ..Default::default()
        };

        assert_eq!(
            req.query().to_query_string(),
            "page=1&limit=10&search=a%26b+c&role=reporter_user"
        );
    }

    #[test]
    fn login_response_requires_token_and_admin() {
        let ok: LoginResponse =
            serde_json::from_str(r#"{"token":"abc","admin":{"id":1,"username":"admin"}}"#)
                .unwrap();
        assert!(ok.into_session().is_some());

        let rejected: LoginResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(rejected.into_session().is_none());

        let blank: LoginResponse =
            serde_json::from_str(r#"{"token":"","admin":{"id":1}}"#).unwrap();
        assert!(blank.into_session().is_none());
    }

    #[test]
    fn mutation_bodies_use_wire_names() {
        let req = UpdateReportStatusRequest {
            id: "r1".to_string(),
            status: ReportStatus::UnderInvestigation,
        };
        assert_eq!(req.path(), "/api/admin/reports/r1/status");
        assert_eq!(req.body(), Some(json!({ "status": "under_investigation" })));
    }
}
