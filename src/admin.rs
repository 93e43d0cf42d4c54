//! 管理后台的资源接口
//!
//! 薄封装：拆掉 `{ data: ... }` 信封，补上调用方关心的错误上下文。
//! 401 已经由 `ApiClient` 统一处理，这里不再关心。

use crate::api::ApiClient;
use crate::error::AdminResult;
use mineradar_shared::protocol::{
    DashboardAnalyticsRequest, DeleteReportRequest, DeleteUserRequest, GetReportRequest,
    ListReportsRequest, ListUsersRequest, MutationAck, UpdateReportStatusRequest,
    UpdateUserRoleRequest, UpdateUserStatusRequest,
};
use mineradar_shared::{DashboardAnalytics, Report, ReportPage, ReportStatus, UserPage, UserRole, UserStatus};

#[derive(Clone)]
pub struct AdminApi {
    client: ApiClient,
}

impl AdminApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    // =========================================================
    // 仪表盘
    // =========================================================

    pub async fn dashboard_analytics(&self) -> AdminResult<DashboardAnalytics> {
        Ok(self.client.send(&DashboardAnalyticsRequest).await?.data)
    }

    // =========================================================
    // 举报
    // =========================================================

    pub async fn list_reports(&self, query: &ListReportsRequest) -> AdminResult<ReportPage> {
        Ok(self.client.send(query).await?.data)
    }

    pub async fn get_report(&self, id: &str) -> AdminResult<Report> {
        let req = GetReportRequest { id: id.to_string() };
        Ok(self.client.send(&req).await?.data)
    }

    pub async fn update_report_status(&self, id: &str, status: ReportStatus) -> AdminResult<MutationAck> {
        let req = UpdateReportStatusRequest {
            id: id.to_string(),
            status,
        };
        self.client
            .send(&req)
            .await
            .map_err(|e| e.in_op_with("admin.report_status", status.as_str()))
    }

    pub async fn delete_report(&self, id: &str) -> AdminResult<MutationAck> {
        self.client
            .send(&DeleteReportRequest { id: id.to_string() })
            .await
    }

    // =========================================================
    // 用户
    // =========================================================

    pub async fn list_users(&self, query: &ListUsersRequest) -> AdminResult<UserPage> {
        Ok(self.client.send(query).await?.data)
    }

    pub async fn update_user_role(&self, id: &str, role: UserRole) -> AdminResult<MutationAck> {
        let req = UpdateUserRoleRequest {
            id: id.to_string(),
            role,
        };
        self.client
            .send(&req)
            .await
            .map_err(|e| e.in_op_with("admin.user_role", role.as_str()))
    }

    pub async fn update_user_status(&self, id: &str, status: UserStatus) -> AdminResult<MutationAck> {
        let req = UpdateUserStatusRequest {
            id: id.to_string(),
            status,
        };
        self.client
            .send(&req)
            .await
            .map_err(|e| e.in_op_with("admin.user_status", status.as_str()))
    }

    pub async fn delete_user(&self, id: &str) -> AdminResult<MutationAck> {
        self.client
            .send(&DeleteUserRequest { id: id.to_string() })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdminErrorKind;
    use crate::testing::{BASE_URL, Harness, url};
    use mineradar_shared::protocol::HttpMethod;
    use mineradar_shared::{HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE};
    use serde_json::json;

    #[tokio::test]
    async fn list_reports_unwraps_envelope() {
        let h = Harness::new();
        h.seed_session("abc");
        h.http.mock_response(
            &url("/api/admin/reports"),
            200,
            json!({
                "data": {
                    "reports": [{
                        "_id": "r1",
                        "reportId": "RPT-0001",
                        "reportType": "illegal_mining",
                        "status": "under_investigation",
                        "submittedAt": "2024-03-05T10:00:00.000Z"
                    }],
                    "pagination": { "page": 1, "limit": 10, "total": 1, "pages": 1 }
                }
            }),
        );
        let api = AdminApi::new(h.client.clone());

        let page = api
            .list_reports(&ListReportsRequest {
                status: Some(ReportStatus::UnderInvestigation),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.reports.len(), 1);
        assert_eq!(page.reports[0].status, ReportStatus::UnderInvestigation);
        assert_eq!(page.pagination.total, 1);

        let sent = h.http.last_request_to(BASE_URL).unwrap();
        assert_eq!(
            sent.url,
            url("/api/admin/reports?page=1&limit=10&status=under_investigation")
        );
        assert_eq!(sent.header(HEADER_AUTHORIZATION), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn status_update_sends_json_body() {
        let h = Harness::new();
        h.seed_session("abc");
        h.http.mock_response(
            &url("/api/admin/users/u1/status"),
            200,
            json!({ "success": true, "message": "User blocked" }),
        );
        let api = AdminApi::new(h.client.clone());

        let ack = api.update_user_status("u1", UserStatus::Blocked).await.unwrap();

        assert_eq!(ack.message.as_deref(), Some("User blocked"));
        let sent = h.http.last_request_to(&url("/api/admin/users/u1/status")).unwrap();
        assert_eq!(sent.method.as_str(), "PUT");
        assert_eq!(sent.header(HEADER_CONTENT_TYPE), Some("application/json"));
        assert_eq!(sent.body.as_deref(), Some(r#"{"status":"blocked"}"#));
    }

    #[tokio::test]
    async fn failed_mutation_keeps_operation_trace() {
        let h = Harness::new();
        h.seed_session("abc");
        h.http.mock_response(
            &url("/api/admin/reports/r1/status"),
            400,
            json!({ "message": "invalid status" }),
        );
        let api = AdminApi::new(h.client.clone());

        let err = api
            .update_report_status("r1", ReportStatus::Resolved)
            .await
            .unwrap_err();

        assert_eq!(err.kind, AdminErrorKind::RequestFailed);
        assert_eq!(err.operation(), Some("reports.update_status"));
        assert!(err.to_string().contains("admin.report_status(resolved)"));
        // 普通失败不影响会话
        assert_eq!(h.store.token().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn delete_accepts_empty_body() {
        let h = Harness::new();
        h.seed_session("abc");
        h.http.mock_response(&url("/api/admin/reports/r9"), 200, json!({}));
        let api = AdminApi::new(h.client.clone());

        let ack = api.delete_report("r9").await.unwrap();
        assert_eq!(ack, MutationAck::default());
        assert_eq!(
            h.http.last_request_to(&url("/api/admin/reports/r9")).unwrap().method.as_str(),
            "DELETE"
        );
    }

    #[tokio::test]
    async fn read_and_delete_on_same_resource_are_told_apart() {
        let h = Harness::new();
        h.seed_session("abc");
        let report_url = url("/api/admin/reports/r1");
        h.http.mock_method_response(
            HttpMethod::Get,
            &report_url,
            200,
            json!({ "data": { "_id": "r1", "status": "pending" } }),
        );
        h.http.mock_method_response(
            HttpMethod::Delete,
            &report_url,
            409,
            json!({ "message": "report is locked" }),
        );
        let api = AdminApi::new(h.client.clone());

        let report = api.get_report("r1").await.unwrap();
        assert_eq!(report.id, "r1");
        assert_eq!(report.status, ReportStatus::Pending);

        let err = api.delete_report("r1").await.unwrap_err();
        assert_eq!(err.kind, AdminErrorKind::RequestFailed);
        assert_eq!(err.status(), Some(409));
    }
}
