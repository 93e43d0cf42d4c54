use serde::{Deserialize, Serialize};

pub mod date;
pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 浏览器存储中保存 Bearer Token 的键
pub const STORAGE_TOKEN_KEY: &str = "admin_token";
/// 浏览器存储中保存管理员资料 (JSON) 的键
pub const STORAGE_PROFILE_KEY: &str = "admin_user";

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_ACCEPT: &str = "Accept";
pub const MIME_JSON: &str = "application/json";

/// 列表页默认的分页大小
pub const DEFAULT_PAGE_SIZE: u32 = 10;

// =========================================================
// 会话模型 (Session Models)
// =========================================================

/// 管理员资料
///
/// 服务端返回的不透明载荷。这里只解析展示用到的字段，
/// 其余字段原样保存在 `extra` 中，保证存储往返后内容不丢失。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdminProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AdminProfile {
    /// 用于 UI 显示的名称
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Admin")
    }
}

// =========================================================
// 资源模型 (Resource Models)
// =========================================================

/// 举报处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[default]
    Pending,
    UnderInvestigation,
    Resolved,
    Dismissed,
    /// 服务端返回了未知的状态值
    #[serde(other)]
    Unknown,
}

impl ReportStatus {
    /// 管理员可以设置的全部状态（下拉框顺序）
    pub const ALL: [ReportStatus; 4] = [
        ReportStatus::Pending,
        ReportStatus::UnderInvestigation,
        ReportStatus::Resolved,
        ReportStatus::Dismissed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::UnderInvestigation => "under_investigation",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Dismissed => "dismissed",
            ReportStatus::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::UnderInvestigation => "Under Investigation",
            ReportStatus::Resolved => "Resolved",
            ReportStatus::Dismissed => "Dismissed",
            ReportStatus::Unknown => "Unknown",
        }
    }

    /// 从下拉框的值解析，未知值返回 None
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

/// 举报类型的已知取值（用于过滤下拉框）
pub const REPORT_TYPES: [&str; 6] = [
    "illegal_mining",
    "illegal_transport",
    "illegal_processing",
    "illegal_trading",
    "illegal_exploration",
    "illegal_smallscale",
];

/// 将举报类型格式化为展示文本，如 `illegal_mining` -> `MINING`
pub fn format_report_type(report_type: Option<&str>) -> String {
    match report_type {
        Some(t) if !t.is_empty() => t
            .replacen("illegal_", "", 1)
            .replacen('_', " ", 1)
            .to_uppercase(),
        _ => "Unknown".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// 违规开采举报
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub report_id: Option<String>,
    #[serde(default)]
    pub report_type: Option<String>,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default)]
    pub submitted_by: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub gps_location: Option<GpsLocation>,
    #[serde(default)]
    pub incident_date: Option<String>,
    #[serde(default)]
    pub incident_time: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
    #[serde(default)]
    pub submitted_at: Option<String>,
}

/// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    NormalUser,
    ReporterUser,
    Admin,
    #[serde(other)]
    Unknown,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::NormalUser, UserRole::ReporterUser, UserRole::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::NormalUser => "normal_user",
            UserRole::ReporterUser => "reporter_user",
            UserRole::Admin => "admin",
            UserRole::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserRole::NormalUser => "Normal User",
            UserRole::ReporterUser => "Reporter",
            UserRole::Admin => "Admin",
            UserRole::Unknown => "Unknown",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == value)
    }
}

/// 用户账号状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Active,
    Blocked,
    #[serde(other)]
    Unknown,
}

impl UserStatus {
    pub const ALL: [UserStatus; 2] = [UserStatus::Active, UserStatus::Blocked];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Blocked => "blocked",
            UserStatus::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserStatus::Active => "Active",
            UserStatus::Blocked => "Blocked",
            UserStatus::Unknown => "Unknown",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// 封禁/解封切换的目标状态
    pub fn toggled(&self) -> Self {
        match self {
            UserStatus::Active => UserStatus::Blocked,
            _ => UserStatus::Active,
        }
    }
}

/// 平台用户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// 服务端分页信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "Pagination::first_page")]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pages: u32,
}

impl Pagination {
    fn first_page() -> u32 {
        1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// 当前页展示的条目区间 (1-based, 闭区间)，空列表返回 None
    pub fn showing_range(&self) -> Option<(u64, u64)> {
        if self.total == 0 || self.limit == 0 {
            return None;
        }
        let limit = u64::from(self.limit);
        let start = u64::from(self.page.saturating_sub(1)) * limit + 1;
        let end = (u64::from(self.page) * limit).min(self.total);
        (start <= end).then_some((start, end))
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            total: 0,
            pages: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportPage {
    #[serde(default)]
    pub reports: Vec<Report>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPage {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub pagination: Pagination,
}

// =========================================================
// 统计模型 (Analytics)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    #[serde(default)]
    pub users: u64,
    #[serde(default)]
    pub reports: u64,
    #[serde(default)]
    pub national_directory: u64,
    #[serde(default)]
    pub local_directory: u64,
    #[serde(default)]
    pub hotspots: u64,
}

/// 聚合桶 `{ _id, count }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountBucket {
    #[serde(rename = "_id", default)]
    pub key: Option<String>,
    #[serde(default)]
    pub count: u64,
}

impl CountBucket {
    pub fn label(&self) -> &str {
        match self.key.as_deref() {
            Some(k) if !k.is_empty() => k,
            _ => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonthKey {
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub month: u32,
}

/// 按月聚合桶 `{ _id: { year, month }, count }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBucket {
    #[serde(rename = "_id", default)]
    pub key: MonthKey,
    #[serde(default)]
    pub count: u64,
}

/// 仪表盘统计数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAnalytics {
    #[serde(default)]
    pub totals: Totals,
    #[serde(default)]
    pub reports_by_status: Vec<CountBucket>,
    #[serde(default)]
    pub reports_by_type: Vec<CountBucket>,
    #[serde(default)]
    pub users_by_role: Vec<CountBucket>,
    #[serde(default)]
    pub reports_by_month: Vec<MonthBucket>,
    #[serde(default)]
    pub recent_reports: Vec<Report>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn admin_profile_keeps_unknown_fields() {
        let raw = json!({ "id": 1, "username": "admin", "lastLogin": "2024-05-01" });
        let profile: AdminProfile = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(profile.username.as_deref(), Some("admin"));
        assert_eq!(profile.id, Some(json!(1)));
        assert_eq!(serde_json::to_value(&profile).unwrap(), raw);
    }

    #[test]
    fn unknown_enum_values_do_not_fail_the_page() {
        let raw = json!({
            "users": [
                { "_id": "u1", "username": "a", "role": "superuser", "status": "suspended" }
            ],
            "pagination": { "page": 1, "limit": 10, "total": 1, "pages": 1 }
        });
        let page: UserPage = serde_json::from_value(raw).unwrap();

        assert_eq!(page.users[0].role, UserRole::Unknown);
        assert_eq!(page.users[0].status, UserStatus::Unknown);
    }

    #[test]
    fn report_type_formatting() {
        assert_eq!(format_report_type(Some("illegal_mining")), "MINING");
        assert_eq!(format_report_type(Some("illegal_small_scale_x")), "SMALL SCALE_X");
        assert_eq!(format_report_type(None), "Unknown");
    }

    #[test]
    fn pagination_range() {
        let p = Pagination {
            page: 2,
            limit: 10,
            total: 15,
            pages: 2,
        };
        assert_eq!(p.showing_range(), Some((11, 15)));
        assert!(!p.has_next());
        assert!(p.has_prev());
        assert_eq!(Pagination::default().showing_range(), None);
    }

    #[test]
    fn status_parse_rejects_unknown() {
        assert_eq!(
            ReportStatus::parse("under_investigation"),
            Some(ReportStatus::UnderInvestigation)
        );
        assert_eq!(ReportStatus::parse("unknown"), None);
        assert_eq!(UserStatus::Blocked.toggled(), UserStatus::Active);
    }
}
