//! 列表页过滤条件
//!
//! 将零散的 signal 整合为结构体，负责：
//! - 数据的持有
//! - 数据的重置
//! - 数据到请求对象的转换
//!
//! 下拉框的"全部"选项对应空字符串，转换时直接省略，不会以空值出现在查询串里。

use leptos::prelude::*;
use mineradar_shared::protocol::{ListReportsRequest, ListUsersRequest};
use mineradar_shared::{DEFAULT_PAGE_SIZE, ReportStatus, UserRole, UserStatus};

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn report_query(page: u32, search: &str, status: &str, report_type: &str) -> ListReportsRequest {
    ListReportsRequest {
        page: page.max(1),
        limit: DEFAULT_PAGE_SIZE,
        search: non_blank(search),
        status: ReportStatus::parse(status),
        report_type: non_blank(report_type),
    }
}

pub fn user_query(page: u32, search: &str, role: &str, status: &str) -> ListUsersRequest {
    ListUsersRequest {
        page: page.max(1),
        limit: DEFAULT_PAGE_SIZE,
        search: non_blank(search),
        role: UserRole::parse(role),
        status: UserStatus::parse(status),
    }
}

/// 举报列表的过滤条件
///
/// 使用 `RwSignal` 因为它实现了 `Copy` trait，非常适合作为 Props 在组件间传递。
#[derive(Clone, Copy)]
pub struct ReportFilters {
    pub search: RwSignal<String>,
    pub status: RwSignal<String>,
    pub report_type: RwSignal<String>,
    pub page: RwSignal<u32>,
}

impl ReportFilters {
    pub fn new() -> Self {
        Self {
            search: RwSignal::new(String::new()),
            status: RwSignal::new(String::new()),
            report_type: RwSignal::new(String::new()),
            page: RwSignal::new(1),
        }
    }

    pub fn reset(&self) {
        self.search.set(String::new());
        self.status.set(String::new());
        self.report_type.set(String::new());
        self.page.set(1);
    }

    /// 追踪所有字段，过滤条件变化时重新请求
    pub fn to_request(&self) -> ListReportsRequest {
        report_query(
            self.page.get(),
            &self.search.get(),
            &self.status.get(),
            &self.report_type.get(),
        )
    }
}

impl Default for ReportFilters {
    fn default() -> Self {
        Self::new()
    }
}

/// 用户列表的过滤条件
#[derive(Clone, Copy)]
pub struct UserFilters {
    pub search: RwSignal<String>,
    pub role: RwSignal<String>,
    pub status: RwSignal<String>,
    pub page: RwSignal<u32>,
}

impl UserFilters {
    pub fn new() -> Self {
        Self {
            search: RwSignal::new(String::new()),
            role: RwSignal::new(String::new()),
            status: RwSignal::new(String::new()),
            page: RwSignal::new(1),
        }
    }

    pub fn reset(&self) {
        self.search.set(String::new());
        self.role.set(String::new());
        self.status.set(String::new());
        self.page.set(1);
    }

    pub fn to_request(&self) -> ListUsersRequest {
        user_query(
            self.page.get(),
            &self.search.get(),
            &self.role.get(),
            &self.status.get(),
        )
    }
}

impl Default for UserFilters {
    fn default() -> Self {
        Self::new()
    }
}
