//! 页面右上角的提示框

use leptos::prelude::*;
use mineradar_admin::AdminError;

/// 提示内容，`is_error` 决定样式
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub is_error: bool,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    /// 失败提示
    ///
    /// 界面只展示通用文案，完整错误（含状态码和追踪）写入日志。
    pub fn failure(action: &str, err: &AdminError) -> Self {
        log::warn!("[UI] {} failed: {}", action, err);
        Self {
            message: format!("{}: {}", action, err.user_message()),
            is_error: true,
        }
    }
}

/// 创建一个 3 秒后自动清除的提示信号
pub fn notice_signal() -> RwSignal<Option<Notice>> {
    let notice = RwSignal::new(None::<Notice>);

    Effect::new(move |_| {
        if notice.with(Option::is_some) {
            set_timeout(move || notice.set(None), std::time::Duration::from_secs(3));
        }
    });

    notice
}

#[component]
pub fn NoticeToast(notice: RwSignal<Option<Notice>>) -> impl IntoView {
    move || {
        notice.get().map(|n| {
            let class = if n.is_error {
                "alert alert-error shadow-lg"
            } else {
                "alert alert-success shadow-lg"
            };
            view! {
                <div class="toast toast-top toast-end z-50">
                    <div class=class>
                        <span>{n.message}</span>
                    </div>
                </div>
            }
        })
    }
}
