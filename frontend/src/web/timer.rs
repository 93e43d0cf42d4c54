//! 定时器封装模块

use gloo_timers::future::TimeoutFuture;
use mineradar_admin::Timer;
use std::time::Duration;

/// 基于 `setTimeout` 的计时器，给请求加截止时间
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserTimer;

#[async_trait::async_trait(?Send)]
impl Timer for BrowserTimer {
    async fn sleep(&self, duration: Duration) {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        TimeoutFuture::new(millis).await;
    }
}
