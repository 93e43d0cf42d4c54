//! 受保护页面的路由守卫
//!
//! 每次进入受保护页面都会重新走一遍 `Checking -> {Authorized, Redirecting}`。
//! 校验是异步的，期间用户可能已经跳到别的页面，所以每次导航都领一张
//! `NavigationTicket`，结果只在票据仍是最新时生效。

use crate::auth::{AuthService, CachedSession};
use mineradar_shared::AdminProfile;
use std::cell::Cell;
use std::rc::Rc;

/// 进入受保护页面时的判定策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardPolicy {
    /// 本地有完整会话就放行，不访问网络。
    /// 被吊销的 token 要等到下一次资源请求返回 401 才会发现。
    CacheTrust,
    /// 本地有完整会话时再向服务端校验一次，能立即发现被吊销的 token
    #[default]
    ServerVerified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    NoSession,
    PartialSession,
    VerificationFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardState {
    /// 等待服务端校验，界面显示加载中
    Checking,
    Authorized(AdminProfile),
    /// 跳转到登录页
    Redirecting(RedirectReason),
}

impl GuardState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GuardState::Checking)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    Settled(GuardState),
    /// 期间发生了新的导航，结果已作废
    Superseded,
}

/// 一次导航的凭据
#[derive(Debug, Clone)]
pub struct NavigationTicket {
    id: u64,
    latest: Rc<Cell<u64>>,
}

impl NavigationTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.latest.get() == self.id
    }
}

#[derive(Clone)]
pub struct RouteGuard {
    auth: AuthService,
    policy: GuardPolicy,
    latest: Rc<Cell<u64>>,
}

impl RouteGuard {
    pub fn new(auth: AuthService, policy: GuardPolicy) -> Self {
        Self {
            auth,
            policy,
            latest: Rc::new(Cell::new(0)),
        }
    }

    pub fn policy(&self) -> GuardPolicy {
        self.policy
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// 开始一次新导航，之前发出的票据全部失效
    pub fn begin_navigation(&self) -> NavigationTicket {
        let id = self.latest.get() + 1;
        self.latest.set(id);
        NavigationTicket {
            id,
            latest: self.latest.clone(),
        }
    }

    /// 只看本地存储就能得出的状态
    ///
    /// 缺少会话时直接跳转，不需要网络；`ServerVerified` 下完整会话返回 `Checking`。
    pub fn initial_state(&self) -> GuardState {
        match self.auth.cached_session() {
            CachedSession::Empty => GuardState::Redirecting(RedirectReason::NoSession),
            CachedSession::Partial => GuardState::Redirecting(RedirectReason::PartialSession),
            CachedSession::Complete(profile) => match self.policy {
                GuardPolicy::CacheTrust => GuardState::Authorized(profile),
                GuardPolicy::ServerVerified => GuardState::Checking,
            },
        }
    }

    /// 完成一次导航的判定
    ///
    /// 校验带有截止时间（见 `ClientConfig::verify_timeout`），超时按未登录处理，
    /// 所以不会一直停留在 `Checking`。
    pub async fn check(&self, ticket: &NavigationTicket) -> GuardOutcome {
        if !ticket.is_current() {
            return GuardOutcome::Superseded;
        }

        let state = match self.initial_state() {
            GuardState::Checking => match self.auth.verify().await {
                Some(profile) => GuardState::Authorized(profile),
                None => GuardState::Redirecting(RedirectReason::VerificationFailed),
            },
            settled => settled,
        };

        if !ticket.is_current() {
            log::debug!("[RouteGuard] navigation #{} superseded, result dropped", ticket.id);
            return GuardOutcome::Superseded;
        }
        log::debug!("[RouteGuard] navigation #{} -> {:?}", ticket.id, state);
        GuardOutcome::Settled(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::MockReply;
    use crate::store::KeyValueStorage;
    use crate::testing::{Harness, admin_profile, url};
    use mineradar_shared::STORAGE_TOKEN_KEY;
    use serde_json::json;

    const VERIFY: &str = "/api/admin/auth/verify";

    fn guard(h: &Harness, policy: GuardPolicy) -> RouteGuard {
        RouteGuard::new(h.auth(), policy)
    }

    #[test]
    fn server_verified_is_the_default_policy() {
        assert_eq!(GuardPolicy::default(), GuardPolicy::ServerVerified);
    }

    #[tokio::test]
    async fn never_logged_in_is_redirected_without_network() {
        for policy in [GuardPolicy::CacheTrust, GuardPolicy::ServerVerified] {
            let h = Harness::new();
            let g = guard(&h, policy);
            let ticket = g.begin_navigation();

            assert_eq!(
                g.check(&ticket).await,
                GuardOutcome::Settled(GuardState::Redirecting(RedirectReason::NoSession))
            );
            assert_eq!(h.http.request_count(), 0);
        }
    }

    #[tokio::test]
    async fn partial_session_is_redirected_and_cleared() {
        let h = Harness::new();
        h.storage.set(STORAGE_TOKEN_KEY, "abc").unwrap();
        let g = guard(&h, GuardPolicy::CacheTrust);

        let ticket = g.begin_navigation();
        assert_eq!(
            g.check(&ticket).await,
            GuardOutcome::Settled(GuardState::Redirecting(RedirectReason::PartialSession))
        );
        assert!(h.storage.is_empty());
    }

    #[tokio::test]
    async fn cache_trust_authorizes_without_network() {
        let h = Harness::new();
        h.seed_session("abc");
        let g = guard(&h, GuardPolicy::CacheTrust);

        assert_eq!(g.initial_state(), GuardState::Authorized(admin_profile()));
        let ticket = g.begin_navigation();
        assert_eq!(
            g.check(&ticket).await,
            GuardOutcome::Settled(GuardState::Authorized(admin_profile()))
        );
        assert_eq!(h.http.request_count(), 0);
    }

    #[tokio::test]
    async fn server_verified_checks_then_authorizes() {
        let h = Harness::new();
        h.seed_session("abc");
        h.http
            .mock_response(&url(VERIFY), 200, json!({ "success": true }));
        let g = guard(&h, GuardPolicy::ServerVerified);

        assert_eq!(g.initial_state(), GuardState::Checking);
        let ticket = g.begin_navigation();
        assert_eq!(
            g.check(&ticket).await,
            GuardOutcome::Settled(GuardState::Authorized(admin_profile()))
        );
        assert_eq!(h.http.request_count(), 1);
    }

    #[tokio::test]
    async fn revoked_token_is_rechallenged_immediately() {
        let h = Harness::new();
        h.seed_session("revoked");
        h.http
            .mock_response(&url(VERIFY), 200, json!({ "success": false }));
        let g = guard(&h, GuardPolicy::ServerVerified);

        let ticket = g.begin_navigation();
        assert_eq!(
            g.check(&ticket).await,
            GuardOutcome::Settled(GuardState::Redirecting(RedirectReason::VerificationFailed))
        );
        assert!(h.storage.is_empty());
    }

    #[tokio::test]
    async fn hung_verification_falls_back_to_redirect() {
        let h = Harness::new();
        h.seed_session("abc");
        h.http.mock_reply(&url(VERIFY), MockReply::Hang);
        let g = guard(&h, GuardPolicy::ServerVerified);

        let ticket = g.begin_navigation();
        let outcome = tokio::time::timeout(std::time::Duration::from_secs(5), g.check(&ticket))
            .await
            .expect("guard must not stay in Checking");

        assert_eq!(
            outcome,
            GuardOutcome::Settled(GuardState::Redirecting(RedirectReason::VerificationFailed))
        );
        assert!(h.storage.is_empty());
    }

    #[tokio::test]
    async fn stale_navigation_result_is_discarded() {
        let h = Harness::new();
        h.seed_session("abc");
        h.http
            .mock_response(&url(VERIFY), 200, json!({ "success": true }));
        let g = guard(&h, GuardPolicy::ServerVerified);

        let first = g.begin_navigation();
        let pending = g.check(&first);
        let second = g.begin_navigation();

        assert!(!first.is_current());
        assert_eq!(pending.await, GuardOutcome::Superseded);
        assert_eq!(
            g.check(&second).await,
            GuardOutcome::Settled(GuardState::Authorized(admin_profile()))
        );
    }

    #[tokio::test]
    async fn superseded_during_verification() {
        let h = Harness::new();
        h.seed_session("abc");
        h.http.mock_reply(&url(VERIFY), MockReply::Hang);
        let g = guard(&h, GuardPolicy::ServerVerified);

        let first = g.begin_navigation();
        let next = g.clone();
        let (outcome, _) = futures::join!(g.check(&first), async move {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            next.begin_navigation()
        });

        assert_eq!(outcome, GuardOutcome::Superseded);
    }
}
