//! 认证服务
//!
//! 会话的唯一写入方。登录成功写入存储，登出、校验失败以及任何
//! `SessionInvalidated` 都会把存储清空。

use crate::api::{ApiClient, RequestOptions};
use crate::error::{AdminError, AdminErrorKind, AdminResult};
use crate::events::{InvalidationReason, ListenerId, SessionEvents};
use crate::store::TokenStore;
use mineradar_shared::AdminProfile;
use mineradar_shared::protocol::{LoginRequest, LogoutRequest, VerifyRequest, VerifyResponse};
use std::cell::Cell;
use std::rc::Rc;

/// 认证状态机
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    LoggedOut,
    /// 登录请求进行中
    Authenticating,
    LoggedIn,
    /// 正在向服务端校验已存储的 token
    VerificationPending,
}

/// 本地存储里的会话状况
#[derive(Debug, Clone, PartialEq)]
pub enum CachedSession {
    Empty,
    /// 只有半个会话，读取时已被清除
    Partial,
    Complete(AdminProfile),
}

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
    store: TokenStore,
    phase: Rc<Cell<AuthPhase>>,
    listener: ListenerId,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        let store = client.store().clone();
        let initial = if store.load().complete().is_some() {
            AuthPhase::LoggedIn
        } else {
            AuthPhase::LoggedOut
        };
        let phase = Rc::new(Cell::new(initial));

        // ApiClient 观察到的 401 经由这里清空会话
        let listener = {
            let store = store.clone();
            let phase = phase.clone();
            client.events().subscribe(move |reason| {
                store.clear();
                phase.set(AuthPhase::LoggedOut);
                log::info!("[Auth] session cleared ({:?})", reason);
            })
        };

        Self {
            client,
            store,
            phase,
            listener,
        }
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase.get()
    }

    pub fn events(&self) -> &SessionEvents {
        self.client.events()
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// 取消对失效事件的订阅（卸载应用时调用）
    pub fn detach(&self) {
        self.client.events().unsubscribe(self.listener);
    }

    // =========================================================
    // 登录 / 登出
    // =========================================================

    /// 用户名密码登录
    ///
    /// 失败时存储保持原样，不会留下任何半个会话。
    pub async fn login(&self, username: &str, password: &str) -> AdminResult<AdminProfile> {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            return Err(
                AdminError::invalid_input("Username and password are required").in_op("auth.login")
            );
        }

        let previous = self.phase.get();
        self.phase.set(AuthPhase::Authenticating);

        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        // 登录的 401 是凭据错误，不是会话失效
        let outcome = match self.client.send_with(&req, RequestOptions::anonymous()).await {
            Ok(resp) => match resp.into_session() {
                Some((token, admin)) => self.store.save(&token, &admin).map(|_| admin),
                None => Err(AdminError::invalid_credentials("Login rejected by server")
                    .in_op("auth.login")),
            },
            Err(e) => Err(classify_login_error(e)),
        };

        match outcome {
            Ok(admin) => {
                self.phase.set(AuthPhase::LoggedIn);
                log::info!("[Auth] {} signed in", admin.display_name());
                Ok(admin)
            }
            Err(e) => {
                self.phase.set(previous);
                log::warn!("[Auth] login failed: {}", e);
                Err(e)
            }
        }
    }

    /// 登出
    ///
    /// 服务端调用只是尽力而为：无论成功、失败还是超时，本地会话都会被清空。
    pub async fn logout(&self) {
        if self.store.token().is_some() {
            let options = RequestOptions::default().observing(false);
            if let Err(e) = self.client.send_with(&LogoutRequest, options).await {
                log::warn!("[Auth] logout request failed, clearing locally: {}", e);
            }
        }
        self.invalidate(InvalidationReason::LoggedOut);
    }

    /// 结束当前会话并通知所有订阅者
    ///
    /// 先在本地清空，不依赖订阅是否还在。
    pub fn invalidate(&self, reason: InvalidationReason) {
        self.store.clear();
        self.phase.set(AuthPhase::LoggedOut);
        self.client.events().emit(reason);
    }

    // =========================================================
    // 会话读取 / 校验
    // =========================================================

    /// 本地缓存的管理员资料，不访问网络
    pub fn cached_profile(&self) -> Option<AdminProfile> {
        self.store.load().complete().map(|(_, p)| p.clone())
    }

    /// 读取本地会话，半个会话会被立即清除
    pub fn cached_session(&self) -> CachedSession {
        let session = self.store.load();
        if let Some((_, profile)) = session.complete() {
            return CachedSession::Complete(profile.clone());
        }
        if session.is_empty() {
            self.phase.set(AuthPhase::LoggedOut);
            return CachedSession::Empty;
        }
        log::warn!("[Auth] partial session in storage, clearing");
        self.invalidate(InvalidationReason::PartialSession);
        CachedSession::Partial
    }

    /// 向服务端确认已存储的 token 仍然有效
    ///
    /// 成功时返回（可能已刷新的）资料；拒绝、网络错误或超时都会清空会话。
    /// 等待期间如果 token 被替换或清除，这次结果作废，返回当前缓存。
    pub async fn verify(&self) -> Option<AdminProfile> {
        let (token, cached) = match self.cached_session() {
            CachedSession::Complete(profile) => match self.store.token() {
                Some(token) => (token, profile),
                None => return None,
            },
            _ => return None,
        };

        self.phase.set(AuthPhase::VerificationPending);
        let options = RequestOptions::default()
            .with_timeout(self.client.config().verify_timeout)
            .observing(false);
        let result = self.client.send_with(&VerifyRequest, options).await;

        if self.store.token().as_deref() != Some(token.as_str()) {
            log::debug!("[Auth] session changed during verification, result discarded");
            return self.cached_profile();
        }

        match result {
            Ok(VerifyResponse {
                success: true,
                admin,
            }) => {
                let profile = admin.unwrap_or(cached);
                if let Err(e) = self.store.refresh_profile(&profile) {
                    log::warn!("[Auth] failed to refresh cached profile: {}", e);
                }
                self.phase.set(AuthPhase::LoggedIn);
                Some(profile)
            }
            Ok(_) => {
                log::info!("[Auth] server rejected stored token");
                self.invalidate(InvalidationReason::VerificationFailed);
                None
            }
            Err(e) => {
                log::warn!("[Auth] verification failed: {}", e);
                self.invalidate(InvalidationReason::VerificationFailed);
                None
            }
        }
    }
}

/// 登录接口的错误归类
///
/// 4xx 一律视为凭据错误；5xx 与传输错误原样保留，便于区分"密码错"和"服务挂了"。
fn classify_login_error(e: AdminError) -> AdminError {
    match (e.kind, e.status()) {
        (AdminErrorKind::Unauthorized, _) => {
            e.reclassify(AdminErrorKind::InvalidCredentials, "Invalid username or password")
        }
        (AdminErrorKind::RequestFailed, Some(status)) if (400..500).contains(&status) => {
            e.reclassify(AdminErrorKind::InvalidCredentials, "Invalid username or password")
        }
        _ => e,
    }
}
