use std::fmt;

// =========================================================
// 错误类型枚举
// =========================================================

/// 错误类型枚举
///
/// 前端只关心错误的语义，HTTP 状态码单独记录在 `AdminError::status` 中。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminErrorKind {
    /// 传输层失败，没有拿到任何响应
    Network,
    /// 请求超过截止时间
    Timeout,
    /// 登录被拒绝
    InvalidCredentials,
    /// 资源接口返回 401，会话已失效
    Unauthorized,
    /// 其他非 2xx 响应
    RequestFailed,
    /// 请求发出前的输入校验失败
    InvalidInput,
    /// JSON 解析或序列化失败
    Serialization,
    /// 浏览器存储读写失败
    Storage,
    /// 配置无效
    Config,
}

impl AdminErrorKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            AdminErrorKind::Network => "NETWORK_ERROR",
            AdminErrorKind::Timeout => "TIMEOUT",
            AdminErrorKind::InvalidCredentials => "INVALID_CREDENTIALS",
            AdminErrorKind::Unauthorized => "UNAUTHORIZED",
            AdminErrorKind::RequestFailed => "REQUEST_FAILED",
            AdminErrorKind::InvalidInput => "INVALID_INPUT",
            AdminErrorKind::Serialization => "JSON_PARSE_ERROR",
            AdminErrorKind::Storage => "STORAGE_ERROR",
            AdminErrorKind::Config => "INVALID_CONFIG",
        }
    }

    /// 是否属于"没有拿到服务端答复"的一类
    pub fn is_transport(&self) -> bool {
        matches!(self, AdminErrorKind::Network | AdminErrorKind::Timeout)
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSpan {
    /// 操作名称，如 "reports.list", "store.save"
    pub operation: String,
    pub detail: Option<String>,
}

impl ErrorSpan {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: None,
        }
    }

    pub fn with_detail(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: Some(detail.into()),
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// Admin client errors
///
/// - kind: 错误语义
/// - message: 给人看的消息
/// - status / body: 触发错误的 HTTP 状态码与服务端原始响应体（诊断用）
/// - spans: 结构化的调用追踪栈
#[derive(Debug)]
pub struct AdminError {
    pub kind: AdminErrorKind,
    pub message: String,
    status: Option<u16>,
    body: Option<String>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    spans: Vec<ErrorSpan>,
}

impl AdminError {
    pub fn new(kind: AdminErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            body: None,
            source: None,
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(AdminErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(AdminErrorKind::Timeout, message)
    }

    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(AdminErrorKind::InvalidCredentials, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(AdminErrorKind::Unauthorized, message)
    }

    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::new(AdminErrorKind::RequestFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(AdminErrorKind::InvalidInput, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(AdminErrorKind::Serialization, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(AdminErrorKind::Storage, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(AdminErrorKind::Config, message)
    }

    // --- Context builders ---

    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::new(operation));
        self
    }

    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::with_detail(operation, detail));
        self
    }

    /// 记录触发错误的 HTTP 响应
    pub fn with_response(mut self, status: u16, body: impl Into<String>) -> Self {
        self.status = Some(status);
        let body = body.into();
        self.body = (!body.is_empty()).then_some(body);
        self
    }

    /// 在边界上重新归类错误，保留状态码、响应体与追踪栈
    pub fn reclassify(mut self, kind: AdminErrorKind, message: impl Into<String>) -> Self {
        self.kind = kind;
        self.message = message.into();
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // --- Accessors ---

    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }

    /// 最外层（最先记录）的操作名称
    pub fn operation(&self) -> Option<&str> {
        self.spans.first().map(|s| s.operation.as_str())
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == AdminErrorKind::Unauthorized
    }

    /// UI 上展示的通用提示
    pub fn user_message(&self) -> &'static str {
        match self.kind {
            AdminErrorKind::Network | AdminErrorKind::Timeout => {
                "Cannot reach the server. Check your connection and try again."
            }
            AdminErrorKind::InvalidCredentials => "Invalid username or password.",
            AdminErrorKind::Unauthorized => "Your session has expired. Please sign in again.",
            AdminErrorKind::InvalidInput => "Please fill in all fields.",
            _ => "Something went wrong. Please refresh and try again.",
        }
    }
}

// =========================================================
// Display & Error trait 实现
// =========================================================

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status)?;
        }

        if !self.spans.is_empty() {
            write!(f, " | trace: ")?;
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", span.operation)?;
                if let Some(detail) = &span.detail {
                    write!(f, "({})", detail)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for AdminError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type AdminResult<T> = std::result::Result<T, AdminError>;

impl From<serde_json::Error> for AdminError {
    fn from(e: serde_json::Error) -> Self {
        AdminError::serialization(e.to_string()).with_source(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_and_trace() {
        let err = AdminError::request_failed("Failed to fetch reports")
            .with_response(500, r#"{"message":"db down"}"#)
            .in_op("reports.list")
            .in_op_with("page.load", "reports");

        assert_eq!(
            err.to_string(),
            "[REQUEST_FAILED] Failed to fetch reports (HTTP 500) | trace: reports.list -> page.load(reports)"
        );
        assert_eq!(err.operation(), Some("reports.list"));
        assert_eq!(err.body(), Some(r#"{"message":"db down"}"#));
    }

    #[test]
    fn empty_body_is_not_recorded() {
        let err = AdminError::unauthorized("expired").with_response(401, "");
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.body(), None);
        assert!(err.is_unauthorized());
    }

    #[test]
    fn serde_errors_keep_their_source() {
        let parse = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = AdminError::from(parse);

        assert_eq!(err.kind, AdminErrorKind::Serialization);
        assert!(std::error::Error::source(&err).is_some());
    }
}
