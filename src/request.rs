use crate::error::{AdminError, AdminResult};
use mineradar_shared::protocol::HttpMethod;
use std::collections::HashMap;
use std::time::Duration;

#[cfg(test)]
use std::cell::RefCell;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 通用 HTTP 请求结构
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP 客户端特性 (Trait)
///
/// 浏览器里的 fetch future 不是 Send 的，所以用 `async_trait(?Send)`。
/// 只有拿不到响应时才返回 `Err`，非 2xx 状态码属于正常响应。
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> AdminResult<HttpResponse>;
}

/// 计时器特性，用于给请求加截止时间
#[async_trait::async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

/// 预设的响应
#[cfg(test)]
#[derive(Debug, Clone)]
pub enum MockReply {
    Status(u16, String),
    /// 模拟连接失败
    NetworkError(String),
    /// 模拟永不返回的请求
    Hang,
}

#[cfg(test)]
pub struct MockHttpClient {
    // (方法, URL) -> 响应；方法为 None 表示匹配任意方法
    // 先按方法匹配，再退回任意方法；每一级都先用完整 URL，再用去掉查询串的 URL
    responses: RefCell<HashMap<(Option<HttpMethod>, String), MockReply>>,
    // 记录发出的请求
    pub requests: RefCell<Vec<HttpRequest>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn mock_response(&self, url: &str, status: u16, body: serde_json::Value) {
        self.mock_reply(url, MockReply::Status(status, body.to_string()));
    }

    pub fn mock_reply(&self, url: &str, reply: MockReply) {
        self.responses.borrow_mut().insert((None, url.to_string()), reply);
    }

    /// 只对指定方法生效的响应，优先于不限方法的响应
    pub fn mock_method_response(&self, method: HttpMethod, url: &str, status: u16, body: serde_json::Value) {
        self.responses
            .borrow_mut()
            .insert((Some(method), url.to_string()), MockReply::Status(status, body.to_string()));
    }

    /// 最后一个发往该 URL 前缀的请求
    pub fn last_request_to(&self, url_prefix: &str) -> Option<HttpRequest> {
        self.requests
            .borrow()
            .iter()
            .rev()
            .find(|r| r.url.starts_with(url_prefix))
            .cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> AdminResult<HttpResponse> {
        self.requests.borrow_mut().push(req.clone());

        let reply = {
            let responses = self.responses.borrow();
            let without_query = req.url.split('?').next().unwrap_or(&req.url);
            [Some(req.method), None]
                .into_iter()
                .flat_map(|m| [(m, req.url.clone()), (m, without_query.to_string())])
                .find_map(|key| responses.get(&key).cloned())
        };

        match reply {
            Some(MockReply::Status(status, body)) => Ok(HttpResponse { status, body }),
            Some(MockReply::NetworkError(msg)) => Err(AdminError::network(msg)),
            Some(MockReply::Hang) => futures::future::pending().await,
            None => Ok(HttpResponse {
                status: 404,
                body: "Not Found".to_string(),
            }),
        }
    }
}

#[cfg(test)]
pub struct TokioTimer;

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// =========================================================
// 测试工具: 真实网络 (reqwest)
// =========================================================

#[cfg(test)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

#[cfg(test)]
impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, req: HttpRequest) -> AdminResult<HttpResponse> {
        let method = match req.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &req.url);
        for (k, v) in req.headers {
            builder = builder.header(k, v);
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| AdminError::network(format!("Reqwest Error: {}", e)).with_source(e))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| AdminError::network(format!("Reqwest Body Error: {}", e)).with_source(e))?;

        Ok(HttpResponse { status, body })
    }
}
