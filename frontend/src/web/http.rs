//! HTTP 请求封装模块
//!
//! 使用 `web_sys::fetch` 实现会话核心的 `HttpClient`。

use mineradar_admin::{AdminError, AdminResult, HttpClient, HttpRequest, HttpResponse};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

/// 基于 `window.fetch` 的 HTTP 客户端
///
/// 只有 fetch 本身失败（断网、DNS、CORS）才返回 `Network` 错误，
/// 任何状态码都作为正常响应交给上层处理。
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchHttpClient;

impl FetchHttpClient {
    fn build(req: &HttpRequest) -> AdminResult<Request> {
        let headers = Headers::new()
            .map_err(|e| AdminError::network(format!("创建 Headers 失败: {:?}", e)))?;

        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| AdminError::network(format!("设置 Header 失败: {:?}", e)))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());

        if let Some(body) = &req.body {
            opts.set_body(&JsValue::from_str(body));
        }

        Request::new_with_str_and_init(&req.url, &opts)
            .map_err(|e| AdminError::network(format!("请求构建失败: {:?}", e)))
    }

    async fn read_text(response: &Response) -> AdminResult<String> {
        let promise = response
            .text()
            .map_err(|e| AdminError::network(format!("读取响应失败: {:?}", e)))?;

        let text = JsFuture::from(promise)
            .await
            .map_err(|e| AdminError::network(format!("读取响应失败: {:?}", e)))?;

        Ok(text.as_string().unwrap_or_default())
    }
}

#[async_trait::async_trait(?Send)]
impl HttpClient for FetchHttpClient {
    async fn send(&self, req: HttpRequest) -> AdminResult<HttpResponse> {
        let request = Self::build(&req).map_err(|e| e.in_op_with("fetch", &req.url))?;

        let window =
            web_sys::window().ok_or_else(|| AdminError::network("无法获取 window 对象"))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| AdminError::network(format!("{:?}", e)).in_op_with("fetch", &req.url))?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| AdminError::network(format!("Response 类型转换失败: {:?}", e)))?;

        let status = response.status();
        let body = Self::read_text(&response).await?;
        Ok(HttpResponse { status, body })
    }
}
