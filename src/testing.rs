//! 测试共用的装配代码

use crate::api::ApiClient;
use crate::auth::AuthService;
use crate::config::ClientConfig;
use crate::events::SessionEvents;
use crate::request::{MockHttpClient, TokioTimer};
use crate::store::{MemoryStorage, TokenStore};
use mineradar_shared::AdminProfile;
use serde_json::json;
use std::rc::Rc;
use std::time::Duration;

pub const BASE_URL: &str = "http://api.test";

pub fn admin_profile() -> AdminProfile {
    serde_json::from_value(json!({
        "id": "65f0c1",
        "username": "admin",
        "email": "admin@mineradar.example",
        "role": "admin"
    }))
    .unwrap()
}

pub fn url(path: &str) -> String {
    format!("{}{}", BASE_URL, path)
}

pub struct Harness {
    pub http: Rc<MockHttpClient>,
    pub storage: Rc<MemoryStorage>,
    pub store: TokenStore,
    pub events: SessionEvents,
    pub client: ApiClient,
}

impl Harness {
    pub fn new() -> Self {
        let mut config = ClientConfig::new(BASE_URL).unwrap();
        // 测试里的超时要短，挂起的请求才能很快结束
        config.request_timeout = Duration::from_millis(200);
        config.verify_timeout = Duration::from_millis(50);
        Self::with_config(config)
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let http = Rc::new(MockHttpClient::new());
        let storage = Rc::new(MemoryStorage::new());
        let store = TokenStore::new(storage.clone());
        let events = SessionEvents::new();
        let client = ApiClient::new(
            config,
            http.clone(),
            Rc::new(TokioTimer),
            store.clone(),
            events.clone(),
        );
        Self {
            http,
            storage,
            store,
            events,
            client,
        }
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.client.clone())
    }

    /// 直接写入一个完整会话，模拟上次访问留下的状态
    pub fn seed_session(&self, token: &str) {
        self.store.save(token, &admin_profile()).unwrap();
    }
}
