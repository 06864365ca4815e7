//! 聊天补全客户端：OpenAI兼容端点，错误按权限/配额/传输/格式区分

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// 外部服务错误分类
///
/// 每一类都要给用户可读的信息，并且只影响出错的那次调用。
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("权限不足或API密钥无效: {0}")]
    Permission(String),
    #[error("配额或速率超限: {0}")]
    Quota(String),
    #[error("请求失败: {0}")]
    Transport(String),
    #[error("响应不符合预期结构: {0}")]
    MalformedResponse(String),
}

/// 聊天补全服务：对核心来说是一个"纯但不可靠"的远程函数
pub trait ChatService {
    fn complete(
        &self,
        system: &str,
        user: &str,
    ) -> impl std::future::Future<Output = Result<String, ServiceError>> + Send;
}

/// OpenAI兼容的聊天补全客户端
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// 替换端点（自建网关或兼容服务）
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl ChatService for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ServiceError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": 0.2,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ServiceError::Permission(format!("HTTP {}", status)));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ServiceError::Quota(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::Transport(format!("HTTP {}: {}", status, text)));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                ServiceError::MalformedResponse("响应中缺少 choices[0].message.content".to_string())
            })
    }
}
