//! LLM 客户端
//!
//! 使用 async-openai 与 OpenAI 兼容接口交互，并从回复中提取 JSON 对象

use anyhow::{Context, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use serde_json::Value;

const JSON_SYSTEM_PROMPT: &str =
    "You extract structured data. Reply with a single JSON object and nothing else.";

/// OpenAI 客户端
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
}

impl OpenAIClient {
    /// 创建新的 OpenAI 客户端
    pub fn new_with_base_url(api_key: String, base_url: String) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();

        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);

        Self {
            client: Client::with_config(config),
        }
    }

    /// 调用聊天 API
    pub async fn chat(&self, model: &str, messages: Vec<Message>) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = messages
            .into_iter()
            .map(|msg| match msg.role.as_str() {
                "system" => ChatCompletionRequestSystemMessageArgs::default()
                    .content(msg.content)
                    .build()
                    .map(ChatCompletionRequestMessage::System),
                _ => ChatCompletionRequestUserMessageArgs::default()
                    .content(msg.content)
                    .build()
                    .map(ChatCompletionRequestMessage::User),
            })
            .collect::<Result<Vec<_>, _>>()
            .context("failed to build chat messages")?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .build()
            .context("failed to build chat request")?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .context("LLM API call failed")?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(content)
    }

    /// 让模型按提示返回 JSON 对象
    pub async fn complete_json(&self, model: &str, prompt: &str) -> Result<Value> {
        let messages = vec![Message::system(JSON_SYSTEM_PROMPT), Message::user(prompt)];
        let reply = self.chat(model, messages).await?;
        extract_json_object(&reply)
            .with_context(|| format!("model reply contained no JSON object: {}", reply))
    }
}

/// 消息结构
#[derive(Clone, Debug)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// 从模型回复中取出第一个 JSON 对象，容忍 ``` 代码块和前后说明文字
pub fn extract_json_object(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&trimmed[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let _client = OpenAIClient::new_with_base_url(
            "test-key".to_string(),
            "https://api.openai.com/v1/".to_string(),
        );
    }

    #[test]
    fn test_message_constructors() {
        let msg = Message::system("rules");
        assert_eq!(msg.role, "system");
        assert_eq!(Message::user("hi").role, "user");
    }

    #[test]
    fn test_extract_plain_object() {
        let value = extract_json_object(r#"{"caipId": "eip155:137"}"#).unwrap();
        assert_eq!(value, json!({"caipId": "eip155:137"}));
    }

    #[test]
    fn test_extract_fenced_object() {
        let reply = "Here you go:\n```json\n{\n  \"transferAmount\": 0.5\n}\n```";
        let value = extract_json_object(reply).unwrap();
        assert_eq!(value["transferAmount"], json!(0.5));
    }

    #[test]
    fn test_extract_rejects_non_objects() {
        assert!(extract_json_object("[1, 2]").is_none());
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("} backwards {").is_none());
    }
}
