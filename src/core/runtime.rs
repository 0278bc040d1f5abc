//! Agent 运行时接口
//!
//! 插件只依赖这里定义的能力：组装对话状态、调用模型提取结构化对象、
//! 通过回调向用户发送消息。具体实现由宿主框架提供。

use std::collections::HashMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Result;

/// 消息内容
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub text: String,
    /// 触发的动作名称
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: None,
        }
    }
}

/// 一条对话记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    pub room_id: String,
    pub user: String,
    pub content: Content,
    pub created_at: DateTime<Utc>,
}

impl Memory {
    /// 创建用户消息
    pub fn new(room_id: impl Into<String>, user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            room_id: room_id.into(),
            user: user.into(),
            content: Content::text(text),
            created_at: Utc::now(),
        }
    }
}

/// 提示词组装时可用的状态
#[derive(Debug, Clone, Default)]
pub struct State {
    pub room_id: String,
    pub agent_name: String,
    pub recent_messages: String,
    /// 额外的模板变量
    pub values: HashMap<String, String>,
}

impl State {
    /// 查找模板变量
    pub fn value(&self, key: &str) -> Option<&str> {
        match key {
            "recentMessages" => Some(&self.recent_messages),
            "agentName" => Some(&self.agent_name),
            "roomId" => Some(&self.room_id),
            _ => self.values.get(key).map(|v| v.as_str()),
        }
    }
}

/// 模型规格
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelClass {
    Small,
    Medium,
    Large,
}

/// 动作处理过程中向用户发送消息的回调
pub type HandlerCallback = dyn Fn(Content) + Send + Sync;

/// 宿主运行时能力
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// 为新消息组装状态
    async fn compose_state(&self, message: &Memory) -> Result<State>;

    /// 刷新已有状态中的最近消息
    async fn update_recent_message_state(&self, state: State) -> Result<State>;

    /// 让模型根据上下文生成 JSON 对象
    async fn generate_object(&self, context: &str, model_class: ModelClass) -> Result<Value>;
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid placeholder regex"))
}

/// 用状态替换模板中的 `{{key}}` 占位符，未知的键替换为空串
pub fn compose_context(state: &State, template: &str) -> String {
    placeholder_pattern()
        .replace_all(template, |caps: &regex::Captures<'_>| {
            state.value(&caps[1]).unwrap_or_default().to_string()
        })
        .into_owned()
}
