//! 基于 LLM 的运行时实现
//!
//! 为独立运行的插件提供 `AgentRuntime`：按房间保存最近的对话，
//! 通过 OpenAI 兼容接口提取 JSON 对象

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use crate::core::config::LlmSettings;
use crate::core::runtime::{AgentRuntime, Memory, ModelClass, State};
use crate::errors::{PluginError, Result};
use crate::infrastructure::llm::OpenAIClient;

/// 按房间保存的内存对话记录，每个房间最多保留 `limit` 条
pub struct ConversationLog {
    rooms: DashMap<String, Vec<Memory>>,
    limit: usize,
}

impl ConversationLog {
    pub fn new(limit: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            limit: limit.max(1),
        }
    }

    /// 追加消息，超出上限时丢弃最旧的
    pub fn push(&self, message: Memory) {
        let mut room = self.rooms.entry(message.room_id.clone()).or_default();
        room.push(message);
        if room.len() > self.limit {
            let overflow = room.len() - self.limit;
            room.drain(..overflow);
        }
    }

    /// 房间内最近的消息，按时间顺序
    pub fn recent(&self, room_id: &str) -> Vec<Memory> {
        self.rooms
            .get(room_id)
            .map(|room| room.clone())
            .unwrap_or_default()
    }

    /// 格式化为提示词中的对话片段
    pub fn format_recent(&self, room_id: &str) -> String {
        self.recent(room_id)
            .iter()
            .map(|m| format!("{}: {}", m.user, m.content.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// LLM 运行时
pub struct LlmAgentRuntime {
    agent_name: String,
    llm: OpenAIClient,
    settings: LlmSettings,
    log: ConversationLog,
}

impl LlmAgentRuntime {
    pub fn new(agent_name: impl Into<String>, settings: LlmSettings, context_limit: usize) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| PluginError::Config("OPENAI_API_KEY is required for OktoPlugin and is not set".to_string()))?;
        let llm = OpenAIClient::new_with_base_url(api_key, settings.base_url.clone());

        Ok(Self {
            agent_name: agent_name.into(),
            llm,
            settings,
            log: ConversationLog::new(context_limit),
        })
    }

    /// 记录一条消息（例如智能体的回复）
    pub fn remember(&self, message: Memory) {
        self.log.push(message);
    }

    fn model_for(&self, class: ModelClass) -> &str {
        match class {
            ModelClass::Small => &self.settings.small_model,
            ModelClass::Medium | ModelClass::Large => &self.settings.large_model,
        }
    }
}

#[async_trait]
impl AgentRuntime for LlmAgentRuntime {
    async fn compose_state(&self, message: &Memory) -> Result<State> {
        self.log.push(message.clone());
        Ok(State {
            room_id: message.room_id.clone(),
            agent_name: self.agent_name.clone(),
            recent_messages: self.log.format_recent(&message.room_id),
            values: Default::default(),
        })
    }

    async fn update_recent_message_state(&self, mut state: State) -> Result<State> {
        state.recent_messages = self.log.format_recent(&state.room_id);
        Ok(state)
    }

    async fn generate_object(&self, context: &str, model_class: ModelClass) -> Result<Value> {
        let model = self.model_for(model_class);
        debug!(model, "generating object");
        self.llm
            .complete_json(model, context)
            .await
            .map_err(|e| PluginError::Llm(format!("{:#}", e)))
    }
}
