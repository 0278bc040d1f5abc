//! Okto 插件入口
//!
//! 插件主入口：OktoPlugin，持有钱包服务和动作注册表

use std::sync::Arc;

use tracing::{debug, info};

use super::actions::{ExplorerAction, NftTransferAction, SwapTokensAction, TransferTokensAction};
use super::service::OktoService;
use crate::core::action::{Action, ActionRegistry, ActionResult};
use crate::core::config::PluginConfig;
use crate::core::runtime::{AgentRuntime, HandlerCallback, Memory};
use crate::errors::{PluginError, Result};
use crate::infrastructure::auth::StaticIdToken;
use crate::infrastructure::okto::OktoHttpClient;

pub const PLUGIN_NAME: &str = "okto";
pub const PLUGIN_DESCRIPTION: &str = "Interface web3 with Okto API";

/// Okto 插件
///
/// 封装钱包服务和全部动作，提供统一的分发入口
pub struct OktoPlugin {
    service: Arc<OktoService>,
    registry: ActionRegistry,
}

impl OktoPlugin {
    /// 注册全部动作；swap 仅在 `enable_swap` 时注册
    pub fn new(service: Arc<OktoService>, enable_swap: bool) -> Result<Self> {
        let registry = ActionRegistry::new();

        registry.register(Arc::new(TransferTokensAction::new(Arc::clone(&service))))?;
        registry.register(Arc::new(NftTransferAction::new(Arc::clone(&service))))?;
        if enable_swap {
            registry.register(Arc::new(SwapTokensAction::new(Arc::clone(&service))))?;
        }
        for action in ExplorerAction::all(&service) {
            registry.register(Arc::new(action))?;
        }

        info!(actions = registry.len(), enable_swap, "Okto plugin ready");
        Ok(Self { service, registry })
    }

    /// 从配置创建 HTTP 钱包客户端和插件
    pub fn from_config(config: &PluginConfig) -> Result<Self> {
        let client = Arc::new(OktoHttpClient::from_config(config)?);
        let id_tokens = Arc::new(StaticIdToken::new(config.google_id_token.clone()));
        let service = Arc::new(OktoService::new(client, id_tokens));
        Self::new(service, config.enable_swap)
    }

    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    pub fn description(&self) -> &'static str {
        PLUGIN_DESCRIPTION
    }

    pub fn service(&self) -> &Arc<OktoService> {
        &self.service
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn actions(&self) -> Vec<Arc<dyn Action>> {
        self.registry.list_all()
    }

    /// 选择处理消息的动作
    ///
    /// 顺序：显式指定的名称，其次消息自带的 `content.action`，最后按关键词路由
    pub fn select(&self, message: &Memory, explicit_action: Option<&str>) -> Result<Option<Arc<dyn Action>>> {
        match explicit_action.or(message.content.action.as_deref()) {
            Some(name) => self
                .registry
                .get(name)
                .map(Some)
                .ok_or_else(|| PluginError::Validation(format!("Unknown action: {}", name))),
            None => Ok(self.registry.route(&message.content.text)),
        }
    }

    /// 分发消息
    ///
    /// 没有匹配的动作时返回 `Ok(None)`，动作拒绝该消息时返回校验错误
    pub async fn dispatch(
        &self,
        runtime: &dyn AgentRuntime,
        message: &Memory,
        explicit_action: Option<&str>,
        callback: Option<&HandlerCallback>,
    ) -> Result<Option<ActionResult>> {
        let Some(action) = self.select(message, explicit_action)? else {
            debug!("no action matched message");
            return Ok(None);
        };

        if !action.validate(runtime, message, None).await {
            return Err(PluginError::Validation(format!(
                "{} cannot handle this message",
                action.name()
            )));
        }

        info!(action = action.name(), "dispatching message");
        let result = action.handle(runtime, message, None, callback).await;
        Ok(Some(result))
    }
}
