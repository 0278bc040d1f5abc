//! Okto 钱包插件
//!
//! 让对话智能体通过自然语言操作 Okto 钱包：
//! - 代币转账、NFT 转账、DEX 兑换
//! - 资产组合、账户、链、代币、NFT 和订单查询
//!
//! # 架构分层
//!
//! - `core`: 核心层，动作契约、宿主运行时接口和钱包接口
//! - `domain`: 领域模型，意图与查询结果
//! - `infrastructure`: 基础设施层，Okto 网关、LLM、签名和日志
//! - `application`: 应用层，钱包服务、动作和插件入口

// 核心层
pub mod core;

// 领域模型
pub mod domain;

// 错误类型
pub mod errors;

// 基础设施层
pub mod infrastructure;

// 应用层
pub mod application;

pub use application::actions::{
    ExplorerAction, ExplorerQuery, NftTransferAction, SwapTokensAction, TransferTokensAction,
};
pub use application::plugin::OktoPlugin;
pub use application::service::OktoService;
pub use core::action::{Action, ActionExample, ActionRegistry, ActionResult};
pub use core::config::{Environment, LlmSettings, PluginConfig};
pub use core::runtime::{AgentRuntime, Content, HandlerCallback, Memory, ModelClass, State};
pub use core::wallet::{SignedUserOp, UserOp, WalletClient};
pub use errors::{PluginError, Result};
pub use infrastructure::logger;
pub use infrastructure::okto::OktoHttpClient;
pub use infrastructure::runtime::LlmAgentRuntime;

/// 插件版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
