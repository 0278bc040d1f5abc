//! 基础设施层：外部系统交互
//!
//! 提供与 Okto 网关、LLM、日志系统的交互能力

pub mod auth;
pub mod evm;
pub mod llm;
pub mod logger;
pub mod okto;
pub mod runtime;
