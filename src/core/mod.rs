//! 核心层：插件契约和通用能力
//!
//! 包含动作注册、宿主运行时接口、钱包 SDK 接口和配置管理

pub mod action;
pub mod config;
pub mod runtime;
pub mod wallet;
