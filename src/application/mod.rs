//! 应用层：钱包服务、提示词模板、动作和插件入口

pub mod actions;
pub mod plugin;
pub mod service;
pub mod templates;
