//! 标准化错误处理
//!
//! 定义插件专用的错误类型

use thiserror::Error;

/// 插件主要错误类型
#[derive(Error, Debug)]
pub enum PluginError {
    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(String),

    /// 输入验证错误
    #[error("Validation error: {0}")]
    Validation(String),

    /// 模型提取的对象不符合预期结构
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// 尚未登录钱包服务
    #[error("Not authenticated with the wallet service")]
    NotAuthenticated,

    /// 钱包服务返回的业务错误
    #[error("Wallet API error [{code}]: {message}")]
    Api { code: String, message: String },

    /// 网络请求错误
    #[error("Network error: {0}")]
    Http(String),

    /// LLM 服务错误
    #[error("LLM service error: {0}")]
    Llm(String),

    /// 签名错误
    #[error("Signing error: {0}")]
    Signing(String),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 未知错误
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl PluginError {
    /// 创建 API 错误
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        PluginError::Api {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for PluginError {
    fn from(err: anyhow::Error) -> Self {
        PluginError::Unknown(format!("{:#}", err))
    }
}

impl From<reqwest::Error> for PluginError {
    fn from(err: reqwest::Error) -> Self {
        PluginError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for PluginError {
    fn from(err: serde_json::Error) -> Self {
        PluginError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for PluginError {
    fn from(err: std::io::Error) -> Self {
        PluginError::Unknown(err.to_string())
    }
}

/// 插件结果类型别名
pub type Result<T> = std::result::Result<T, PluginError>;
