//! 配置管理
//!
//! 从环境变量（可选 `.env` 文件）加载插件配置

use serde::{Deserialize, Serialize};

use crate::errors::{PluginError, Result};

const REDACTED: &str = "***";

/// Okto 服务环境
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    /// 环境对应的网关地址
    pub fn gateway_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://sandbox-api.okto.tech",
            Environment::Production => "https://apigw.okto.tech",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sandbox" => Ok(Environment::Sandbox),
            "production" => Ok(Environment::Production),
            _ => Err(format!("Unknown Okto environment: {}", s)),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Sandbox => write!(f, "sandbox"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// LLM 配置
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// 不参与序列化
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub small_model: String,
    pub large_model: String,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .field("base_url", &self.base_url)
            .field("small_model", &self.small_model)
            .field("large_model", &self.large_model)
            .finish()
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            small_model: "gpt-4o-mini".to_string(),
            large_model: "gpt-4o".to_string(),
        }
    }
}

/// 插件配置
///
/// 私钥和 id token 不会出现在 `Debug` 输出和序列化结果中
#[derive(Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    pub environment: Environment,
    /// 覆盖默认网关地址
    pub api_base_url: Option<String>,
    #[serde(default, skip_serializing)]
    pub client_private_key: String,
    pub client_swa: String,
    #[serde(default, skip_serializing)]
    pub google_id_token: String,
    /// 是否注册 swap 动作
    pub enable_swap: bool,
    /// 组装提示词时保留的最近消息数
    pub context_limit: usize,
    pub llm: LlmSettings,
}

impl std::fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginConfig")
            .field("environment", &self.environment)
            .field("api_base_url", &self.api_base_url)
            .field("client_private_key", &REDACTED)
            .field("client_swa", &self.client_swa)
            .field("google_id_token", &REDACTED)
            .field("enable_swap", &self.enable_swap)
            .field("context_limit", &self.context_limit)
            .field("llm", &self.llm)
            .finish()
    }
}

impl PluginConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 使用自定义的键值查找函数加载配置
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                PluginError::Config(format!("{} is required for OktoPlugin and is not set", key))
            })
        };

        let environment = match get("OKTO_ENVIRONMENT") {
            Some(raw) => raw.parse::<Environment>().map_err(PluginError::Config)?,
            None => Environment::default(),
        };

        let client_private_key = require("OKTO_CLIENT_PRIVATE_KEY")?;
        let client_swa = require("OKTO_CLIENT_SWA")?;
        let google_id_token = require("GOOGLE_ID_TOKEN")?;

        let enable_swap = get("OKTO_ENABLE_SWAP")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let context_limit = match get("CONTEXT_LIMIT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| PluginError::Config(format!("CONTEXT_LIMIT is not a number: {}", raw)))?,
            None => 32,
        };

        let defaults = LlmSettings::default();
        let llm = LlmSettings {
            api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            small_model: get("OPENAI_SMALL_MODEL").unwrap_or(defaults.small_model),
            large_model: get("OPENAI_LARGE_MODEL").unwrap_or(defaults.large_model),
        };

        Ok(Self {
            environment,
            api_base_url: get("OKTO_API_BASE_URL"),
            client_private_key,
            client_swa,
            google_id_token,
            enable_swap,
            context_limit,
            llm,
        })
    }

    /// 实际使用的网关地址
    pub fn gateway_url(&self) -> String {
        self.api_base_url
            .clone()
            .unwrap_or_else(|| self.environment.gateway_url().to_string())
            .trim_end_matches('/')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("OKTO_CLIENT_PRIVATE_KEY", "0xabc"),
        ("OKTO_CLIENT_SWA", "0xswa"),
        ("GOOGLE_ID_TOKEN", "id-token"),
    ];

    #[test]
    fn test_defaults() {
        let config = PluginConfig::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.environment, Environment::Sandbox);
        assert_eq!(config.gateway_url(), "https://sandbox-api.okto.tech");
        assert!(!config.enable_swap);
        assert_eq!(config.context_limit, 32);
        assert_eq!(config.llm.small_model, "gpt-4o-mini");
    }

    #[test]
    fn test_missing_private_key() {
        let err = PluginConfig::from_lookup(lookup(&REQUIRED[1..])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: OKTO_CLIENT_PRIVATE_KEY is required for OktoPlugin and is not set"
        );
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[1] = ("OKTO_CLIENT_SWA", "  ");
        let err = PluginConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("OKTO_CLIENT_SWA is required"));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("OKTO_ENVIRONMENT", "Production"));
        pairs.push(("OKTO_ENABLE_SWAP", "true"));
        pairs.push(("OKTO_API_BASE_URL", "http://localhost:9000/"));
        let config = PluginConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert!(config.enable_swap);
        assert_eq!(config.gateway_url(), "http://localhost:9000");
    }

    #[test]
    fn test_unknown_environment() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("OKTO_ENVIRONMENT", "staging"));
        assert!(PluginConfig::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_secrets_are_redacted() {
        let mut pairs = vec![
            ("OKTO_CLIENT_PRIVATE_KEY", "0x4c0883a69102937d6231471b5dbb6204fe512961708279f3b5f1a1c1f2b3c4d5"),
            ("OKTO_CLIENT_SWA", "0x5555555555555555555555555555555555555555"),
            ("GOOGLE_ID_TOKEN", "eyJhbGciOiJSUzI1NiJ9.secret-claims.sig"),
        ];
        pairs.push(("OPENAI_API_KEY", "sk-live-openai-secret-key"));
        let config = PluginConfig::from_lookup(lookup(&pairs)).unwrap();

        let debug = format!("{:?}", config);
        let json = serde_json::to_string(&config).unwrap();
        for secret in [
            "4c0883a69102937d6231471b5dbb6204fe512961708279f3b5f1a1c1f2b3c4d5",
            "secret-claims",
            "sk-live-openai-secret-key",
        ] {
            assert!(!debug.contains(secret), "debug leaks {}", secret);
            assert!(!json.contains(secret), "json leaks {}", secret);
        }
        assert!(debug.contains("client_swa: \"0x5555555555555555555555555555555555555555\""));
        assert!(json.contains("0x5555555555555555555555555555555555555555"));

        let back: PluginConfig = serde_json::from_str(&json).unwrap();
        assert!(back.client_private_key.is_empty());
        assert!(back.llm.api_key.is_none());
        assert_eq!(back.client_swa, config.client_swa);
    }
}
