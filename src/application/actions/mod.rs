//! Okto 动作
//!
//! 每个动作按相同的流程工作：校验消息、组装上下文、让模型提取意图、
//! 校验意图结构、调用一次钱包服务、通过回调回复用户

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, error};

use crate::core::action::ActionResult;
use crate::core::runtime::{
    compose_context, AgentRuntime, Content, HandlerCallback, Memory, ModelClass, State,
};
use crate::errors::{PluginError, Result};

pub mod explorer;
pub mod nft_transfer;
pub mod swap;
pub mod transfer;

pub use explorer::{ExplorerAction, ExplorerQuery};
pub use nft_transfer::NftTransferAction;
pub use swap::SwapTokensAction;
pub use transfer::TransferTokensAction;

/// 校验消息内容非空
pub fn validate_query(content: &Content) -> Result<()> {
    if content.text.trim().is_empty() {
        return Err(PluginError::Validation("message text is empty".to_string()));
    }
    Ok(())
}

/// 将未预期的错误转换为失败结果
pub fn handle_api_error(err: PluginError) -> ActionResult {
    error!("Okto action error: {}", err);
    ActionResult::failure(format!("okto request failed: {}", err))
}

/// 发送回调消息
pub(crate) fn reply(callback: Option<&HandlerCallback>, text: impl Into<String>) {
    if let Some(callback) = callback {
        callback(Content::text(text));
    }
}

/// 接受非负整数；模型偶尔会给出 `1.0` 或数字字符串
pub(crate) fn whole_number<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u128>,
{
    let value = match Value::deserialize(deserializer)? {
        Value::Number(n) => match n.as_u64() {
            Some(v) => u128::from(v),
            None => match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u128::MAX as f64 => f as u128,
                _ => return Err(D::Error::custom(format!("expected a non-negative integer, got {}", n))),
            },
        },
        Value::String(s) => s
            .trim()
            .parse::<u128>()
            .map_err(|e| D::Error::custom(format!("invalid amount {:?}: {}", s, e)))?,
        other => return Err(D::Error::custom(format!("expected an amount, got {}", other))),
    };
    T::try_from(value).map_err(|_| D::Error::custom(format!("amount {} is out of range", value)))
}

/// 模型提取结果
pub(crate) enum Extraction<T> {
    Valid(T),
    /// 结构不符，附带原始对象和原因
    Invalid(Value, String),
}

/// 组装状态和上下文，让模型按模板提取对象并做结构校验
pub(crate) async fn extract_details<T: DeserializeOwned>(
    runtime: &dyn AgentRuntime,
    message: &Memory,
    state: Option<State>,
    template: &str,
) -> Result<Extraction<T>> {
    let state = match state {
        None => runtime.compose_state(message).await?,
        Some(state) => runtime.update_recent_message_state(state).await?,
    };

    let context = compose_context(&state, template);
    let object = runtime.generate_object(&context, ModelClass::Small).await?;
    debug!(object = %object, "extracted object");

    match serde_json::from_value::<T>(object.clone()) {
        Ok(details) => Ok(Extraction::Valid(details)),
        Err(e) => Ok(Extraction::Invalid(object, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_validate_query() {
        assert!(validate_query(&Content::text("send 1 POL")).is_ok());
        assert!(validate_query(&Content::text("   ")).is_err());
        assert!(validate_query(&Content::default()).is_err());
    }

    #[test]
    fn test_handle_api_error_is_failure() {
        let result = handle_api_error(PluginError::NotAuthenticated);
        assert!(!result.success);
        assert!(result.response.contains("Not authenticated"));
    }

    #[derive(Debug, serde::Deserialize)]
    struct Amounts {
        #[serde(deserialize_with = "whole_number")]
        small: u64,
        #[serde(deserialize_with = "whole_number")]
        large: u128,
    }

    #[test]
    fn test_whole_number_accepts_integral_forms() {
        let parsed: Amounts = serde_json::from_value(serde_json::json!({
            "small": 1.0,
            "large": "340282366920938463463374607431768211455"
        }))
        .unwrap();
        assert_eq!(parsed.small, 1);
        assert_eq!(parsed.large, u128::MAX);

        for bad in [serde_json::json!(1.5), serde_json::json!(-1), serde_json::json!("1e3"), serde_json::json!(null)] {
            let result = serde_json::from_value::<Amounts>(serde_json::json!({ "small": bad, "large": 1 }));
            assert!(result.is_err());
        }
        let too_big = serde_json::from_value::<Amounts>(serde_json::json!({ "small": "18446744073709551616", "large": 1 }));
        assert!(too_big.is_err());
    }

    #[test]
    fn test_reply_invokes_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback = move |content: Content| sink.lock().unwrap().push(content.text);
        reply(Some(&callback), "hello");
        reply(None, "dropped");
        assert_eq!(*seen.lock().unwrap(), vec!["hello".to_string()]);
    }
}
