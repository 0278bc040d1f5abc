//! OKTO_SWAP：通过 DEX 路由合约兑换代币

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info, warn};

use super::{extract_details, handle_api_error, reply, validate_query, Extraction};
use crate::application::service::OktoService;
use crate::application::templates::swap_template;
use crate::core::action::{Action, ActionExample, ActionResult};
use crate::core::runtime::{AgentRuntime, HandlerCallback, Memory, State};
use crate::domain::{is_native_token, SwapRequest, NATIVE_TOKEN_PLACEHOLDER};

/// 模型提取的兑换参数，金额以最小单位表示
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapDetails {
    pub from_address: String,
    pub router: String,
    pub token_in: String,
    pub token_out: String,
    #[serde(deserialize_with = "super::whole_number")]
    pub amount_in: u128,
    #[serde(deserialize_with = "super::whole_number")]
    pub min_amount_out: u128,
    pub network: String,
}

impl From<SwapDetails> for SwapRequest {
    fn from(details: SwapDetails) -> Self {
        let is_native = is_native_token(&details.token_in);
        let token_in = if is_native {
            NATIVE_TOKEN_PLACEHOLDER.to_string()
        } else {
            details.token_in
        };
        SwapRequest {
            amount_in: details.amount_in,
            min_amount_out: details.min_amount_out,
            from: details.from_address,
            router: details.router,
            token_in,
            token_out: details.token_out,
            chain: details.network,
            is_native,
        }
    }
}

pub struct SwapTokensAction {
    service: Arc<OktoService>,
}

impl SwapTokensAction {
    pub fn new(service: Arc<OktoService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Action for SwapTokensAction {
    fn name(&self) -> &str {
        "OKTO_SWAP"
    }

    fn description(&self) -> &str {
        "Swap tokens through a DEX router using okto"
    }

    fn similes(&self) -> &[&'static str] {
        &["SWAP", "TOKEN_SWAP", "SWAP_TOKENS", "OKTO_TRADE"]
    }

    fn keywords(&self) -> &[&'static str] {
        &["swap", "exchange", "trade"]
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        vec![vec![ActionExample::user(
            "swap 1000000 of token 0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359 for 0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619 on polygon via router 0xa5E0829CaCEd8fFDD4De3c43696c57F7D7A678ff",
        )]]
    }

    fn suppress_initial_message(&self) -> bool {
        true
    }

    async fn validate(&self, _runtime: &dyn AgentRuntime, message: &Memory, _state: Option<&State>) -> bool {
        validate_query(&message.content).is_ok()
    }

    async fn handle(
        &self,
        runtime: &dyn AgentRuntime,
        message: &Memory,
        state: Option<State>,
        callback: Option<&HandlerCallback>,
    ) -> ActionResult {
        if let Err(e) = validate_query(&message.content) {
            return handle_api_error(e);
        }

        let template = swap_template(&self.service.supported_chains().await);
        let details = match extract_details::<SwapDetails>(runtime, message, state, &template).await {
            Ok(Extraction::Valid(details)) => details,
            Ok(Extraction::Invalid(object, reason)) => {
                warn!(object = %object, reason = %reason, "invalid swap details");
                reply(callback, "Invalid swap details. Please check the inputs.");
                return ActionResult::failure("invalid swap details");
            }
            Err(e) => return handle_api_error(e),
        };
        info!(?details, "OKTO Swap Details");

        let request = SwapRequest::from(details);
        let summary = format!(
            "{} of {} for at least {} of {} on {}",
            request.amount_in, request.token_in, request.min_amount_out, request.token_out, request.chain
        );

        match self.service.token_swap(request).await {
            Ok(order_id) => {
                let text = format!(
                    "✅ Okto Swap intent submitted.\nSubmitted swap of {}\nOrder ID: {}\n",
                    summary, order_id
                );
                info!("{}", text);
                reply(callback, text);
                ActionResult::success("okto swap successful")
            }
            Err(e) => {
                error!("Okto Swap failed: {}", e);
                reply(callback, "❌ Okto Swap failed.");
                ActionResult::failure("okto swap failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn details(token_in: &str, amount_in: Value) -> serde_json::Result<SwapDetails> {
        serde_json::from_value(json!({
            "fromAddress": "0x1111111111111111111111111111111111111111",
            "router": "0x2222222222222222222222222222222222222222",
            "tokenIn": token_in,
            "tokenOut": "0x4444444444444444444444444444444444444444",
            "amountIn": amount_in,
            "minAmountOut": 990000,
            "network": "eip155:137"
        }))
    }

    #[test]
    fn test_empty_token_in_is_native() {
        let request = SwapRequest::from(details("", json!(1000000)).unwrap());
        assert!(request.is_native);
        assert_eq!(request.token_in, NATIVE_TOKEN_PLACEHOLDER);
        assert_eq!(request.amount_in, 1_000_000);
        assert_eq!(request.chain, "eip155:137");
    }

    #[test]
    fn test_placeholder_token_in_is_native() {
        let request = SwapRequest::from(
            details("0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee", json!(1)).unwrap(),
        );
        assert!(request.is_native);
    }

    #[test]
    fn test_erc20_token_in() {
        let request = SwapRequest::from(
            details("0x3333333333333333333333333333333333333333", json!("250")).unwrap(),
        );
        assert!(!request.is_native);
        assert_eq!(request.token_in, "0x3333333333333333333333333333333333333333");
        assert_eq!(request.amount_in, 250);
    }

    #[test]
    fn test_amount_accepts_integral_float() {
        assert_eq!(details("", json!(1000000.0)).unwrap().amount_in, 1_000_000);
    }

    #[test]
    fn test_amount_rejects_fraction_and_negative() {
        assert!(details("", json!(1.5)).is_err());
        assert!(details("", json!(-1)).is_err());
        assert!(details("", json!(null)).is_err());
    }
}
