//! OKTO_TRANSFER：代币转账

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info, warn};

use super::{extract_details, handle_api_error, reply, validate_query, Extraction};
use crate::application::service::OktoService;
use crate::application::templates::transfer_template;
use crate::core::action::{Action, ActionExample, ActionResult};
use crate::core::runtime::{AgentRuntime, HandlerCallback, Memory, State};
use crate::domain::TokenTransferIntent;

/// 模型提取的转账参数
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDetails {
    pub caip_id: String,
    pub receiving_address: String,
    pub transfer_amount: f64,
    pub token_address: String,
}

impl From<TransferDetails> for TokenTransferIntent {
    fn from(details: TransferDetails) -> Self {
        TokenTransferIntent {
            amount: details.transfer_amount,
            recipient: details.receiving_address,
            token: details.token_address,
            caip2_id: details.caip_id,
        }
    }
}

pub struct TransferTokensAction {
    service: Arc<OktoService>,
}

impl TransferTokensAction {
    pub fn new(service: Arc<OktoService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Action for TransferTokensAction {
    fn name(&self) -> &str {
        "OKTO_TRANSFER"
    }

    fn description(&self) -> &str {
        "Perform Token transfers using okto"
    }

    fn similes(&self) -> &[&'static str] {
        &["TRANSFER", "TOKEN_TRANSFER", "OKTO_TRANSFER", "OKTO_SEND", "SEND_TOKEN"]
    }

    fn keywords(&self) -> &[&'static str] {
        &["transfer", "send", "pay"]
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        vec![
            vec![ActionExample::user("transfer 1 SOL to winner.sol on solana")],
            vec![ActionExample::user("send 1 eth token to 0x1234567890 on polygon")],
            vec![ActionExample::user(
                "transfer 0.01 POL to 0xF638D541943213D42751F6BFa323ebe6e0fbEaA1 on Polygon amoy testnet",
            )],
        ]
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

        let template = transfer_template(
            &self.service.supported_chains().await,
            &self.service.supported_tokens().await,
        );
        let details = match extract_details::<TransferDetails>(runtime, message, state, &template).await {
            Ok(Extraction::Valid(details)) => details,
            Ok(Extraction::Invalid(object, reason)) => {
                warn!(object = %object, reason = %reason, "invalid transfer details");
                reply(callback, "Invalid transfer details. Please check the inputs.");
                return ActionResult::failure("invalid transfer details");
            }
            Err(e) => return handle_api_error(e),
        };
        info!(?details, "OKTO Token Transfer Details");

        let intent = TokenTransferIntent::from(details);
        let token_label = intent.token.clone();
        let (amount, recipient, chain) = (intent.amount, intent.recipient.clone(), intent.caip2_id.clone());

        match self.service.token_transfer(intent).await {
            Ok(order_id) => {
                let text = format!(
                    "✅ Okto Transfer intented submitted.\nSubmitted transfer of {} {} to {} on {}\nOrder ID: {}\n",
                    amount, token_label, recipient, chain, order_id
                );
                info!("{}", text);
                reply(callback, text);
                ActionResult::success("okto transfer successful")
            }
            Err(e) => {
                error!("Okto Transfer failed: {}", e);
                reply(callback, "❌ Okto Transfer failed.");
                ActionResult::failure("okto transfer failed")
            }
        }
    }
}
