//! OKTO_NFT_TRANSFER：NFT 转账

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info, warn};

use super::{extract_details, handle_api_error, reply, validate_query, Extraction};
use crate::application::service::OktoService;
use crate::application::templates::nft_transfer_template;
use crate::core::action::{Action, ActionExample, ActionResult};
use crate::core::runtime::{AgentRuntime, HandlerCallback, Memory, State};
use crate::domain::{NftTransferIntent, NftType};

/// 模型提取的 NFT 转账参数
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftTransferDetails {
    pub recipient_wallet_address: String,
    pub nft_id: String,
    pub collection_address: String,
    #[serde(deserialize_with = "super::whole_number")]
    pub amount: u64,
    pub nft_type: NftType,
    #[serde(alias = "caipId")]
    pub caip2_id: String,
}

impl From<NftTransferDetails> for NftTransferIntent {
    fn from(details: NftTransferDetails) -> Self {
        NftTransferIntent {
            caip2_id: details.caip2_id,
            collection_address: details.collection_address,
            nft_id: details.nft_id,
            recipient_wallet_address: details.recipient_wallet_address,
            amount: details.amount,
            nft_type: details.nft_type,
        }
    }
}

pub struct NftTransferAction {
    service: Arc<OktoService>,
}

impl NftTransferAction {
    pub fn new(service: Arc<OktoService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Action for NftTransferAction {
    fn name(&self) -> &str {
        "OKTO_NFT_TRANSFER"
    }

    fn description(&self) -> &str {
        "Transfer NFTs using okto"
    }

    fn similes(&self) -> &[&'static str] {
        &["NFT_TRANSFER", "SEND_NFT", "OKTO_SEND_NFT"]
    }

    fn keywords(&self) -> &[&'static str] {
        &["nft", "erc721", "erc1155", "collection", "transfer", "send"]
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        vec![
            vec![ActionExample::user(
                "transfer NFT 1 from collection 0xabc to 0xF638D541943213D42751F6BFa323ebe6e0fbEaA1 on polygon",
            )],
            vec![ActionExample::user(
                "send 2 ERC1155 tokens with id 7 of collection 0xdef to 0x1234567890 on base",
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

        let template = nft_transfer_template(&self.service.supported_chains().await);
        let details = match extract_details::<NftTransferDetails>(runtime, message, state, &template).await {
            Ok(Extraction::Valid(details)) => details,
            Ok(Extraction::Invalid(object, reason)) => {
                warn!(object = %object, reason = %reason, "invalid nft transfer details");
                reply(callback, "Invalid NFT transfer details. Please check the inputs.");
                return ActionResult::failure("invalid nft transfer details");
            }
            Err(e) => return handle_api_error(e),
        };
        info!(?details, "OKTO NFT Transfer Details");

        let intent = NftTransferIntent::from(details);
        let summary = format!(
            "{} x {} #{} ({}) to {} on {}",
            intent.amount,
            intent.collection_address,
            intent.nft_id,
            intent.nft_type,
            intent.recipient_wallet_address,
            intent.caip2_id
        );

        match self.service.nft_transfer(intent).await {
            Ok(order_id) => {
                let text = format!(
                    "✅ Okto NFT Transfer intent submitted.\nSubmitted NFT transfer of {}\nOrder ID: {}\n",
                    summary, order_id
                );
                info!("{}", text);
                reply(callback, text);
                ActionResult::success("okto nft transfer successful")
            }
            Err(e) => {
                error!("Okto NFT Transfer failed: {}", e);
                reply(callback, "❌ Okto NFT Transfer failed.");
                ActionResult::failure("okto nft transfer failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_caip_id_alias() {
        let details: NftTransferDetails = serde_json::from_value(json!({
            "recipientWalletAddress": "0xF638D541943213D42751F6BFa323ebe6e0fbEaA1",
            "nftId": "1",
            "collectionAddress": "0xabc",
            "amount": 1,
            "nftType": "ERC721",
            "caipId": "eip155:137"
        }))
        .unwrap();
        assert_eq!(details.caip2_id, "eip155:137");

        let intent = NftTransferIntent::from(details);
        assert_eq!(intent.nft_type, NftType::Erc721);
        assert_eq!(intent.amount, 1);
    }

    #[test]
    fn test_accepts_integral_float_amount() {
        let details: NftTransferDetails = serde_json::from_value(json!({
            "recipientWalletAddress": "0xF638D541943213D42751F6BFa323ebe6e0fbEaA1",
            "nftId": "7",
            "collectionAddress": "0xabc",
            "amount": 1.0,
            "nftType": "ERC1155",
            "caip2Id": "eip155:8453"
        }))
        .unwrap();
        assert_eq!(details.amount, 1);

        let fractional = serde_json::from_value::<NftTransferDetails>(json!({
            "recipientWalletAddress": "0xabc",
            "nftId": "7",
            "collectionAddress": "0xabc",
            "amount": 1.5,
            "nftType": "ERC1155",
            "caip2Id": "eip155:8453"
        }));
        assert!(fractional.is_err());
    }

    #[test]
    fn test_rejects_unknown_nft_type() {
        let result = serde_json::from_value::<NftTransferDetails>(json!({
            "recipientWalletAddress": "0xabc",
            "nftId": "1",
            "collectionAddress": "0xabc",
            "amount": 1,
            "nftType": "ERC20",
            "caip2Id": "eip155:137"
        }));
        assert!(result.is_err());
    }
}
