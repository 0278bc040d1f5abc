//! 意图领域实体
//!
//! 从对话中提取出的结构化参数，每个意图对应一次钱包调用

use serde::{Deserialize, Serialize};

/// 代币转账意图，`token` 为空表示链上原生代币
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransferIntent {
    pub amount: f64,
    pub recipient: String,
    pub token: String,
    pub caip2_id: String,
}

impl TokenTransferIntent {
    /// 是否为原生代币转账
    pub fn is_native(&self) -> bool {
        self.token.is_empty()
    }
}

/// NFT 标准
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NftType {
    #[serde(rename = "ERC721")]
    Erc721,
    #[serde(rename = "ERC1155")]
    Erc1155,
}

impl std::fmt::Display for NftType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NftType::Erc721 => write!(f, "ERC721"),
            NftType::Erc1155 => write!(f, "ERC1155"),
        }
    }
}

/// NFT 转账意图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftTransferIntent {
    pub caip2_id: String,
    pub collection_address: String,
    pub nft_id: String,
    pub recipient_wallet_address: String,
    pub amount: u64,
    pub nft_type: NftType,
}

/// 原样转发的 EVM 交易，`value` 以 wei 计，序列化为十六进制数量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvmRawTransaction {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "quantity")]
    pub value: Option<u128>,
}

/// 原始交易意图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransactionIntent {
    pub caip2_id: String,
    pub transaction: EvmRawTransaction,
}

/// 发送给钱包服务构建 user operation 的意图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    TokenTransfer(TokenTransferIntent),
    NftTransfer(NftTransferIntent),
    RawTransaction(RawTransactionIntent),
}

impl Intent {
    /// 意图种类名称，用于日志
    pub fn kind(&self) -> &'static str {
        match self {
            Intent::TokenTransfer(_) => "token_transfer",
            Intent::NftTransfer(_) => "nft_transfer",
            Intent::RawTransaction(_) => "raw_transaction",
        }
    }
}

/// 路由合约兑换请求，金额以代币最小单位表示
#[derive(Debug, Clone, PartialEq)]
pub struct SwapRequest {
    pub amount_in: u128,
    pub min_amount_out: u128,
    pub from: String,
    pub router: String,
    pub token_in: String,
    pub token_out: String,
    pub chain: String,
    pub is_native: bool,
}

mod quantity {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u128>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&format!("{:#x}", v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u128>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) => {
                let parsed = match s.strip_prefix("0x") {
                    Some(hex) => u128::from_str_radix(hex, 16),
                    None => s.parse::<u128>(),
                };
                parsed.map(Some).map_err(serde::de::Error::custom)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_transfer_wire_names() {
        let intent = TokenTransferIntent {
            amount: 0.01,
            recipient: "0xF638D541943213D42751F6BFa323ebe6e0fbEaA1".to_string(),
            token: String::new(),
            caip2_id: "eip155:80002".to_string(),
        };
        let value = serde_json::to_value(&intent).unwrap();
        assert_eq!(value["caip2Id"], "eip155:80002");
        assert_eq!(value["token"], "");
        assert!(intent.is_native());
    }

    #[test]
    fn test_nft_type_names() {
        assert_eq!(serde_json::to_value(NftType::Erc1155).unwrap(), json!("ERC1155"));
        let parsed: NftType = serde_json::from_value(json!("ERC721")).unwrap();
        assert_eq!(parsed, NftType::Erc721);
        assert!(serde_json::from_value::<NftType>(json!("ERC20")).is_err());
    }

    #[test]
    fn test_raw_transaction_value_is_hex_quantity() {
        let tx = EvmRawTransaction {
            from: "0x01".to_string(),
            to: "0x02".to_string(),
            data: None,
            value: Some(255),
        };
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["value"], "0xff");
        assert!(value.get("data").is_none());

        let back: EvmRawTransaction = serde_json::from_value(value).unwrap();
        assert_eq!(back.value, Some(255));
    }

    #[test]
    fn test_intent_is_tagged() {
        let intent = Intent::RawTransaction(RawTransactionIntent {
            caip2_id: "eip155:137".to_string(),
            transaction: EvmRawTransaction {
                from: "0x01".to_string(),
                to: "0x02".to_string(),
                data: Some("0x".to_string()),
                value: None,
            },
        });
        let value = serde_json::to_value(&intent).unwrap();
        assert_eq!(value["type"], "RAW_TRANSACTION");
        assert_eq!(value["details"]["caip2Id"], "eip155:137");
        assert_eq!(intent.kind(), "raw_transaction");
    }
}
