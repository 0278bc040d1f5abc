//! 只读钱包数据
//!
//! 钱包服务查询接口返回的数据结构，字段名与服务端 JSON 保持一致

use serde::{Deserialize, Serialize};

/// 支持的区块链网络
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Network {
    pub caip_id: String,
    pub network_name: String,
    pub chain_id: String,
    pub logo: String,
    #[serde(rename = "type")]
    pub network_type: String,
    pub sponsorship_enabled: bool,
}

impl Network {
    pub fn new(caip_id: impl Into<String>, network_name: impl Into<String>) -> Self {
        let caip_id = caip_id.into();
        let chain_id = caip_id.rsplit(':').next().unwrap_or_default().to_string();
        Self {
            caip_id,
            network_name: network_name.into(),
            chain_id,
            network_type: "EVM".to_string(),
            ..Default::default()
        }
    }
}

/// 支持的代币
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Token {
    pub address: String,
    pub caip_id: String,
    pub symbol: String,
    pub image: String,
    pub name: String,
    pub short_name: String,
    pub id: String,
    pub group_id: String,
    pub is_primary: bool,
    pub network_name: String,
    pub is_onramp_enabled: bool,
}

/// 用户在某条链上的钱包
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Wallet {
    pub caip_id: String,
    pub network_name: String,
    pub address: String,
    pub network_symbol: String,
}

/// 已提交的订单
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    pub intent_id: String,
    pub intent_type: String,
    pub status: String,
    pub network_name: String,
    pub caip_id: String,
    pub transaction_hash: Vec<String>,
    pub created_at: Option<String>,
}

/// 单个代币持仓
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenHolding {
    pub symbol: String,
    pub network_name: String,
    pub token_address: String,
    pub balance: String,
    pub holdings_price_usdt: String,
    pub holdings_price_inr: String,
}

/// 同一资产在多条链上的持仓分组
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenGroup {
    pub symbol: String,
    pub name: String,
    pub balance: String,
    pub holdings_price_usdt: String,
    pub tokens: Vec<TokenHolding>,
}

/// 聚合后的资产组合
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPortfolioData {
    pub aggregated_data: AggregatedData,
    pub group_tokens: Vec<TokenGroup>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregatedData {
    pub holdings_count: String,
    pub holdings_price_inr: String,
    pub holdings_price_usdt: String,
    pub total_holding_price_inr: String,
    pub total_holding_price_usdt: String,
}

/// 用户持有的 NFT
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserNftBalance {
    pub caip_id: String,
    pub network_name: String,
    pub entity_type: String,
    pub collection_address: String,
    pub collection_name: String,
    pub nft_id: String,
    pub image: String,
    pub quantity: String,
    pub token_uri: String,
    pub description: String,
    pub nft_name: String,
}

/// NFT 合集
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NftCollection {
    pub caip_id: String,
    pub network_name: String,
    pub collection_address: String,
    pub collection_name: String,
    pub entity_type: String,
    pub image: String,
}

/// OAuth 提供方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Google,
}

/// 登录成功后的会话
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSession {
    pub user_address: String,
    pub nonce: String,
    pub vendor_address: String,
    pub session_expiry: i64,
    pub auth_token: String,
}
