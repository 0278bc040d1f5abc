//! 内置的链与代币列表
//!
//! 在首次成功拉取服务端列表之前用于填充提示词模板

use super::explorer::{Network, Token};

/// 原生代币在路由合约中的占位地址
pub const NATIVE_TOKEN_PLACEHOLDER: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

/// 默认支持的链
pub fn default_chains() -> Vec<Network> {
    vec![
        Network::new("eip155:137", "POLYGON"),
        Network::new("eip155:80002", "POLYGON_TESTNET_AMOY"),
        Network::new("eip155:8453", "BASE"),
        Network::new("eip155:42161", "ARBITRUM"),
    ]
}

/// 默认支持的代币
pub fn default_tokens() -> Vec<Token> {
    vec![
        token("POL", "Polygon Ecosystem Token", "eip155:137", "POLYGON", "", true),
        token(
            "USDC",
            "USD Coin",
            "eip155:137",
            "POLYGON",
            "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359",
            false,
        ),
        token("POL", "Polygon Ecosystem Token", "eip155:80002", "POLYGON_TESTNET_AMOY", "", true),
        token("ETH", "Ether", "eip155:8453", "BASE", "", true),
        token(
            "USDC",
            "USD Coin",
            "eip155:8453",
            "BASE",
            "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
            false,
        ),
        token("ETH", "Ether", "eip155:42161", "ARBITRUM", "", true),
    ]
}

fn token(
    symbol: &str,
    name: &str,
    caip_id: &str,
    network_name: &str,
    address: &str,
    is_primary: bool,
) -> Token {
    Token {
        address: address.to_string(),
        caip_id: caip_id.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        short_name: symbol.to_string(),
        id: format!("{}:{}", caip_id, symbol.to_lowercase()),
        group_id: symbol.to_lowercase(),
        is_primary,
        network_name: network_name.to_string(),
        ..Default::default()
    }
}

/// 判断地址是否表示原生代币
pub fn is_native_token(address: &str) -> bool {
    let address = address.trim();
    address.is_empty() || address.eq_ignore_ascii_case(NATIVE_TOKEN_PLACEHOLDER)
}
