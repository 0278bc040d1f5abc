//! 提示词模板
//!
//! 模板中列出当前已知的链和代币，并以 `{{recentMessages}}` 结尾，
//! 由 `compose_context` 填入最近的对话

use tracing::debug;

use crate::domain::{Network, Token};

fn render_chains(chains: &[Network]) -> String {
    chains
        .iter()
        .map(|c| format!("readonly NetworkName: {}, CaipId: {}", c.network_name, c.caip_id))
        .collect::<Vec<_>>()
        .join("\n\t")
}

fn render_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| {
            format!(
                "readonly TokenSymbol: {}, CaipId: {}, Address: {}",
                t.symbol, t.caip_id, t.address
            )
        })
        .collect::<Vec<_>>()
        .join("\n\t")
}

/// 代币转账提取模板
pub fn transfer_template(chains: &[Network], tokens: &[Token]) -> String {
    let template = format!(
        r#"
Extract the following details from the most recent message for processing token transfer using the Okto SDK:
- **receivingAddress** (string): The address to transfer the tokens to.
- **transferAmount** (number): The amount to transfer to the address. This can be a decimal number as well.
- **tokenAddress** (string): The token address to transfer. Note it can be empty string
    static tokens: {{
       {tokens}
    }};
- **caipId** (string): The caipId for blockchain network to use. Allowed values are:
    static networks: {{
       {chains}
    }};

Only Provide the details in the following JSON format, focusing exclusively on the most recent message:

{{
    "receivingAddress": "<receiving_address>",
    "transferAmount": <amount>,
    "tokenAddress": "<asset_id>",
    "caipId": "<network>"
}}

Here are the recent user messages for context (focus on the last message):
{{{{recentMessages}}}}
"#,
        tokens = render_tokens(tokens),
        chains = render_chains(chains),
    );
    debug!(template = %template, "transfer template");
    template
}

/// NFT 转账提取模板
pub fn nft_transfer_template(chains: &[Network]) -> String {
    let template = format!(
        r#"
Extract the following details from the most recent message for processing NFT transfer using the Okto SDK:
- **recipientWalletAddress** (string): The wallet address to which the NFT should be transferred.
- **nftId** (string): The unique identifier of the NFT.
- **collectionAddress** (string): The contract address of the NFT collection.
- **amount** (number): The quantity of NFTs to transfer (usually 1 for ERC721, but may vary for ERC1155).
- **nftType** (string): Either 'ERC721' or 'ERC1155'.
- **caip2Id** (string): The caipId for blockchain network to use. Allowed values are:
    static networks: {{
       {chains}
    }};

Only provide the details in the following JSON format, focusing exclusively on the most recent message:

{{
    "recipientWalletAddress": "<recipient_wallet_address>",
    "nftId": "<nft_id>",
    "collectionAddress": "<collection_address>",
    "amount": <amount>,
    "nftType": "<ERC721 or ERC1155>",
    "caip2Id": "<caip2_id>"
}}

Here are the recent user messages for context (focus on the last message):
{{{{recentMessages}}}}
"#,
        chains = render_chains(chains),
    );
    debug!(template = %template, "nft transfer template");
    template
}

/// 代币兑换提取模板
pub fn swap_template(chains: &[Network]) -> String {
    format!(
        r#"
Extract the following details from the most recent message for processing token swap using the Okto SDK:
- **fromAddress** (string): The wallet address initiating the swap.
- **router** (string): The DEX contract address for executing the swap.
- **tokenIn** (string): The token address you want to swap from. Use an empty string for the native token.
- **tokenOut** (string): The token address you want to swap to.
- **amountIn** (number): The amount of tokenIn to swap (in smallest unit).
- **minAmountOut** (number): The minimum amount of tokenOut expected (in smallest unit).
- **network** (string): The blockchain network for the transaction. Allowed values are:
    static networks: {{
       {chains}
    }};

Only Provide the details in the following JSON format, focusing exclusively on the most recent message:

{{
  "fromAddress": "<from_address>",
  "router": "<router_address>",
  "tokenIn": "<token_in_address>",
  "tokenOut": "<token_out_address>",
  "amountIn": <amount_in>,
  "minAmountOut": <min_amount_out>,
  "network": "<network>"
}}

Here are the recent user messages for context (focus on the last message):
{{{{recentMessages}}}}
"#,
        chains = render_chains(chains),
    )
}
