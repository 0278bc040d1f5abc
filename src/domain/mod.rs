//! 领域模型
//!
//! 意图对象与钱包服务的只读描述结构

pub mod defaults;
pub mod explorer;
pub mod intent;

pub use defaults::{default_chains, default_tokens, is_native_token, NATIVE_TOKEN_PLACEHOLDER};
pub use explorer::{
    AggregatedData, AuthProvider, Network, NftCollection, Order, Token, TokenGroup, TokenHolding,
    UserNftBalance, UserPortfolioData, UserSession, Wallet,
};
pub use intent::{
    EvmRawTransaction, Intent, NftTransferIntent, NftType, RawTransactionIntent, SwapRequest,
    TokenTransferIntent,
};
