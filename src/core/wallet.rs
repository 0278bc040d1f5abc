//! 钱包服务接口
//!
//! 对外部钱包 SDK 的固定调用约定。认证、交易构建和广播都由实现方负责，
//! 插件只按顺序调用这些方法。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    AuthProvider, Intent, Network, NftCollection, Order, Token, UserNftBalance, UserPortfolioData,
    UserSession, Wallet,
};
use crate::errors::Result;

/// 钱包服务构建出的待签名 user operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOp {
    /// 需要签名的 32 字节哈希（0x 前缀十六进制）
    pub user_op_hash: String,
    /// 服务端返回的完整 user operation，原样回传
    pub payload: Value,
}

/// 已签名的 user operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUserOp {
    #[serde(flatten)]
    pub user_op: UserOp,
    pub signature: String,
}

/// 钱包 SDK 客户端
#[async_trait]
pub trait WalletClient: Send + Sync {
    /// 使用 OAuth id token 登录
    async fn login_using_oauth(&self, id_token: &str, provider: AuthProvider) -> Result<UserSession>;

    async fn get_portfolio(&self) -> Result<UserPortfolioData>;

    async fn get_account(&self) -> Result<Vec<Wallet>>;

    async fn get_chains(&self) -> Result<Vec<Network>>;

    async fn get_nft_collections(&self) -> Result<Vec<NftCollection>>;

    async fn get_orders_history(&self) -> Result<Vec<Order>>;

    async fn get_portfolio_nft(&self) -> Result<Vec<UserNftBalance>>;

    async fn get_tokens(&self) -> Result<Vec<Token>>;

    /// 根据意图构建 user operation
    async fn build_user_op(&self, intent: &Intent) -> Result<UserOp>;

    /// 签名 user operation
    async fn sign_user_op(&self, user_op: UserOp) -> Result<SignedUserOp>;

    /// 提交已签名的 user operation，返回订单 ID
    async fn execute_user_op(&self, signed: SignedUserOp) -> Result<String>;
}
