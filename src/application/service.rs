//! Okto 服务
//!
//! 包装钱包客户端：登录、缓存支持的链与代币、逐一转发查询和交易请求

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::core::wallet::WalletClient;
use crate::domain::{
    default_chains, default_tokens, AuthProvider, EvmRawTransaction, Intent, Network,
    NftCollection, NftTransferIntent, Order, RawTransactionIntent, SwapRequest, Token,
    TokenTransferIntent, UserNftBalance, UserPortfolioData, UserSession, Wallet,
};
use crate::errors::Result;
use crate::infrastructure::auth::IdTokenSource;
use crate::infrastructure::evm::{
    encode_swap_exact_eth_for_tokens, encode_swap_exact_tokens_for_tokens, hex_encode,
    parse_address,
};
use crate::infrastructure::logger::Timer;

/// 兑换截止时间相对当前的秒数
const SWAP_DEADLINE_SECS: i64 = 300;

pub struct OktoService {
    client: Arc<dyn WalletClient>,
    id_tokens: Arc<dyn IdTokenSource>,
    supported_chains: RwLock<Vec<Network>>,
    supported_tokens: RwLock<Vec<Token>>,
}

impl OktoService {
    pub fn new(client: Arc<dyn WalletClient>, id_tokens: Arc<dyn IdTokenSource>) -> Self {
        Self {
            client,
            id_tokens,
            supported_chains: RwLock::new(default_chains()),
            supported_tokens: RwLock::new(default_tokens()),
        }
    }

    /// 在后台登录并刷新链/代币缓存，立即返回
    pub fn initialize(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = service.authenticate().await {
                error!("Okto authentication error: {}", e);
            }
        })
    }

    /// 登录，成功后并发拉取链和代币列表替换缓存
    pub async fn authenticate(&self) -> Result<UserSession> {
        let id_token = self.id_tokens.id_token().await?;
        let session = self
            .client
            .login_using_oauth(&id_token, AuthProvider::Google)
            .await?;
        info!(
            user_address = %session.user_address,
            "Okto authentication success"
        );

        let (chains, tokens) = tokio::try_join!(self.get_chains(), self.get_tokens())?;
        info!(chains = chains.len(), tokens = tokens.len(), "refreshed supported chains and tokens");
        *self.supported_chains.write().await = chains;
        *self.supported_tokens.write().await = tokens;

        Ok(session)
    }

    /// 当前缓存的链
    pub async fn supported_chains(&self) -> Vec<Network> {
        self.supported_chains.read().await.clone()
    }

    /// 当前缓存的代币
    pub async fn supported_tokens(&self) -> Vec<Token> {
        self.supported_tokens.read().await.clone()
    }

    pub async fn get_portfolio(&self) -> Result<UserPortfolioData> {
        let _timer = Timer::new("okto.get_portfolio");
        self.client.get_portfolio().await
    }

    pub async fn get_account(&self) -> Result<Vec<Wallet>> {
        let _timer = Timer::new("okto.get_account");
        self.client.get_account().await
    }

    pub async fn get_chains(&self) -> Result<Vec<Network>> {
        let _timer = Timer::new("okto.get_chains");
        self.client.get_chains().await
    }

    pub async fn get_nft_collections(&self) -> Result<Vec<NftCollection>> {
        let _timer = Timer::new("okto.get_nft_collections");
        self.client.get_nft_collections().await
    }

    pub async fn get_orders_history(&self) -> Result<Vec<Order>> {
        let _timer = Timer::new("okto.get_orders_history");
        self.client.get_orders_history().await
    }

    pub async fn get_portfolio_nft(&self) -> Result<Vec<UserNftBalance>> {
        let _timer = Timer::new("okto.get_portfolio_nft");
        self.client.get_portfolio_nft().await
    }

    pub async fn get_tokens(&self) -> Result<Vec<Token>> {
        let _timer = Timer::new("okto.get_tokens");
        self.client.get_tokens().await
    }

    /// 构建、签名并提交 user operation，返回订单 ID
    async fn submit(&self, intent: Intent) -> Result<String> {
        let _timer = Timer::new(format!("okto.{}", intent.kind()));
        let user_op = self.client.build_user_op(&intent).await?;
        let signed = self.client.sign_user_op(user_op).await?;
        self.client.execute_user_op(signed).await
    }

    pub async fn token_transfer(&self, params: TokenTransferIntent) -> Result<String> {
        self.submit(Intent::TokenTransfer(params)).await
    }

    pub async fn nft_transfer(&self, params: NftTransferIntent) -> Result<String> {
        self.submit(Intent::NftTransfer(params)).await
    }

    pub async fn evm_raw_transaction(&self, params: RawTransactionIntent) -> Result<String> {
        self.submit(Intent::RawTransaction(params)).await
    }

    /// 通过路由合约兑换代币
    ///
    /// 非原生代币调用 `swapExactTokensForTokens`，原生代币调用
    /// `swapExactETHForTokens` 并以 `amount_in` 作为交易金额
    pub async fn token_swap(&self, params: SwapRequest) -> Result<String> {
        let deadline = (chrono::Utc::now().timestamp() + SWAP_DEADLINE_SECS) as u64;
        let intent = build_swap_transaction(&params, deadline)?;
        info!(
            chain = %intent.caip2_id,
            router = %intent.transaction.to,
            native = params.is_native,
            "executing swap transaction"
        );
        self.evm_raw_transaction(intent).await
    }
}

/// 组装兑换对应的原始交易
pub fn build_swap_transaction(params: &SwapRequest, deadline: u64) -> Result<RawTransactionIntent> {
    let path = [parse_address(&params.token_in)?, parse_address(&params.token_out)?];
    let recipient = parse_address(&params.from)?;
    parse_address(&params.router)?;

    let (data, value) = if params.is_native {
        let data = encode_swap_exact_eth_for_tokens(params.min_amount_out, &path, &recipient, deadline);
        (data, params.amount_in)
    } else {
        let data = encode_swap_exact_tokens_for_tokens(
            params.amount_in,
            params.min_amount_out,
            &path,
            &recipient,
            deadline,
        );
        (data, 0)
    };

    Ok(RawTransactionIntent {
        caip2_id: params.chain.clone(),
        transaction: EvmRawTransaction {
            from: params.from.clone(),
            to: params.router.clone(),
            data: Some(hex_encode(&data)),
            value: Some(value),
        },
    })
}
