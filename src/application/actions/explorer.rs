//! 只读查询动作
//!
//! 七个查询共用同一个动作实现，只在调用的服务方法和摘要格式上不同

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use super::{handle_api_error, reply, validate_query};
use crate::application::service::OktoService;
use crate::core::action::{Action, ActionExample, ActionResult};
use crate::core::runtime::{AgentRuntime, HandlerCallback, Memory, State};
use crate::domain::{Network, NftCollection, Order, Token, UserNftBalance, UserPortfolioData, Wallet};
use crate::errors::Result;

/// 查询种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplorerQuery {
    Portfolio,
    Account,
    Chains,
    NftCollections,
    OrdersHistory,
    PortfolioNft,
    Tokens,
}

impl ExplorerQuery {
    pub const ALL: [ExplorerQuery; 7] = [
        ExplorerQuery::Portfolio,
        ExplorerQuery::Account,
        ExplorerQuery::Chains,
        ExplorerQuery::NftCollections,
        ExplorerQuery::OrdersHistory,
        ExplorerQuery::PortfolioNft,
        ExplorerQuery::Tokens,
    ];

    pub fn action_name(self) -> &'static str {
        match self {
            ExplorerQuery::Portfolio => "OKTO_GET_PORTFOLIO",
            ExplorerQuery::Account => "OKTO_GET_ACCOUNT",
            ExplorerQuery::Chains => "OKTO_GET_CHAINS",
            ExplorerQuery::NftCollections => "OKTO_GET_NFT_COLLECTIONS",
            ExplorerQuery::OrdersHistory => "OKTO_GET_ORDERS_HISTORY",
            ExplorerQuery::PortfolioNft => "OKTO_GET_PORTFOLIO_NFT",
            ExplorerQuery::Tokens => "OKTO_GET_TOKENS",
        }
    }

    /// 用户可见的名称
    pub fn label(self) -> &'static str {
        match self {
            ExplorerQuery::Portfolio => "Portfolio",
            ExplorerQuery::Account => "Account",
            ExplorerQuery::Chains => "Chains",
            ExplorerQuery::NftCollections => "NFT Collections",
            ExplorerQuery::OrdersHistory => "Orders History",
            ExplorerQuery::PortfolioNft => "Portfolio NFT",
            ExplorerQuery::Tokens => "Tokens",
        }
    }

    fn description(self) -> &'static str {
        match self {
            ExplorerQuery::Portfolio => "Get the aggregated token portfolio of the okto wallet",
            ExplorerQuery::Account => "Get the okto wallet addresses on every supported chain",
            ExplorerQuery::Chains => "Get the chains supported by okto",
            ExplorerQuery::NftCollections => "Get the NFT collections supported by okto",
            ExplorerQuery::OrdersHistory => "Get the order history of the okto wallet",
            ExplorerQuery::PortfolioNft => "Get the NFTs held by the okto wallet",
            ExplorerQuery::Tokens => "Get the tokens supported by okto",
        }
    }

    fn similes(self) -> &'static [&'static str] {
        match self {
            ExplorerQuery::Portfolio => &["PORTFOLIO", "GET_PORTFOLIO", "BALANCE"],
            ExplorerQuery::Account => &["ACCOUNT", "GET_ACCOUNT", "WALLETS"],
            ExplorerQuery::Chains => &["CHAINS", "GET_CHAINS", "NETWORKS"],
            ExplorerQuery::NftCollections => &["NFT_COLLECTIONS", "GET_NFT_COLLECTIONS"],
            ExplorerQuery::OrdersHistory => &["ORDERS", "ORDER_HISTORY", "GET_ORDERS"],
            ExplorerQuery::PortfolioNft => &["PORTFOLIO_NFT", "MY_NFTS"],
            ExplorerQuery::Tokens => &["TOKENS", "GET_TOKENS", "SUPPORTED_TOKENS"],
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            ExplorerQuery::Portfolio => &["portfolio", "balance", "balances", "holdings", "net worth"],
            ExplorerQuery::Account => &["account", "accounts", "wallet address", "wallet addresses", "my wallets"],
            ExplorerQuery::Chains => &["chains", "networks", "supported chains", "supported networks"],
            ExplorerQuery::NftCollections => &["collections", "nft collections", "supported nft collections"],
            ExplorerQuery::OrdersHistory => &["orders", "order history", "order status", "transaction history"],
            ExplorerQuery::PortfolioNft => &["nfts", "my nfts", "my nft", "nft portfolio", "nft holdings", "nfts i own"],
            ExplorerQuery::Tokens => &["supported tokens", "token list", "list tokens", "list of tokens", "which tokens"],
        }
    }

    fn example(self) -> &'static str {
        match self {
            ExplorerQuery::Portfolio => "what is my okto portfolio balance?",
            ExplorerQuery::Account => "show my okto account wallet address",
            ExplorerQuery::Chains => "which chains does okto support?",
            ExplorerQuery::NftCollections => "list the nft collections on okto",
            ExplorerQuery::OrdersHistory => "show my okto order history",
            ExplorerQuery::PortfolioNft => "show my nfts on okto",
            ExplorerQuery::Tokens => "show the supported tokens on okto",
        }
    }

    /// 调用对应查询并生成摘要
    pub async fn run(self, service: &OktoService) -> Result<String> {
        let summary = match self {
            ExplorerQuery::Portfolio => format_portfolio(&service.get_portfolio().await?),
            ExplorerQuery::Account => format_wallets(&service.get_account().await?),
            ExplorerQuery::Chains => format_chains(&service.get_chains().await?),
            ExplorerQuery::NftCollections => format_nft_collections(&service.get_nft_collections().await?),
            ExplorerQuery::OrdersHistory => format_orders(&service.get_orders_history().await?),
            ExplorerQuery::PortfolioNft => format_nft_balances(&service.get_portfolio_nft().await?),
            ExplorerQuery::Tokens => format_tokens(&service.get_tokens().await?),
        };
        Ok(format!("Okto {}:\n{}", self.label(), summary))
    }
}

fn bullet_list<T>(items: &[T], line: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return "  (none)".to_string();
    }
    items
        .iter()
        .map(|item| format!("  - {}", line(item)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_portfolio(portfolio: &UserPortfolioData) -> String {
    let totals = &portfolio.aggregated_data;
    let mut out = format!(
        "  Total: {} USDT across {} holdings\n",
        or_zero(&totals.total_holding_price_usdt),
        or_zero(&totals.holdings_count)
    );
    out.push_str(&bullet_list(&portfolio.group_tokens, |group| {
        format!("{}: {} ({} USDT)", group.symbol, group.balance, or_zero(&group.holdings_price_usdt))
    }));
    for group in &portfolio.group_tokens {
        for token in group.tokens.iter().filter(|t| !t.network_name.is_empty()) {
            let _ = write!(out, "\n      {} on {}: {}", token.symbol, token.network_name, token.balance);
        }
    }
    out
}

pub fn format_wallets(wallets: &[Wallet]) -> String {
    bullet_list(wallets, |w| format!("{} ({}): {}", w.network_name, w.caip_id, w.address))
}

pub fn format_chains(chains: &[Network]) -> String {
    bullet_list(chains, |c| format!("{}: {}", c.network_name, c.caip_id))
}

pub fn format_nft_collections(collections: &[NftCollection]) -> String {
    bullet_list(collections, |c| {
        format!("{} ({}) on {}", c.collection_name, c.collection_address, c.network_name)
    })
}

pub fn format_orders(orders: &[Order]) -> String {
    bullet_list(orders, |o| {
        let mut line = format!("{} {} [{}] on {}", o.intent_id, o.intent_type, o.status, o.network_name);
        if let Some(hash) = o.transaction_hash.first() {
            let _ = write!(line, " tx {}", hash);
        }
        line
    })
}

pub fn format_nft_balances(nfts: &[UserNftBalance]) -> String {
    bullet_list(nfts, |n| {
        format!(
            "{} #{} x{} from {} on {}",
            n.nft_name,
            n.nft_id,
            or_zero(&n.quantity),
            n.collection_name,
            n.network_name
        )
    })
}

pub fn format_tokens(tokens: &[Token]) -> String {
    bullet_list(tokens, |t| {
        let address = if t.address.is_empty() { "native" } else { t.address.as_str() };
        format!("{} on {}: {}", t.symbol, t.network_name, address)
    })
}

fn or_zero(value: &str) -> &str {
    if value.is_empty() {
        "0"
    } else {
        value
    }
}

/// 只读查询动作
pub struct ExplorerAction {
    service: Arc<OktoService>,
    query: ExplorerQuery,
}

impl ExplorerAction {
    pub fn new(service: Arc<OktoService>, query: ExplorerQuery) -> Self {
        Self { service, query }
    }

    /// 为每种查询各创建一个动作
    pub fn all(service: &Arc<OktoService>) -> Vec<ExplorerAction> {
        ExplorerQuery::ALL
            .iter()
            .map(|query| ExplorerAction::new(Arc::clone(service), *query))
            .collect()
    }

    pub fn query(&self) -> ExplorerQuery {
        self.query
    }
}

#[async_trait]
impl Action for ExplorerAction {
    fn name(&self) -> &str {
        self.query.action_name()
    }

    fn description(&self) -> &str {
        self.query.description()
    }

    fn similes(&self) -> &[&'static str] {
        self.query.similes()
    }

    fn keywords(&self) -> &[&'static str] {
        self.query.keywords()
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        vec![vec![ActionExample::user(self.query.example())]]
    }

    fn suppress_initial_message(&self) -> bool {
        true
    }

    async fn validate(&self, _runtime: &dyn AgentRuntime, message: &Memory, _state: Option<&State>) -> bool {
        validate_query(&message.content).is_ok()
    }

    async fn handle(
        &self,
        _runtime: &dyn AgentRuntime,
        message: &Memory,
        _state: Option<State>,
        callback: Option<&HandlerCallback>,
    ) -> ActionResult {
        if let Err(e) = validate_query(&message.content) {
            return handle_api_error(e);
        }

        match self.query.run(&self.service).await {
            Ok(text) => {
                info!(action = self.query.action_name(), "okto query succeeded");
                reply(callback, text.clone());
                ActionResult::success(text)
            }
            Err(e) => {
                error!("Okto {} failed: {}", self.query.label(), e);
                let text = format!("❌ Okto {} failed.", self.query.label());
                reply(callback, text.clone());
                ActionResult::failure(text)
            }
        }
    }
}
