//! 测试通用工具
//!
//! 提供内存中的钱包客户端、运行时和令牌来源

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use serde_json::{json, Value};

use okto_plugin::core::wallet::{SignedUserOp, UserOp, WalletClient};
use okto_plugin::domain::{
    AuthProvider, Intent, Network, NftCollection, Order, Token, UserNftBalance, UserPortfolioData,
    UserSession, Wallet,
};
use okto_plugin::infrastructure::auth::IdTokenSource;
use okto_plugin::{AgentRuntime, Content, Memory, ModelClass, OktoService, PluginError, Result, State};

static INIT: Once = Once::new();

/// 初始化测试环境
pub fn setup() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

pub const ORDER_ID: &str = "order-7f3a";

/// 记录调用的钱包客户端
pub struct MockWallet {
    pub fail_login: bool,
    pub fail_execute: bool,
    pub fail_queries: bool,
    pub chains: Vec<Network>,
    pub tokens: Vec<Token>,
    pub logins: AtomicUsize,
    pub built: Mutex<Vec<Intent>>,
    pub executed: Mutex<Vec<SignedUserOp>>,
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            fail_login: false,
            fail_execute: false,
            fail_queries: false,
            chains: vec![Network::new("eip155:137", "POLYGON")],
            tokens: vec![Token {
                symbol: "POL".to_string(),
                caip_id: "eip155:137".to_string(),
                network_name: "POLYGON".to_string(),
                ..Default::default()
            }],
            logins: AtomicUsize::new(0),
            built: Mutex::new(Vec::new()),
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn built_intents(&self) -> Vec<Intent> {
        self.built.lock().unwrap().clone()
    }

    pub fn executed_count(&self) -> usize {
        self.executed.lock().unwrap().len()
    }

    fn query<T>(&self, value: T) -> Result<T> {
        if self.fail_queries {
            return Err(PluginError::api("500", "gateway unavailable"));
        }
        Ok(value)
    }
}

#[async_trait]
impl WalletClient for MockWallet {
    async fn login_using_oauth(&self, id_token: &str, provider: AuthProvider) -> Result<UserSession> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        assert_eq!(provider, AuthProvider::Google);
        if self.fail_login {
            return Err(PluginError::api("401", "invalid id token"));
        }
        Ok(UserSession {
            user_address: "0x1111111111111111111111111111111111111111".to_string(),
            auth_token: format!("session-for-{}", id_token),
            ..Default::default()
        })
    }

    async fn get_portfolio(&self) -> Result<UserPortfolioData> {
        self.query(UserPortfolioData::default())
    }

    async fn get_account(&self) -> Result<Vec<Wallet>> {
        self.query(vec![Wallet {
            caip_id: "eip155:137".to_string(),
            network_name: "POLYGON".to_string(),
            address: "0x1111111111111111111111111111111111111111".to_string(),
            network_symbol: "POL".to_string(),
        }])
    }

    async fn get_chains(&self) -> Result<Vec<Network>> {
        self.query(self.chains.clone())
    }

    async fn get_nft_collections(&self) -> Result<Vec<NftCollection>> {
        self.query(Vec::new())
    }

    async fn get_orders_history(&self) -> Result<Vec<Order>> {
        self.query(Vec::new())
    }

    async fn get_portfolio_nft(&self) -> Result<Vec<UserNftBalance>> {
        self.query(Vec::new())
    }

    async fn get_tokens(&self) -> Result<Vec<Token>> {
        self.query(self.tokens.clone())
    }

    async fn build_user_op(&self, intent: &Intent) -> Result<UserOp> {
        self.built.lock().unwrap().push(intent.clone());
        Ok(UserOp {
            user_op_hash: format!("0x{}", "ab".repeat(32)),
            payload: json!({ "intent": intent }),
        })
    }

    async fn sign_user_op(&self, user_op: UserOp) -> Result<SignedUserOp> {
        Ok(SignedUserOp {
            user_op,
            signature: "0xsigned".to_string(),
        })
    }

    async fn execute_user_op(&self, signed: SignedUserOp) -> Result<String> {
        if self.fail_execute {
            return Err(PluginError::api("500", "execution reverted"));
        }
        self.executed.lock().unwrap().push(signed);
        Ok(ORDER_ID.to_string())
    }
}

/// 固定的 id token
pub struct FixedToken(pub &'static str);

#[async_trait]
impl IdTokenSource for FixedToken {
    async fn id_token(&self) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// 返回预设对象的运行时，记录收到的上下文
pub struct MockRuntime {
    object: Value,
    pub contexts: Mutex<Vec<String>>,
}

impl MockRuntime {
    pub fn returning(object: Value) -> Self {
        Self {
            object,
            contexts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_context(&self) -> Option<String> {
        self.contexts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl AgentRuntime for MockRuntime {
    async fn compose_state(&self, message: &Memory) -> Result<State> {
        Ok(State {
            room_id: message.room_id.clone(),
            agent_name: "tester".to_string(),
            recent_messages: format!("{}: {}", message.user, message.content.text),
            values: Default::default(),
        })
    }

    async fn update_recent_message_state(&self, state: State) -> Result<State> {
        Ok(state)
    }

    async fn generate_object(&self, context: &str, model_class: ModelClass) -> Result<Value> {
        assert_eq!(model_class, ModelClass::Small);
        self.contexts.lock().unwrap().push(context.to_string());
        Ok(self.object.clone())
    }
}

pub fn service_with(wallet: Arc<MockWallet>) -> Arc<OktoService> {
    Arc::new(OktoService::new(wallet, Arc::new(FixedToken("google-id-token"))))
}

pub fn message(text: &str) -> Memory {
    Memory::new("room-1", "user", text)
}

/// 收集回调消息
#[derive(Clone, Default)]
pub struct Replies(Arc<Mutex<Vec<String>>>);

impl Replies {
    pub fn callback(&self) -> impl Fn(Content) + Send + Sync + 'static {
        let sink = Arc::clone(&self.0);
        move |content: Content| sink.lock().unwrap().push(content.text)
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}
