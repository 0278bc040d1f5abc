//! Okto 网关 HTTP 客户端
//!
//! `WalletClient` 的 reqwest 实现。除登录外的请求都携带会话令牌，
//! user operation 使用客户端私钥在本地签名。

use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use crate::core::config::PluginConfig;
use crate::core::wallet::{SignedUserOp, UserOp, WalletClient};
use crate::domain::{
    AuthProvider, Intent, Network, NftCollection, Order, Token, UserNftBalance, UserPortfolioData,
    UserSession, Wallet,
};
use crate::errors::{PluginError, Result};
use crate::infrastructure::evm::{eip191_digest, hex_decode, hex_encode, sign_digest, signing_key_from_hex};

const AUTHENTICATE: &str = "/api/oc/v1/authenticate";
const PORTFOLIO: &str = "/api/oc/v1/aggregated-portfolio";
const WALLETS: &str = "/api/oc/v1/wallets";
const NETWORKS: &str = "/api/oc/v1/supported/networks";
const TOKENS: &str = "/api/oc/v1/supported/tokens";
const NFT_COLLECTIONS: &str = "/api/oc/v1/nft/collections";
const ORDERS: &str = "/api/oc/v1/orders";
const PORTFOLIO_NFT: &str = "/api/oc/v1/portfolio/nft";
const USEROP_BUILD: &str = "/api/oc/v1/userop/build";
const EXECUTE: &str = "/api/oc/v1/execute";

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    status: String,
    data: Option<T>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Value,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteResult {
    job_id: String,
}

/// Okto 网关客户端
pub struct OktoHttpClient {
    http: reqwest::Client,
    base_url: String,
    client_swa: String,
    signing_key: SigningKey,
    session: RwLock<Option<UserSession>>,
}

impl OktoHttpClient {
    /// 创建客户端
    pub fn new(base_url: &str, client_private_key: &str, client_swa: impl Into<String>) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| PluginError::Config(format!("invalid Okto base url '{}': {}", base_url, e)))?;
        let signing_key = signing_key_from_hex(client_private_key)?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            client_swa: client_swa.into(),
            signing_key,
            session: RwLock::new(None),
        })
    }

    /// 从插件配置创建客户端
    pub fn from_config(config: &PluginConfig) -> Result<Self> {
        Self::new(&config.gateway_url(), &config.client_private_key, config.client_swa.clone())
    }

    /// 当前会话
    pub async fn session(&self) -> Option<UserSession> {
        self.session.read().await.clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let session = self.session.read().await;
        let token = session
            .as_ref()
            .map(|s| s.auth_token.clone())
            .ok_or(PluginError::NotAuthenticated)?;
        Ok(builder.bearer_auth(token).header("x-client-swa", &self.client_swa))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(path, "GET");
        let request = self.authorized(self.http.get(self.url(path))).await?;
        Self::unwrap_response(request.send().await?).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        debug!(path, "POST");
        let request = self.authorized(self.http.post(self.url(path))).await?;
        Self::unwrap_response(request.json(body).send().await?).await
    }

    async fn unwrap_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        let envelope: ApiEnvelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                let snippet: String = body.chars().take(200).collect();
                return Err(PluginError::api(status.as_u16().to_string(), snippet));
            }
        };

        if envelope.status == "success" {
            if let Some(data) = envelope.data {
                return Ok(data);
            }
        }

        match envelope.error {
            Some(err) => {
                let code = match err.code {
                    Value::String(s) => s,
                    Value::Null => status.as_u16().to_string(),
                    other => other.to_string(),
                };
                Err(PluginError::api(code, err.message))
            }
            None => Err(PluginError::api(
                status.as_u16().to_string(),
                format!("unexpected response status '{}'", envelope.status),
            )),
        }
    }
}

#[async_trait]
impl WalletClient for OktoHttpClient {
    async fn login_using_oauth(&self, id_token: &str, provider: AuthProvider) -> Result<UserSession> {
        let body = json!({
            "idToken": id_token,
            "provider": provider,
            "clientSWA": self.client_swa,
        });
        let response = self.http.post(self.url(AUTHENTICATE)).json(&body).send().await?;
        let session: UserSession = Self::unwrap_response(response).await?;

        info!(user_address = %session.user_address, "Okto authentication succeeded");
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn get_portfolio(&self) -> Result<UserPortfolioData> {
        self.get(PORTFOLIO).await
    }

    async fn get_account(&self) -> Result<Vec<Wallet>> {
        self.get(WALLETS).await
    }

    async fn get_chains(&self) -> Result<Vec<Network>> {
        self.get(NETWORKS).await
    }

    async fn get_nft_collections(&self) -> Result<Vec<NftCollection>> {
        self.get(NFT_COLLECTIONS).await
    }

    async fn get_orders_history(&self) -> Result<Vec<Order>> {
        self.get(ORDERS).await
    }

    async fn get_portfolio_nft(&self) -> Result<Vec<UserNftBalance>> {
        self.get(PORTFOLIO_NFT).await
    }

    async fn get_tokens(&self) -> Result<Vec<Token>> {
        self.get(TOKENS).await
    }

    async fn build_user_op(&self, intent: &Intent) -> Result<UserOp> {
        let user_address = self
            .session()
            .await
            .map(|s| s.user_address)
            .ok_or(PluginError::NotAuthenticated)?;
        let body = json!({
            "userAddress": user_address,
            "intent": intent,
        });
        self.post(USEROP_BUILD, &body).await
    }

    async fn sign_user_op(&self, user_op: UserOp) -> Result<SignedUserOp> {
        let hash = hex_decode(&user_op.user_op_hash)?;
        let hash: [u8; 32] = hash.as_slice().try_into().map_err(|_| {
            PluginError::Signing(format!("userOpHash must be 32 bytes, got {}", hash.len()))
        })?;
        let signature = sign_digest(&self.signing_key, &eip191_digest(&hash))?;

        Ok(SignedUserOp {
            user_op,
            signature: hex_encode(&signature),
        })
    }

    async fn execute_user_op(&self, signed: SignedUserOp) -> Result<String> {
        let body = serde_json::to_value(&signed)?;
        let result: ExecuteResult = self.post(EXECUTE, &body).await?;
        Ok(result.job_id)
    }
}
