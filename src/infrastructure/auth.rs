//! 认证模块
//!
//! 为钱包登录提供 OAuth id token。令牌的签发与交换由外部完成，
//! 这里只读取已签发的令牌并检查其声明。

use std::collections::HashSet;

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{PluginError, Result};

/// id token 中关心的声明
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub sub: Option<String>,
    pub email: Option<String>,
    pub iss: Option<String>,
    pub exp: Option<i64>,
}

impl IdTokenClaims {
    /// 读取令牌声明，不校验签名（签名由钱包服务校验）
    pub fn peek(token: &str) -> Result<Self> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        decode::<IdTokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|e| PluginError::Validation(format!("malformed id token: {}", e)))
    }

    /// 是否已过期
    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.exp, Some(exp) if exp <= now)
    }
}

/// id token 来源
#[async_trait]
pub trait IdTokenSource: Send + Sync {
    async fn id_token(&self) -> Result<String>;
}

/// 预先签发的固定令牌
pub struct StaticIdToken {
    token: String,
}

impl StaticIdToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl IdTokenSource for StaticIdToken {
    async fn id_token(&self) -> Result<String> {
        let claims = IdTokenClaims::peek(&self.token)?;
        if claims.is_expired_at(chrono::Utc::now().timestamp()) {
            return Err(PluginError::Validation(format!(
                "id token expired at {}",
                claims.exp.unwrap_or_default()
            )));
        }
        debug!(
            subject = claims.email.as_deref().or(claims.sub.as_deref()).unwrap_or("unknown"),
            "using static id token"
        );
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_with_exp(exp: i64) -> String {
        let claims = IdTokenClaims {
            sub: Some("1234".to_string()),
            email: Some("agent@example.com".to_string()),
            iss: Some("https://accounts.google.com".to_string()),
            exp: Some(exp),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap()
    }

    #[test]
    fn test_peek_reads_claims() {
        let claims = IdTokenClaims::peek(&token_with_exp(4_102_444_800)).unwrap();
        assert_eq!(claims.email.as_deref(), Some("agent@example.com"));
        assert!(!claims.is_expired_at(1_700_000_000));
    }

    #[test]
    fn test_peek_rejects_garbage() {
        assert!(IdTokenClaims::peek("not-a-jwt").is_err());
    }

    #[tokio::test]
    async fn test_static_token_rejects_expired() {
        let source = StaticIdToken::new(token_with_exp(1_000));
        assert!(source.id_token().await.is_err());

        let valid = token_with_exp(chrono::Utc::now().timestamp() + 3600);
        let source = StaticIdToken::new(valid.clone());
        assert_eq!(source.id_token().await.unwrap(), valid);
    }
}
