//! JWT Token 处理
//!
//! 提供 JWT Token 的生成和验证功能。Token 只在密码校验通过后签发，
//! 验证结果区分"无效"和"已过期"两种失败。

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use banner_shared::config::AuthConfig;

use crate::error::ApiError;
use crate::models::Role;

/// JWT 配置
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// 签名密钥
    pub secret: String,
    /// Token 过期时间（秒）
    pub expires_in_secs: i64,
    /// Token 签发者
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

impl From<&AuthConfig> for JwtConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expires_in_secs: config.token_ttl_seconds,
            issuer: config.issuer.clone(),
        }
    }
}

/// JWT Claims（Token 载荷）
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// 用户名
    pub sub: String,
    /// 用户 ID
    pub uid: i64,
    pub role: Role,
    /// 签发时间
    pub iat: i64,
    /// 过期时间
    pub exp: i64,
    /// 签发者
    pub iss: String,
}

/// 验证通过的 Token 信息，注入到请求扩展中
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub user_id: i64,
    pub subject: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

/// Token 验证失败原因
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("无效的 Token")]
    Invalid,
    #[error("Token 已过期")]
    Expired,
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

/// JWT 管理器
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    /// 创建 JWT 管理器
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 生成 JWT Token
    ///
    /// 返回 (token, 过期时间戳)
    pub fn generate_token(
        &self,
        user_id: i64,
        username: &str,
        role: Role,
    ) -> Result<(String, i64), ApiError> {
        self.generate_token_at(user_id, username, role, Utc::now())
    }

    fn generate_token_at(
        &self,
        user_id: i64,
        username: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<(String, i64), ApiError> {
        let exp = now + Duration::seconds(self.config.expires_in_secs);

        let claims = Claims {
            sub: username.to_string(),
            uid: user_id,
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.issuer.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("JWT 生成失败: {}", e)))?;

        Ok((token, exp.timestamp()))
    }

    /// 验证并解析 JWT Token
    pub fn verify_token(&self, token: &str) -> Result<AuthToken, TokenError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                }
            })?;

        let claims = token_data.claims;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(TokenError::Invalid)?;

        Ok(AuthToken {
            user_id: claims.uid,
            subject: claims.sub,
            role: claims.role,
            expires_at,
        })
    }

    /// 获取 Token 过期时间（秒）
    pub fn expires_in_secs(&self) -> i64 {
        self.config.expires_in_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_verify_token() {
        let manager = JwtManager::new(JwtConfig::default());

        let (token, exp) = manager.generate_token(1, "admin", Role::Admin).unwrap();

        let auth = manager.verify_token(&token).unwrap();
        assert_eq!(auth.user_id, 1);
        assert_eq!(auth.subject, "admin");
        assert_eq!(auth.role, Role::Admin);
        assert_eq!(auth.expires_at.timestamp(), exp);
    }

    #[test]
    fn test_default_ttl_is_ten_minutes() {
        let manager = JwtManager::new(JwtConfig::default());
        assert_eq!(manager.expires_in_secs(), 600);
    }

    #[test]
    fn test_invalid_token() {
        let manager = JwtManager::new(JwtConfig::default());
        assert_eq!(manager.verify_token("invalid.token.here"), Err(TokenError::Invalid));
    }

    #[test]
    fn test_expired_token() {
        let manager = JwtManager::new(JwtConfig::default());
        let issued = Utc::now() - Duration::seconds(3600);
        let (token, _) = manager
            .generate_token_at(1, "alice", Role::User, issued)
            .unwrap();

        assert_eq!(manager.verify_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let issuer = JwtManager::new(JwtConfig {
            secret: "other-secret".to_string(),
            ..JwtConfig::default()
        });
        let (token, _) = issuer.generate_token(1, "mallory", Role::Admin).unwrap();

        let manager = JwtManager::new(JwtConfig::default());
        assert_eq!(manager.verify_token(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let issuer = JwtManager::new(JwtConfig {
            issuer: "someone-else".to_string(),
            ..JwtConfig::default()
        });
        let (token, _) = issuer.generate_token(1, "alice", Role::User).unwrap();

        let manager = JwtManager::new(JwtConfig::default());
        assert_eq!(manager.verify_token(&token), Err(TokenError::Invalid));
    }
}
