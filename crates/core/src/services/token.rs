//! JWT token service.
//!
//! Issues and checks HS256 token pairs. Access tokens authenticate API
//! requests; refresh tokens only mint new access tokens.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use yatube_common::{AppError, AppResult, config::AuthConfig};
use yatube_db::entities::user;

use super::user::UserService;

/// Kind of a JWT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub token_type: TokenType,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
    pub user_id: i64,
}

/// Freshly issued refresh/access pair.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

/// Token service.
#[derive(Clone)]
pub struct TokenService {
    user_service: UserService,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_lifetime_secs: i64,
    refresh_lifetime_secs: i64,
}

impl TokenService {
    /// Create a new token service.
    #[must_use]
    pub fn new(user_service: UserService, auth: &AuthConfig) -> Self {
        Self {
            user_service,
            encoding_key: EncodingKey::from_secret(auth.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(auth.secret_key.as_bytes()),
            access_lifetime_secs: auth.access_token_lifetime_secs,
            refresh_lifetime_secs: auth.refresh_token_lifetime_secs,
        }
    }

    /// Check credentials and issue a token pair.
    pub async fn obtain_pair(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        let user = self.user_service.authenticate(username, password).await?;
        let pair = self.issue_pair(user.id)?;
        tracing::debug!(user_id = user.id, "Issued token pair");
        Ok(pair)
    }

    /// Issue a token pair for a user.
    pub fn issue_pair(&self, user_id: i64) -> AppResult<TokenPair> {
        Ok(TokenPair {
            refresh: self.issue(user_id, TokenType::Refresh)?,
            access: self.issue(user_id, TokenType::Access)?,
        })
    }

    /// Issue a single token of the given kind.
    pub fn issue(&self, user_id: i64, token_type: TokenType) -> AppResult<String> {
        let lifetime = match token_type {
            TokenType::Access => self.access_lifetime_secs,
            TokenType::Refresh => self.refresh_lifetime_secs,
        };
        let now = Utc::now().timestamp();
        let claims = Claims {
            token_type,
            exp: now + lifetime,
            iat: now,
            jti: uuid::Uuid::new_v4().simple().to_string(),
            user_id,
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Exchange a refresh token for a new access token.
    pub fn refresh(&self, refresh_token: &str) -> AppResult<String> {
        let claims = self.decode_typed(refresh_token, TokenType::Refresh)?;
        self.issue(claims.user_id, TokenType::Access)
    }

    /// Check a token of either kind.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Ok(decode::<Claims>(token, &self.decoding_key, &validation)?.claims)
    }

    /// Resolve the user behind an access token.
    pub async fn authenticate(&self, access_token: &str) -> AppResult<user::Model> {
        let claims = self.decode_typed(access_token, TokenType::Access)?;

        self.user_service
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| AppError::InvalidToken("User not found".to_string()))
    }

    fn decode_typed(&self, token: &str, expected: TokenType) -> AppResult<Claims> {
        let claims = self.verify(token)?;
        if claims.token_type != expected {
            return Err(AppError::InvalidToken("Token has wrong type".to_string()));
        }
        Ok(claims)
    }
}
