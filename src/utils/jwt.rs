use crate::error::AppResult;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// 身份提供方签发的访问令牌
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // operator id
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// 当前操作员（鉴权中间件注入到请求扩展中）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl From<Claims> for Operator {
    fn from(c: Claims) -> Self {
        Self {
            id: c.sub,
            email: c.email,
            role: c.role,
        }
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// 令牌由身份提供方签发；本方法供本地联调和测试使用
    pub fn issue_token(
        &self,
        subject: &str,
        email: &str,
        role: &str,
        expires_in_secs: i64,
    ) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in_secs);

        let claims = Claims {
            sub: subject.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}
