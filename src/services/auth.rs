use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::user::User;
use crate::services::Database;

/// 会话 cookie 名
pub const SESSION_COOKIE: &str = "pulse_session";

const SESSION_TOKEN_LENGTH: usize = 48;

#[derive(Debug, Clone)]
struct Session {
    user_id: i64,
    expires_at: DateTime<Utc>,
}

/// 认证服务
///
/// Cookie sessions over the shared store: a random token maps to a user id
/// with a TTL. Expired sessions are dropped on lookup and swept by the
/// background task.
#[derive(Clone)]
pub struct AuthService {
    db: Arc<Database>,
    sessions: Arc<DashMap<String, Session>>,
    session_ttl: Duration,
}

impl AuthService {
    pub async fn new(db: Arc<Database>, config: &Config) -> Result<Self> {
        Ok(Self {
            db,
            sessions: Arc::new(DashMap::new()),
            session_ttl: Duration::seconds(config.session_ttl as i64),
        })
    }

    /// 注册新用户
    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        debug!("Registering user: {}", username);

        let password_hash = hash_password(password)?;
        let user = self.db.create_user(username, &password_hash)?;

        info!("Registered user: {} ({})", user.username, user.id);
        Ok(user)
    }

    /// 登录；成功返回会话令牌
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        debug!("Login attempt for: {}", username);

        let user = self
            .db
            .find_user_by_username(username)
            .ok_or_else(|| AppError::unauthorized("Invalid username or password"))?;

        if !verify_password(password, &user.password_hash) {
            return Err(AppError::unauthorized("Invalid username or password"));
        }

        let token = generate_session_token();
        self.sessions.insert(
            token.clone(),
            Session {
                user_id: user.id,
                expires_at: Utc::now() + self.session_ttl,
            },
        );

        info!("User {} logged in", user.username);
        Ok(token)
    }

    /// 根据会话令牌解析当前用户
    pub async fn authenticate(&self, token: &str) -> Option<User> {
        let session = self.sessions.get(token)?.value().clone();
        if session.expires_at <= Utc::now() {
            self.sessions.remove(token);
            return None;
        }
        self.db.get_user(session.user_id)
    }

    /// 注销会话；令牌不存在时为空操作
    pub async fn logout(&self, token: &str) {
        self.sessions.remove(token);
    }

    /// 清理过期会话
    pub fn cleanup_expired_sessions(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.expires_at > now);
        before - self.sessions.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn generate_session_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> AuthService {
        let config = Config::from_env().unwrap();
        AuthService::new(Arc::new(Database::new()), &config)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn register_login_logout_round_trip() {
        let auth = service().await;
        let user = auth.register("alice", "password123").await.unwrap();

        let token = auth.login("alice", "password123").await.unwrap();
        assert_eq!(auth.session_count(), 1);
        let resolved = auth.authenticate(&token).await.unwrap();
        assert_eq!(resolved.id, user.id);

        auth.logout(&token).await;
        assert!(auth.authenticate(&token).await.is_none());
        assert_eq!(auth.session_count(), 0);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let auth = service().await;
        auth.register("alice", "password123").await.unwrap();

        let err = auth.login("alice", "wrong-password").await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn unknown_token_resolves_to_nobody() {
        let auth = service().await;
        assert!(auth.authenticate("no-such-token").await.is_none());
    }

    #[tokio::test]
    async fn password_hashes_are_salted() {
        let first = hash_password("password123").unwrap();
        let second = hash_password("password123").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("password123", &first));
        assert!(!verify_password("other", &first));
    }
}
