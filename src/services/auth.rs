//! Credential gate and account service for staff and members

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::RngCore;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        account::{Caller, MemberLogin, MemberSession, RegisterMember, StaffCredentials},
        member::NewMember,
    },
    repository::Repository,
};

const INVALID_KEY: &str = "Invalid API key";
const INVALID_LOGIN: &str = "Invalid username or password";

/// Prefix of every generated member key
pub const MEMBER_KEY_PREFIX: &str = "user-";

/// Generate a fresh opaque member access key
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{}{}", MEMBER_KEY_PREFIX, hex::encode(bytes))
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Whether members may register without presenting a key
    pub fn public_member_registration(&self) -> bool {
        self.config.public_member_registration
    }

    /// Resolve an `X-API-Key` value to a caller.
    ///
    /// Every rejection carries the same message so callers cannot tell an
    /// unknown key from a malformed one.
    pub async fn authenticate_key(&self, key: &str) -> AppResult<Caller> {
        if key.is_empty() {
            return Err(AppError::Authentication(INVALID_KEY.to_string()));
        }

        if key == self.config.master_key {
            return Ok(Caller::Staff);
        }

        match self.repository.accounts.get_member_by_api_key(key).await? {
            Some(account) => Ok(Caller::Member {
                member_id: account.member_id,
                username: account.username,
            }),
            None => Err(AppError::Authentication(INVALID_KEY.to_string())),
        }
    }

    /// Create a staff (petugas) account
    pub async fn register_staff(&self, credentials: StaffCredentials) -> AppResult<i64> {
        credentials.validate()?;

        let hash = self.hash_password(&credentials.password)?;
        let id = self
            .repository
            .accounts
            .create_staff(&credentials.username, &hash)
            .await?;

        tracing::info!("Staff account registered: {}", credentials.username);
        Ok(id)
    }

    /// Check staff credentials, returning the username on success
    pub async fn login_staff(&self, credentials: StaffCredentials) -> AppResult<String> {
        let account = self
            .repository
            .accounts
            .get_staff_by_username(&credentials.username)
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_LOGIN.to_string()))?;

        if !self.verify_password(&account.password_hash, &credentials.password)? {
            tracing::warn!("Failed staff login for {}", credentials.username);
            return Err(AppError::Authentication(INVALID_LOGIN.to_string()));
        }

        Ok(account.username)
    }

    /// Register a member profile together with its credential
    pub async fn register_member(&self, request: RegisterMember) -> AppResult<MemberSession> {
        let request = request.trimmed();
        request.validate()?;

        let hash = self.hash_password(&request.password)?;
        let api_key = generate_api_key();
        let profile = NewMember {
            name: request.name,
            address: request.address.unwrap_or_default(),
            phone: request.phone,
        };

        let member = self
            .repository
            .accounts
            .register_member(&profile, &request.username, &hash, &api_key)
            .await?;

        tracing::info!("Member registered: {} (member id {})", request.username, member.id);

        Ok(MemberSession {
            member_id: member.id,
            username: request.username,
            api_key,
        })
    }

    /// Verify a member's password and issue (or keep) their access key
    pub async fn login_member(&self, request: MemberLogin) -> AppResult<MemberSession> {
        request.validate()?;

        let account = self
            .repository
            .accounts
            .get_member_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_LOGIN.to_string()))?;

        if !self.verify_password(&account.password_hash, &request.password)? {
            tracing::warn!("Failed member login for {}", request.username);
            return Err(AppError::Authentication(INVALID_LOGIN.to_string()));
        }

        let api_key = match request.api_key {
            Some(proposed) => {
                self.check_proposed_key(&proposed)?;
                proposed
            }
            None => generate_api_key(),
        };

        self.repository
            .accounts
            .set_api_key(account.id, &api_key)
            .await?;

        Ok(MemberSession {
            member_id: account.member_id,
            username: account.username,
            api_key,
        })
    }

    fn check_proposed_key(&self, key: &str) -> AppResult<()> {
        if key.chars().count() < self.config.min_api_key_length {
            return Err(AppError::Validation(format!(
                "API key must be at least {} characters",
                self.config.min_api_key_length
            )));
        }
        if key.chars().any(char::is_whitespace) {
            return Err(AppError::Validation("API key cannot contain whitespace".to_string()));
        }
        if key == self.config.master_key {
            return Err(AppError::Validation("API key is not allowed".to_string()));
        }
        Ok(())
    }

    /// Verify a password against a stored Argon2 hash
    fn verify_password(&self, hash: &str, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
