//! Credential models: staff (petugas) and member (anggota) accounts

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Staff credential row
#[derive(Debug, Clone, FromRow)]
pub struct StaffAccount {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// Member credential row, linked 1:1 to a member profile
#[derive(Debug, Clone, FromRow)]
pub struct MemberAccount {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub api_key: Option<String>,
    pub member_id: i64,
}

/// Staff registration / login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StaffCredentials {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
}

/// Member self-registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterMember {
    #[serde(alias = "nama")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    #[serde(alias = "alamat")]
    pub address: Option<String>,
    #[serde(alias = "telepon")]
    pub phone: Option<String>,
}

impl RegisterMember {
    /// Trim profile fields so that a blank name fails validation
    pub fn trimmed(mut self) -> Self {
        super::trim_field(&mut self.name);
        for field in [&mut self.address, &mut self.phone] {
            if let Some(value) = field.as_mut() {
                super::trim_field(value);
            }
        }
        self
    }
}

/// Member login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MemberLogin {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Key to keep instead of having a new one generated
    #[serde(default, alias = "newApiKey")]
    pub api_key: Option<String>,
}

/// Access key issued to a member, returned by registration and login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberSession {
    pub member_id: i64,
    pub username: String,
    pub api_key: String,
}

/// Identity admitted by the credential gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// Request carried the master key
    Staff,
    /// Request carried a key issued to a member at login or registration
    Member { member_id: i64, username: String },
}

impl Caller {
    pub fn is_staff(&self) -> bool {
        matches!(self, Caller::Staff)
    }

    /// Member id bound to the credential, if any
    pub fn member_id(&self) -> Option<i64> {
        match self {
            Caller::Staff => None,
            Caller::Member { member_id, .. } => Some(*member_id),
        }
    }

    /// Check that the caller holds the master key
    pub fn require_staff(&self) -> Result<(), crate::error::AppError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(crate::error::AppError::Authorization(
                "Staff credentials required".to_string(),
            ))
        }
    }

    /// Staff may read any member's data; a member only their own
    pub fn require_member_access(&self, member_id: i64) -> Result<(), crate::error::AppError> {
        match self {
            Caller::Staff => Ok(()),
            Caller::Member { member_id: own, .. } if *own == member_id => Ok(()),
            Caller::Member { .. } => Err(crate::error::AppError::Authorization(
                "Members may only access their own records".to_string(),
            )),
        }
    }
}
