//! Member (anggota) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Library member profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
}

/// Create member request (staff side)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMember {
    #[serde(alias = "nama")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(alias = "alamat")]
    pub address: Option<String>,
    #[serde(alias = "telepon")]
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
}

impl CreateMember {
    /// Trim text fields so that blank required values fail validation
    pub fn trimmed(mut self) -> Self {
        super::trim_field(&mut self.name);
        super::trim_field(&mut self.phone);
        if let Some(address) = self.address.as_mut() {
            super::trim_field(address);
        }
        self
    }
}

/// Update member request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMember {
    #[serde(alias = "nama")]
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[serde(alias = "alamat")]
    pub address: Option<String>,
    #[serde(alias = "telepon")]
    #[validate(length(min = 1, message = "Phone cannot be empty"))]
    pub phone: Option<String>,
}

impl UpdateMember {
    pub fn trimmed(mut self) -> Self {
        for field in [&mut self.name, &mut self.address, &mut self.phone] {
            if let Some(value) = field.as_mut() {
                super::trim_field(value);
            }
        }
        self
    }
}

/// Fields written to the members table
#[derive(Debug, Clone)]
pub struct NewMember {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
}

impl From<CreateMember> for NewMember {
    fn from(m: CreateMember) -> Self {
        Self {
            name: m.name,
            address: m.address.unwrap_or_default(),
            phone: Some(m.phone),
        }
    }
}
