//! Loan (peminjaman) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    sqlite::{SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef},
    Decode, Encode, FromRow, Sqlite,
};
use utoipa::ToSchema;
use validator::Validate;

/// Lifecycle of a loan: `Open` until the book comes back, then `Returned`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Open,
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Open => "open",
            LoanStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" | "dipinjam" => Ok(LoanStatus::Open),
            "returned" | "dikembalikan" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus (stored as TEXT)
impl sqlx::Type<Sqlite> for LoanStatus {
    fn type_info() -> SqliteTypeInfo {
        <String as sqlx::Type<Sqlite>>::type_info()
    }

    fn compatible(ty: &SqliteTypeInfo) -> bool {
        <String as sqlx::Type<Sqlite>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Sqlite> for LoanStatus {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let s: String = Decode::<Sqlite>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl<'q> Encode<'q, Sqlite> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut Vec<SqliteArgumentValue<'q>>) -> IsNull {
        <&str as Encode<'q, Sqlite>>::encode(self.as_str(), buf)
    }
}

/// Loan row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i64,
    /// Null once the book itself has been removed from the catalog
    pub book_id: Option<i64>,
    pub member_id: Option<i64>,
    pub loan_date: NaiveDate,
    pub status: LoanStatus,
}

/// Loan joined with book title and member name, for staff listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id: i64,
    pub book_id: Option<i64>,
    pub book_title: Option<String>,
    pub member_id: Option<i64>,
    pub member_name: Option<String>,
    pub loan_date: NaiveDate,
    pub status: LoanStatus,
}

/// One line of a member's dashboard
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MemberLoan {
    pub loan_id: i64,
    pub book_id: Option<i64>,
    pub book_title: Option<String>,
    pub loan_date: NaiveDate,
    pub status: LoanStatus,
}

/// Return (pengembalian) record written when a loan is closed
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReturnRecord {
    pub id: i64,
    pub loan_id: i64,
    pub return_date: DateTime<Utc>,
    pub fine: i64,
}

/// Create loan request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLoan {
    #[serde(alias = "id_buku")]
    #[validate(range(min = 1, message = "book_id must be a positive id"))]
    pub book_id: i64,
    #[serde(alias = "id_anggota")]
    #[validate(range(min = 1, message = "member_id must be a positive id"))]
    pub member_id: i64,
    /// Defaults to today (UTC)
    #[serde(default, alias = "tanggal_pinjam")]
    pub loan_date: Option<NaiveDate>,
}
