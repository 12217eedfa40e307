//! Data models for Pustaka

pub mod account;
pub mod book;
pub mod loan;
pub mod member;

// Re-export commonly used types
pub use account::{Caller, MemberAccount, MemberSession, StaffAccount};
pub use book::Book;
pub use loan::{Loan, LoanDetails, LoanStatus, MemberLoan, ReturnRecord};
pub use member::Member;

/// Strip surrounding whitespace from a submitted text field
pub(crate) fn trim_field(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}
