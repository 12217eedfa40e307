//! Loan management service

use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, Loan, LoanDetails, MemberLoan, ReturnRecord},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a new loan (borrow a book)
    pub async fn create_loan(&self, loan: CreateLoan) -> AppResult<Loan> {
        loan.validate()?;
        let loan_date = loan.loan_date.unwrap_or_else(|| Utc::now().date_naive());

        let created = self
            .repository
            .loans
            .create(loan.book_id, loan.member_id, loan_date)
            .await?;

        tracing::info!(
            "Loan {} opened: book={} member={}",
            created.id,
            loan.book_id,
            loan.member_id
        );
        Ok(created)
    }

    /// Return a borrowed book
    pub async fn return_loan(&self, loan_id: i64) -> AppResult<(Loan, ReturnRecord)> {
        let (loan, record) = self.repository.loans.return_loan(loan_id, Utc::now()).await?;
        tracing::info!("Loan {} returned", loan_id);
        Ok((loan, record))
    }

    /// Delete a loan, giving the copy back if it was still open
    pub async fn delete_loan(&self, loan_id: i64) -> AppResult<Loan> {
        let loan = self.repository.loans.delete(loan_id).await?;
        tracing::info!("Loan {} deleted (was {})", loan_id, loan.status);
        Ok(loan)
    }

    pub async fn get_loan(&self, loan_id: i64) -> AppResult<LoanDetails> {
        self.repository.loans.get_details(loan_id).await
    }

    /// All loans for staff review
    pub async fn list_loans(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list().await
    }

    /// Loans for one member's dashboard
    pub async fn list_member_loans(&self, member_id: i64) -> AppResult<Vec<MemberLoan>> {
        // Verify member exists
        self.repository.members.get_by_id(member_id).await?;
        self.repository.loans.list_for_member(member_id).await
    }
}
