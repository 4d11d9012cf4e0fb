//! Repository layer for database operations

pub mod books;
pub mod fines;
pub mod loans;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookLoanCount,
        fine::{Fine, FineSettlement, NewFine},
        loan::{CreateLoan, LoanDetails, OverdueLoanRow, ReturnSnapshot},
    },
};

/// Storage operations the circulation services rely on.
///
/// Every write method is one failure unit: it either applies all of its
/// changes or none of them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CirculationStore: Send + Sync {
    /// Available-copy count of a book, `None` if the book does not exist
    async fn available_copies(&self, book_id: i32) -> AppResult<Option<i32>>;

    async fn create_loan(&self, loan: &CreateLoan) -> AppResult<i32>;

    async fn list_loans(&self) -> AppResult<Vec<LoanDetails>>;

    async fn get_loan(&self, loan_id: i32) -> AppResult<Option<LoanDetails>>;

    async fn return_snapshot(&self, loan_id: i32) -> AppResult<Option<ReturnSnapshot>>;

    /// Insert a pending fine and attach it to its loan.
    /// Fails with `Conflict` if the loan already has a fine or was returned.
    async fn attach_fine(&self, fine: &NewFine) -> AppResult<i32>;

    /// Set the return date and put the copy back on the shelf.
    /// Fails with `Conflict` if the loan no longer matches `snapshot`.
    async fn finalize_return(
        &self,
        snapshot: &ReturnSnapshot,
        returned_date: NaiveDate,
    ) -> AppResult<()>;

    /// Move the fine attached to a loan out of `Pending`
    async fn settle_fine(&self, loan_id: i32, settlement: FineSettlement) -> AppResult<Fine>;

    /// Open loans whose due date is before `today`
    async fn overdue_loans(&self, today: NaiveDate) -> AppResult<Vec<OverdueLoanRow>>;

    async fn count_loans(&self) -> AppResult<i64>;

    async fn most_borrowed_books(&self, limit: i64) -> AppResult<Vec<BookLoanCount>>;

    /// Check that the store answers
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub loans: loans::LoansRepository,
    pub fines: fines::FinesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            fines: fines::FinesRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl CirculationStore for Repository {
    async fn available_copies(&self, book_id: i32) -> AppResult<Option<i32>> {
        self.books.available_copies(book_id).await
    }

    async fn create_loan(&self, loan: &CreateLoan) -> AppResult<i32> {
        self.loans.create(loan).await
    }

    async fn list_loans(&self) -> AppResult<Vec<LoanDetails>> {
        self.loans.list().await
    }

    async fn get_loan(&self, loan_id: i32) -> AppResult<Option<LoanDetails>> {
        self.loans.get_by_id(loan_id).await
    }

    async fn return_snapshot(&self, loan_id: i32) -> AppResult<Option<ReturnSnapshot>> {
        self.loans.return_snapshot(loan_id).await
    }

    async fn attach_fine(&self, fine: &NewFine) -> AppResult<i32> {
        self.fines.create_for_loan(fine).await
    }

    async fn finalize_return(
        &self,
        snapshot: &ReturnSnapshot,
        returned_date: NaiveDate,
    ) -> AppResult<()> {
        self.loans.finalize_return(snapshot, returned_date).await
    }

    async fn settle_fine(&self, loan_id: i32, settlement: FineSettlement) -> AppResult<Fine> {
        self.fines.settle(loan_id, settlement).await
    }

    async fn overdue_loans(&self, today: NaiveDate) -> AppResult<Vec<OverdueLoanRow>> {
        self.loans.overdue(today).await
    }

    async fn count_loans(&self) -> AppResult<i64> {
        self.loans.count_all().await
    }

    async fn most_borrowed_books(&self, limit: i64) -> AppResult<Vec<BookLoanCount>> {
        self.books.most_borrowed(limit).await
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Map constraint violations raised by a write to domain errors
pub(crate) fn map_write_error(error: sqlx::Error, what: impl FnOnce() -> AppError) -> AppError {
    if let sqlx::Error::Database(db) = &error {
        if db.is_foreign_key_violation() || db.is_unique_violation() {
            return what();
        }
    }
    AppError::Database(error)
}
