//! Loans repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::loan::{CreateLoan, LoanDetails, LoanDetailsRow, OverdueLoanRow, ReturnSnapshot},
};

use super::map_write_error;

const LOAN_DETAILS_SELECT: &str = r#"
    SELECT l.id, l.user_id, u.name AS user_name, l.book_id, b.title AS book_title,
           l.loan_date, l.due_date, l.returned_date, l.fine_id,
           f.status AS fine_status, f.amount AS fine_amount
    FROM loans l
    JOIN users u ON u.id = l.user_id
    JOIN books b ON b.id = l.book_id
    LEFT JOIN fines f ON f.id = l.fine_id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all loans with borrower, book and fine
    pub async fn list(&self) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query_as::<_, LoanDetailsRow>(&format!("{} ORDER BY l.id", LOAN_DETAILS_SELECT))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get loan details by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<LoanDetails>> {
        let row = sqlx::query_as::<_, LoanDetailsRow>(&format!("{} WHERE l.id = $1", LOAN_DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Create a new loan. The copy is reserved by the `loans_reserve_copy` trigger.
    pub async fn create(&self, loan: &CreateLoan) -> AppResult<i32> {
        sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO loans (user_id, book_id, loan_date, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(loan.user_id)
        .bind(loan.book_id)
        .bind(loan.loan_date)
        .bind(loan.due_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(e, || {
                AppError::NotFound(format!(
                    "User {} or book {} not found",
                    loan.user_id, loan.book_id
                ))
            })
        })
    }

    /// Read the loan and fine state a return decision is based on
    pub async fn return_snapshot(&self, loan_id: i32) -> AppResult<Option<ReturnSnapshot>> {
        let snapshot = sqlx::query_as::<_, ReturnSnapshot>(
            r#"
            SELECT l.id AS loan_id, l.user_id, l.book_id, l.due_date, l.returned_date,
                   l.fine_id, f.status AS fine_status
            FROM loans l
            LEFT JOIN fines f ON f.id = l.fine_id
            WHERE l.id = $1
            "#,
        )
        .bind(loan_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(snapshot)
    }

    /// Record the return and give the copy back, in one transaction.
    ///
    /// The loan update only applies if the loan is still open, still carries
    /// the fine seen in `snapshot`, and that fine (if any) is paid.
    pub async fn finalize_return(
        &self,
        snapshot: &ReturnSnapshot,
        returned_date: NaiveDate,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE loans SET returned_date = $1
            WHERE id = $2
              AND returned_date IS NULL
              AND fine_id IS NOT DISTINCT FROM $3
              AND (fine_id IS NULL OR EXISTS (
                  SELECT 1 FROM fines f WHERE f.id = loans.fine_id AND f.status = 'paid'
              ))
            "#,
        )
        .bind(returned_date)
        .bind(snapshot.loan_id)
        .bind(snapshot.fine_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            return Err(AppError::Conflict(format!(
                "Loan {} changed while its return was being recorded",
                snapshot.loan_id
            )));
        }

        sqlx::query(
            "UPDATE books SET available_copies = LEAST(available_copies + 1, total_copies) WHERE id = $1",
        )
        .bind(snapshot.book_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Open loans past their due date
    pub async fn overdue(&self, today: NaiveDate) -> AppResult<Vec<OverdueLoanRow>> {
        let rows = sqlx::query_as::<_, OverdueLoanRow>(
            r#"
            SELECT l.id AS loan_id, l.user_id, u.name AS user_name,
                   l.book_id, b.title AS book_title, l.due_date,
                   l.fine_id, f.status AS fine_status
            FROM loans l
            JOIN users u ON u.id = l.user_id
            JOIN books b ON b.id = l.book_id
            LEFT JOIN fines f ON f.id = l.fine_id
            WHERE l.returned_date IS NULL AND l.due_date < $1
            ORDER BY l.due_date, l.id
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Count all loans
    pub async fn count_all(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
