//! Fines repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::fine::{Fine, FineSettlement, LoanFineRef, NewFine},
};

use super::map_write_error;

#[derive(Clone)]
pub struct FinesRepository {
    pool: Pool<Postgres>,
}

impl FinesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a pending fine and attach it to its loan, in one transaction
    pub async fn create_for_loan(&self, fine: &NewFine) -> AppResult<i32> {
        let conflict = || {
            AppError::Conflict(format!("Loan {} already has a fine attached", fine.loan_id))
        };

        let mut tx = self.pool.begin().await?;

        let fine_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO fines (loan_id, user_id, amount, days_late, status, created_date)
            VALUES ($1, $2, $3, $4, 'pending', $5)
            RETURNING id
            "#,
        )
        .bind(fine.loan_id)
        .bind(fine.user_id)
        .bind(fine.amount)
        .bind(fine.days_late)
        .bind(fine.created_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, conflict))?;

        let attached = sqlx::query(
            "UPDATE loans SET fine_id = $1 WHERE id = $2 AND fine_id IS NULL AND returned_date IS NULL",
        )
        .bind(fine_id)
        .bind(fine.loan_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if attached == 0 {
            tx.rollback().await?;
            return Err(conflict());
        }

        tx.commit().await?;
        Ok(fine_id)
    }

    /// Pay or cancel the fine attached to a loan.
    ///
    /// The loan row is locked for the whole read-check-write sequence, so two
    /// concurrent settlements of the same fine are serialized and the second
    /// one sees the status written by the first.
    pub async fn settle(&self, loan_id: i32, settlement: FineSettlement) -> AppResult<Fine> {
        let mut tx = self.pool.begin().await?;

        let fine_ref = sqlx::query_as::<_, LoanFineRef>(
            r#"
            SELECT l.id AS loan_id, l.fine_id, f.status
            FROM loans l
            LEFT JOIN fines f ON f.id = l.fine_id
            WHERE l.id = $1
            FOR UPDATE OF l
            "#,
        )
        .bind(loan_id)
        .fetch_optional(&mut *tx)
        .await?;

        let fine_id = match fine_ref
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))
            .and_then(|r| r.settleable_fine())
        {
            Ok(id) => id,
            Err(e) => {
                tx.rollback().await?;
                return Err(e);
            }
        };

        let fine = sqlx::query_as::<_, Fine>(
            r#"
            UPDATE fines SET status = $1, paid_date = $2
            WHERE id = $3 AND status = 'pending'
            RETURNING id, loan_id, user_id, amount, days_late, status, created_date, paid_date
            "#,
        )
        .bind(settlement.status())
        .bind(settlement.paid_date())
        .bind(fine_id)
        .fetch_optional(&mut *tx)
        .await?;

        match fine {
            Some(fine) => {
                tx.commit().await?;
                Ok(fine)
            }
            None => {
                tx.rollback().await?;
                Err(AppError::Conflict(format!("Fine {} changed while being settled", fine_id)))
            }
        }
    }
}
