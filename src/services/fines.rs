//! Fine payment workflow and overdue listing

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::{
    config::FinesConfig,
    error::AppResult,
    models::{
        book::BookShort,
        fine::{days_late, fine_amount, Fine, FineSettlement, FineStatus, FineView},
        loan::OverdueLoanRow,
        user::UserShort,
    },
    repository::CirculationStore,
};

use super::{log_internal, log_internal_all};

#[derive(Clone)]
pub struct FinesService {
    store: Arc<dyn CirculationStore>,
    daily_rate: Decimal,
}

impl FinesService {
    pub fn new(store: Arc<dyn CirculationStore>, config: &FinesConfig) -> Self {
        Self {
            store,
            daily_rate: config.daily_rate,
        }
    }

    /// Pay the fine attached to a loan. Does not return the loan.
    pub async fn pay_fine(&self, loan_id: i32) -> AppResult<Fine> {
        self.pay_fine_on(loan_id, Utc::now().date_naive()).await
    }

    pub async fn pay_fine_on(&self, loan_id: i32, today: NaiveDate) -> AppResult<Fine> {
        let fine = self
            .store
            .settle_fine(loan_id, FineSettlement::Paid(today))
            .await
            .inspect_err(log_internal("pay_fine", loan_id))?;

        tracing::info!(loan_id, fine_id = fine.id, amount = %fine.amount, "Fine paid");
        Ok(fine)
    }

    /// Cancel the fine attached to a loan
    pub async fn cancel_fine(&self, loan_id: i32) -> AppResult<Fine> {
        let fine = self
            .store
            .settle_fine(loan_id, FineSettlement::Cancelled)
            .await
            .inspect_err(log_internal("cancel_fine", loan_id))?;

        tracing::info!(loan_id, fine_id = fine.id, "Fine cancelled");
        Ok(fine)
    }

    /// Open loans past their due date, with the fine they accrue as of today
    pub async fn list_overdue(&self) -> AppResult<Vec<FineView>> {
        self.list_overdue_on(Utc::now().date_naive()).await
    }

    pub async fn list_overdue_on(&self, today: NaiveDate) -> AppResult<Vec<FineView>> {
        let rows = self
            .store
            .overdue_loans(today)
            .await
            .inspect_err(log_internal_all("list_overdue_fines"))?;

        Ok(rows.into_iter().map(|row| self.view(row, today)).collect())
    }

    fn view(&self, row: OverdueLoanRow, today: NaiveDate) -> FineView {
        let days_late = days_late(row.due_date, today);
        FineView {
            loan_id: row.loan_id,
            user: UserShort {
                id: row.user_id,
                name: row.user_name,
            },
            book: BookShort {
                id: row.book_id,
                title: row.book_title,
            },
            due_date: row.due_date,
            days_late,
            amount: fine_amount(days_late, self.daily_rate),
            fine_id: row.fine_id,
            fine_status: row.fine_status,
            paid: row.fine_status == Some(FineStatus::Paid),
        }
    }
}
