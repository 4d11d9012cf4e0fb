//! Loan lifecycle: checkout, listing and returns

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::{FinesConfig, LoansConfig},
    error::{AppError, AppResult},
    models::{
        fine::{days_late, fine_amount, FineStatus, NewFine},
        loan::{CreateLoan, LoanDetails, ReturnSnapshot},
    },
    repository::CirculationStore,
};

use super::{log_internal, log_internal_all};

/// Next step of a return, decided from the loan as currently stored
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnPlan {
    /// A fine is attached and not paid
    Block { fine_id: i32, status: FineStatus },
    /// Late with no fine yet: record one and block
    ChargeFine { days_late: i64, amount: Decimal },
    /// Close the loan
    Finalize(ReturnKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    OnTime,
    FinePaid { fine_id: i32 },
}

impl ReturnKind {
    pub fn message(&self) -> String {
        match self {
            ReturnKind::OnTime => "Return recorded. No fine due.".to_string(),
            ReturnKind::FinePaid { fine_id } => {
                format!("Return recorded. Fine {} was already paid.", fine_id)
            }
        }
    }

    pub fn fine_id(&self) -> Option<i32> {
        match self {
            ReturnKind::OnTime => None,
            ReturnKind::FinePaid { fine_id } => Some(*fine_id),
        }
    }
}

/// Decide what a return attempt on `today` does to the loan
pub fn plan_return(
    snapshot: &ReturnSnapshot,
    today: NaiveDate,
    daily_rate: Decimal,
) -> AppResult<ReturnPlan> {
    if snapshot.returned_date.is_some() {
        return Err(AppError::AlreadyReturned(snapshot.loan_id));
    }

    if let Some(fine_id) = snapshot.fine_id {
        return match snapshot.fine_status {
            Some(FineStatus::Paid) => Ok(ReturnPlan::Finalize(ReturnKind::FinePaid { fine_id })),
            Some(status) => Ok(ReturnPlan::Block { fine_id, status }),
            None => Err(AppError::NotFound(format!("Fine with id {} not found", fine_id))),
        };
    }

    let days_late = days_late(snapshot.due_date, today);
    if days_late > 0 {
        Ok(ReturnPlan::ChargeFine {
            days_late,
            amount: fine_amount(days_late, daily_rate),
        })
    } else {
        Ok(ReturnPlan::Finalize(ReturnKind::OnTime))
    }
}

/// Successful return
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReturnReceipt {
    pub loan_id: i32,
    pub returned_date: NaiveDate,
    pub message: String,
    /// Fine that was settled before this return
    pub fine_id: Option<i32>,
}

#[derive(Clone)]
pub struct LoansService {
    store: Arc<dyn CirculationStore>,
    daily_rate: Decimal,
    loan_duration: Duration,
}

impl LoansService {
    pub fn new(store: Arc<dyn CirculationStore>, fines: &FinesConfig, loans: &LoansConfig) -> Self {
        Self {
            store,
            daily_rate: fines.daily_rate,
            loan_duration: Duration::days(loans.duration_days),
        }
    }

    /// List all loans
    pub async fn list_loans(&self) -> AppResult<Vec<LoanDetails>> {
        self.store
            .list_loans()
            .await
            .inspect_err(log_internal_all("list_loans"))
    }

    /// Get a loan by ID
    pub async fn get_loan(&self, loan_id: i32) -> AppResult<LoanDetails> {
        self.store
            .get_loan(loan_id)
            .await
            .and_then(|loan| {
                loan.ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))
            })
            .inspect_err(log_internal("get_loan", loan_id))
    }

    /// Check out a book for a user
    pub async fn create_loan(&self, user_id: i32, book_id: i32) -> AppResult<(i32, NaiveDate)> {
        self.create_loan_on(user_id, book_id, Utc::now().date_naive()).await
    }

    pub async fn create_loan_on(
        &self,
        user_id: i32,
        book_id: i32,
        today: NaiveDate,
    ) -> AppResult<(i32, NaiveDate)> {
        let result = async {
            // Not serialized with the insert below: two checkouts of the last
            // copy can both pass.
            let available = self.store.available_copies(book_id).await?;
            if available.map_or(true, |count| count < 1) {
                return Err(AppError::Unavailable(book_id));
            }

            let due_date = today + self.loan_duration;
            let loan_id = self
                .store
                .create_loan(&CreateLoan {
                    user_id,
                    book_id,
                    loan_date: today,
                    due_date,
                })
                .await?;

            tracing::info!(loan_id, user_id, book_id, %due_date, "Loan created");
            Ok((loan_id, due_date))
        }
        .await;

        result.inspect_err(log_internal("create_loan", book_id))
    }

    /// Process the return of a loan
    pub async fn return_loan(&self, loan_id: i32) -> AppResult<ReturnReceipt> {
        self.return_loan_on(loan_id, Utc::now().date_naive()).await
    }

    pub async fn return_loan_on(&self, loan_id: i32, today: NaiveDate) -> AppResult<ReturnReceipt> {
        let result = async {
            let snapshot = self
                .store
                .return_snapshot(loan_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

            match plan_return(&snapshot, today, self.daily_rate)? {
                ReturnPlan::Block { fine_id, status } => {
                    tracing::info!(loan_id, fine_id, %status, "Return blocked by unpaid fine");
                    Err(AppError::FineBlocking { fine_id, status })
                }
                ReturnPlan::ChargeFine { days_late, amount } => {
                    let fine_id = self
                        .store
                        .attach_fine(&NewFine {
                            loan_id,
                            user_id: snapshot.user_id,
                            amount,
                            days_late: i32::try_from(days_late).map_err(|_| {
                                AppError::Internal(format!("days late out of range: {}", days_late))
                            })?,
                            created_date: today,
                        })
                        .await?;

                    tracing::info!(loan_id, fine_id, days_late, %amount, "Late return fine generated");
                    Err(AppError::FineBlocking {
                        fine_id,
                        status: FineStatus::Pending,
                    })
                }
                ReturnPlan::Finalize(kind) => {
                    self.store.finalize_return(&snapshot, today).await?;

                    tracing::info!(loan_id, book_id = snapshot.book_id, "Return finalized");
                    Ok(ReturnReceipt {
                        loan_id,
                        returned_date: today,
                        message: kind.message(),
                        fine_id: kind.fine_id(),
                    })
                }
            }
        }
        .await;

        result.inspect_err(log_internal("process_return", loan_id))
    }
}
