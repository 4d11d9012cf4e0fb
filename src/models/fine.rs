//! Fine ledger model and payment rules

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{book::BookShort, user::UserShort};
use crate::error::{AppError, AppResult};

/// Fine status. Only `Pending` can move, to `Paid` or `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "fine_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FineStatus {
    Pending,
    Paid,
    Cancelled,
}

impl std::fmt::Display for FineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FineStatus::Pending => "pending",
            FineStatus::Paid => "paid",
            FineStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", label)
    }
}

/// Fine ledger entry from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Fine {
    pub id: i32,
    pub loan_id: i32,
    pub user_id: i32,
    pub amount: Decimal,
    pub days_late: i32,
    pub status: FineStatus,
    pub created_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
}

/// New fine generated by a late return
#[derive(Debug, Clone, PartialEq)]
pub struct NewFine {
    pub loan_id: i32,
    pub user_id: i32,
    pub amount: Decimal,
    pub days_late: i32,
    pub created_date: NaiveDate,
}

/// Terminal transition applied to a pending fine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FineSettlement {
    Paid(NaiveDate),
    Cancelled,
}

impl FineSettlement {
    pub fn status(&self) -> FineStatus {
        match self {
            FineSettlement::Paid(_) => FineStatus::Paid,
            FineSettlement::Cancelled => FineStatus::Cancelled,
        }
    }

    pub fn paid_date(&self) -> Option<NaiveDate> {
        match self {
            FineSettlement::Paid(date) => Some(*date),
            FineSettlement::Cancelled => None,
        }
    }
}

/// Fine reference of a loan as read inside a payment transaction
#[derive(Debug, Clone, Copy, FromRow)]
pub struct LoanFineRef {
    pub loan_id: i32,
    pub fine_id: Option<i32>,
    pub status: Option<FineStatus>,
}

impl LoanFineRef {
    /// Returns the fine id if the attached fine can be settled (paid or cancelled)
    pub fn settleable_fine(&self) -> AppResult<i32> {
        let fine_id = self
            .fine_id
            .ok_or(AppError::NoFineAttached(self.loan_id))?;

        match self.status {
            Some(FineStatus::Pending) => Ok(fine_id),
            Some(FineStatus::Paid) => Err(AppError::AlreadyPaid(fine_id)),
            Some(FineStatus::Cancelled) => Err(AppError::FineCancelled(fine_id)),
            None => Err(AppError::NotFound(format!("Fine with id {} not found", fine_id))),
        }
    }
}

/// Overdue loan with its computed fine, for the fines desk
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FineView {
    pub loan_id: i32,
    pub user: UserShort,
    pub book: BookShort,
    pub due_date: NaiveDate,
    pub days_late: i64,
    pub amount: Decimal,
    pub fine_id: Option<i32>,
    pub fine_status: Option<FineStatus>,
    pub paid: bool,
}

/// Days between due date and the return date, floored at zero
pub fn days_late(due_date: NaiveDate, today: NaiveDate) -> i64 {
    (today - due_date).num_days().max(0)
}

/// Fine amount for a number of late days
pub fn fine_amount(days_late: i64, daily_rate: Decimal) -> Decimal {
    (Decimal::from(days_late) * daily_rate).round_dp(2)
}
