//! Loan model and related types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{book::BookShort, fine::FineStatus, user::UserShort};

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned_date: Option<NaiveDate>,
    pub fine_id: Option<i32>,
}

/// Lifecycle state of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanState {
    Active,
    FineBlocked,
    Returned,
}

impl LoanState {
    pub fn of(returned_date: Option<NaiveDate>, fine_status: Option<FineStatus>) -> Self {
        match (returned_date, fine_status) {
            (Some(_), _) => LoanState::Returned,
            (None, Some(FineStatus::Pending)) | (None, Some(FineStatus::Cancelled)) => {
                LoanState::FineBlocked
            }
            (None, _) => LoanState::Active,
        }
    }
}

/// Loan with borrower, book and fine for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub user: UserShort,
    pub book: BookShort,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned_date: Option<NaiveDate>,
    pub fine_id: Option<i32>,
    pub fine_status: Option<FineStatus>,
    pub fine_amount: Option<Decimal>,
    pub state: LoanState,
}

/// Flat row behind [`LoanDetails`]
#[derive(Debug, Clone, FromRow)]
pub struct LoanDetailsRow {
    pub id: i32,
    pub user_id: i32,
    pub user_name: String,
    pub book_id: i32,
    pub book_title: String,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned_date: Option<NaiveDate>,
    pub fine_id: Option<i32>,
    pub fine_status: Option<FineStatus>,
    pub fine_amount: Option<Decimal>,
}

impl From<LoanDetailsRow> for LoanDetails {
    fn from(row: LoanDetailsRow) -> Self {
        Self {
            id: row.id,
            user: UserShort {
                id: row.user_id,
                name: row.user_name,
            },
            book: BookShort {
                id: row.book_id,
                title: row.book_title,
            },
            loan_date: row.loan_date,
            due_date: row.due_date,
            returned_date: row.returned_date,
            fine_id: row.fine_id,
            fine_status: row.fine_status,
            fine_amount: row.fine_amount,
            state: LoanState::of(row.returned_date, row.fine_status),
        }
    }
}

/// Create loan command
#[derive(Debug, Clone, PartialEq)]
pub struct CreateLoan {
    pub user_id: i32,
    pub book_id: i32,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
}

/// What a return needs to know about a loan
#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct ReturnSnapshot {
    pub loan_id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub due_date: NaiveDate,
    pub returned_date: Option<NaiveDate>,
    pub fine_id: Option<i32>,
    pub fine_status: Option<FineStatus>,
}

/// Overdue open loan as read for the fines desk
#[derive(Debug, Clone, FromRow)]
pub struct OverdueLoanRow {
    pub loan_id: i32,
    pub user_id: i32,
    pub user_name: String,
    pub book_id: i32,
    pub book_title: String,
    pub due_date: NaiveDate,
    pub fine_id: Option<i32>,
    pub fine_status: Option<FineStatus>,
}
