//! Loan statistics service

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::book::BookLoanCount, repository::CirculationStore};

use super::log_internal_all;

const TOP_BOOKS: i64 = 5;

/// Loan report for the circulation desk
#[derive(Debug, Serialize, ToSchema)]
pub struct LoanReport {
    pub total_loans: i64,
    pub most_borrowed: Vec<BookLoanCount>,
}

#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn CirculationStore>,
}

impl StatsService {
    pub fn new(store: Arc<dyn CirculationStore>) -> Self {
        Self { store }
    }

    /// Total loans and most borrowed titles
    pub async fn loan_report(&self) -> AppResult<LoanReport> {
        let total_loans = self
            .store
            .count_loans()
            .await
            .inspect_err(log_internal_all("loan_report"))?;
        let most_borrowed = self
            .store
            .most_borrowed_books(TOP_BOOKS)
            .await
            .inspect_err(log_internal_all("loan_report"))?;

        Ok(LoanReport {
            total_loans,
            most_borrowed,
        })
    }
}
