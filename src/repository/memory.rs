//! In-memory circulation store for unit tests

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::CirculationStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookLoanCount, BookShort},
        fine::{Fine, FineSettlement, FineStatus, LoanFineRef, NewFine},
        loan::{CreateLoan, Loan, LoanDetails, LoanState, OverdueLoanRow, ReturnSnapshot},
        user::UserShort,
    },
};

#[derive(Default)]
struct State {
    users: BTreeMap<i32, String>,
    books: BTreeMap<i32, Book>,
    loans: BTreeMap<i32, Loan>,
    fines: BTreeMap<i32, Fine>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, id: i32, name: &str) -> Self {
        self.state.lock().unwrap().users.insert(id, name.to_string());
        self
    }

    pub fn with_book(self, id: i32, title: &str, total_copies: i32, available_copies: i32) -> Self {
        self.state.lock().unwrap().books.insert(
            id,
            Book {
                id,
                title: title.to_string(),
                total_copies,
                available_copies,
            },
        );
        self
    }

    /// Make every following write fail as if the database went away
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn book(&self, id: i32) -> Option<Book> {
        self.state.lock().unwrap().books.get(&id).cloned()
    }

    pub fn loan(&self, id: i32) -> Option<Loan> {
        self.state.lock().unwrap().loans.get(&id).cloned()
    }

    pub fn fines_for_loan(&self, loan_id: i32) -> Vec<Fine> {
        let state = self.state.lock().unwrap();
        state.fines.values().filter(|f| f.loan_id == loan_id).cloned().collect()
    }

    pub fn loan_count(&self) -> usize {
        self.state.lock().unwrap().loans.len()
    }

    fn check_writable(&self) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("injected write failure".to_string()));
        }
        Ok(())
    }
}

impl State {
    fn fine_status(&self, fine_id: Option<i32>) -> Option<FineStatus> {
        fine_id.and_then(|id| self.fines.get(&id)).map(|f| f.status)
    }

    fn details(&self, loan: &Loan) -> LoanDetails {
        let fine = loan.fine_id.and_then(|id| self.fines.get(&id));
        let fine_status = fine.map(|f| f.status);
        LoanDetails {
            id: loan.id,
            user: UserShort {
                id: loan.user_id,
                name: self.users.get(&loan.user_id).cloned().unwrap_or_default(),
            },
            book: BookShort {
                id: loan.book_id,
                title: self
                    .books
                    .get(&loan.book_id)
                    .map(|b| b.title.clone())
                    .unwrap_or_default(),
            },
            loan_date: loan.loan_date,
            due_date: loan.due_date,
            returned_date: loan.returned_date,
            fine_id: loan.fine_id,
            fine_status,
            fine_amount: fine.map(|f| f.amount),
            state: LoanState::of(loan.returned_date, fine_status),
        }
    }
}

#[async_trait]
impl CirculationStore for MemoryStore {
    async fn available_copies(&self, book_id: i32) -> AppResult<Option<i32>> {
        let state = self.state.lock().unwrap();
        Ok(state.books.get(&book_id).map(|b| b.available_copies))
    }

    async fn create_loan(&self, loan: &CreateLoan) -> AppResult<i32> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        if !state.users.contains_key(&loan.user_id) || !state.books.contains_key(&loan.book_id) {
            return Err(AppError::NotFound(format!(
                "User {} or book {} not found",
                loan.user_id, loan.book_id
            )));
        }

        let id = state.loans.keys().next_back().map_or(1, |k| k + 1);
        state.loans.insert(
            id,
            Loan {
                id,
                user_id: loan.user_id,
                book_id: loan.book_id,
                loan_date: loan.loan_date,
                due_date: loan.due_date,
                returned_date: None,
                fine_id: None,
            },
        );
        if let Some(book) = state.books.get_mut(&loan.book_id) {
            book.available_copies = (book.available_copies - 1).max(0);
        }
        Ok(id)
    }

    async fn list_loans(&self) -> AppResult<Vec<LoanDetails>> {
        let state = self.state.lock().unwrap();
        Ok(state.loans.values().map(|l| state.details(l)).collect())
    }

    async fn get_loan(&self, loan_id: i32) -> AppResult<Option<LoanDetails>> {
        let state = self.state.lock().unwrap();
        Ok(state.loans.get(&loan_id).map(|l| state.details(l)))
    }

    async fn return_snapshot(&self, loan_id: i32) -> AppResult<Option<ReturnSnapshot>> {
        let state = self.state.lock().unwrap();
        Ok(state.loans.get(&loan_id).map(|l| ReturnSnapshot {
            loan_id: l.id,
            user_id: l.user_id,
            book_id: l.book_id,
            due_date: l.due_date,
            returned_date: l.returned_date,
            fine_id: l.fine_id,
            fine_status: state.fine_status(l.fine_id),
        }))
    }

    async fn attach_fine(&self, fine: &NewFine) -> AppResult<i32> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let attachable = state
            .loans
            .get(&fine.loan_id)
            .map_or(false, |l| l.fine_id.is_none() && l.returned_date.is_none());
        if !attachable {
            return Err(AppError::Conflict(format!(
                "Loan {} already has a fine attached",
                fine.loan_id
            )));
        }

        let id = state.fines.keys().next_back().map_or(1, |k| k + 1);
        state.fines.insert(
            id,
            Fine {
                id,
                loan_id: fine.loan_id,
                user_id: fine.user_id,
                amount: fine.amount,
                days_late: fine.days_late,
                status: FineStatus::Pending,
                created_date: fine.created_date,
                paid_date: None,
            },
        );
        if let Some(loan) = state.loans.get_mut(&fine.loan_id) {
            loan.fine_id = Some(id);
        }
        Ok(id)
    }

    async fn finalize_return(
        &self,
        snapshot: &ReturnSnapshot,
        returned_date: NaiveDate,
    ) -> AppResult<()> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let fine_paid = state.fine_status(snapshot.fine_id).map_or(true, |s| s == FineStatus::Paid);
        let loan = state
            .loans
            .get_mut(&snapshot.loan_id)
            .filter(|l| l.returned_date.is_none() && l.fine_id == snapshot.fine_id && fine_paid)
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "Loan {} changed while its return was being recorded",
                    snapshot.loan_id
                ))
            })?;
        loan.returned_date = Some(returned_date);

        if let Some(book) = state.books.get_mut(&snapshot.book_id) {
            book.available_copies = (book.available_copies + 1).min(book.total_copies);
        }
        Ok(())
    }

    async fn settle_fine(&self, loan_id: i32, settlement: FineSettlement) -> AppResult<Fine> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let loan = state
            .loans
            .get(&loan_id)
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;
        let fine_id = LoanFineRef {
            loan_id,
            fine_id: loan.fine_id,
            status: state.fine_status(loan.fine_id),
        }
        .settleable_fine()?;

        let fine = state
            .fines
            .get_mut(&fine_id)
            .ok_or_else(|| AppError::NotFound(format!("Fine with id {} not found", fine_id)))?;
        fine.status = settlement.status();
        fine.paid_date = settlement.paid_date();
        Ok(fine.clone())
    }

    async fn overdue_loans(&self, today: NaiveDate) -> AppResult<Vec<OverdueLoanRow>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<OverdueLoanRow> = state
            .loans
            .values()
            .filter(|l| l.returned_date.is_none() && l.due_date < today)
            .map(|l| {
                let details = state.details(l);
                OverdueLoanRow {
                    loan_id: l.id,
                    user_id: l.user_id,
                    user_name: details.user.name,
                    book_id: l.book_id,
                    book_title: details.book.title,
                    due_date: l.due_date,
                    fine_id: l.fine_id,
                    fine_status: details.fine_status,
                }
            })
            .collect();
        rows.sort_by_key(|r| (r.due_date, r.loan_id));
        Ok(rows)
    }

    async fn count_loans(&self) -> AppResult<i64> {
        Ok(self.state.lock().unwrap().loans.len() as i64)
    }

    async fn most_borrowed_books(&self, limit: i64) -> AppResult<Vec<BookLoanCount>> {
        let state = self.state.lock().unwrap();
        let mut counts: BTreeMap<i32, i64> = BTreeMap::new();
        for loan in state.loans.values() {
            *counts.entry(loan.book_id).or_default() += 1;
        }

        let mut rows: Vec<BookLoanCount> = counts
            .into_iter()
            .filter_map(|(book_id, loans)| {
                state.books.get(&book_id).map(|b| BookLoanCount {
                    book_id,
                    title: b.title.clone(),
                    loans,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.loans.cmp(&a.loans).then_with(|| a.title.cmp(&b.title)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
