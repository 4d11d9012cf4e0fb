//! Data models for Biblioteca

pub mod book;
pub mod fine;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookShort};
pub use fine::{Fine, FineStatus, FineView};
pub use loan::{Loan, LoanDetails, LoanState};
pub use user::{Principal, UserShort};
