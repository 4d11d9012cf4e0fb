//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::book::BookLoanCount};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get the available-copy count of a book
    pub async fn available_copies(&self, book_id: i32) -> AppResult<Option<i32>> {
        let available = sqlx::query_scalar::<_, i32>(
            "SELECT available_copies FROM books WHERE id = $1",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(available)
    }

    /// Titles with the most loans, returned ones included
    pub async fn most_borrowed(&self, limit: i64) -> AppResult<Vec<BookLoanCount>> {
        let rows = sqlx::query_as::<_, BookLoanCount>(
            r#"
            SELECT b.id AS book_id, b.title, COUNT(l.id) AS loans
            FROM loans l
            JOIN books b ON b.id = l.book_id
            GROUP BY b.id, b.title
            ORDER BY loans DESC, b.title
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
