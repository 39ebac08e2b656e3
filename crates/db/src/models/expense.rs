use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Expenses load in fixed-size pages, concatenated client-side on demand.
pub const PAGE_SIZE: i64 = 12;

const COLUMNS: &str = "e.id, e.user_id, e.category_id, e.amount, e.date, e.expense_type, \
     e.description, e.created_at, c.name AS category_name, c.color AS category_color";

const JOIN: &str = "expenses e LEFT JOIN expense_categories c ON e.category_id = c.id";

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "expense_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExpenseType {
    #[default]
    Expense,
    Income,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ExpenseCategory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateExpenseCategory {
    pub user_id: Uuid,
    pub name: String,
    pub color: String,
}

/// One ledger row, with its category name/color joined in for display.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub amount: f64,
    pub date: NaiveDate,
    pub expense_type: ExpenseType,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateExpense {
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub amount: f64,
    pub date: NaiveDate,
    pub expense_type: Option<ExpenseType>,
    pub description: Option<String>,
}

/// One page of the ledger, newest first, plus the total row count so callers
/// can keep requesting pages until the sequence is complete.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ExpensePage {
    pub items: Vec<Expense>,
    pub total_count: i64,
    pub page: i64,
}

impl ExpensePage {
    pub fn has_more(&self) -> bool {
        (self.page + 1) * PAGE_SIZE < self.total_count
    }
}

/// Lightweight projection used for aggregation: amounts, dates, types, and
/// category labels only.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ExpenseSummaryRow {
    pub amount: f64,
    pub date: NaiveDate,
    pub expense_type: ExpenseType,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
}

impl ExpenseCategory {
    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ExpenseCategory>(
            "SELECT id, user_id, name, color, created_at FROM expense_categories \
             WHERE user_id = $1 ORDER BY name",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateExpenseCategory,
        category_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ExpenseCategory>(
            "INSERT INTO expense_categories (id, user_id, name, color) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, user_id, name, color, created_at",
        )
        .bind(category_id)
        .bind(data.user_id)
        .bind(&data.name)
        .bind(&data.color)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM expense_categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl Expense {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {JOIN} WHERE e.id = $1");
        sqlx::query_as::<_, Expense>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One fixed-size page, newest date first.
    pub async fn find_page(
        pool: &SqlitePool,
        user_id: Uuid,
        page: i64,
    ) -> Result<ExpensePage, sqlx::Error> {
        let total_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM expenses WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM {JOIN} WHERE e.user_id = $1 \
             ORDER BY e.date DESC, e.created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, Expense>(&query)
            .bind(user_id)
            .bind(PAGE_SIZE)
            .bind(page * PAGE_SIZE)
            .fetch_all(pool)
            .await?;

        Ok(ExpensePage {
            items,
            total_count,
            page,
        })
    }

    /// Every row for the user, projected down to what aggregation needs.
    pub async fn summary_rows(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<ExpenseSummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, ExpenseSummaryRow>(
            "SELECT e.amount, e.date, e.expense_type, \
                    c.name AS category_name, c.color AS category_color \
             FROM expenses e LEFT JOIN expense_categories c ON e.category_id = c.id \
             WHERE e.user_id = $1",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateExpense,
        expense_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let expense_type = data.expense_type.unwrap_or_default();
        sqlx::query(
            "INSERT INTO expenses (id, user_id, category_id, amount, date, expense_type, description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(expense_id)
        .bind(data.user_id)
        .bind(data.category_id)
        .bind(data.amount)
        .bind(data.date)
        .bind(expense_type)
        .bind(&data.description)
        .execute(pool)
        .await?;

        // Re-read through the join so the category labels come back populated.
        Self::find_by_id(pool, expense_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::MIGRATOR.run(&pool).await.unwrap();
        pool
    }

    fn entry(user_id: Uuid, amount: f64, day: u32) -> CreateExpense {
        CreateExpense {
            user_id,
            category_id: None,
            amount,
            date: NaiveDate::from_ymd_opt(2025, 7, day).unwrap(),
            expense_type: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn pages_are_fixed_size_with_total_count() {
        let pool = test_pool().await;
        let user_id = Uuid::new_v4();
        for day in 1..=15 {
            Expense::create(&pool, &entry(user_id, day as f64, day), Uuid::new_v4())
                .await
                .unwrap();
        }

        let first = Expense::find_page(&pool, user_id, 0).await.unwrap();
        assert_eq!(first.items.len(), PAGE_SIZE as usize);
        assert_eq!(first.total_count, 15);
        assert!(first.has_more());
        // Newest date first.
        assert_eq!(first.items[0].date, NaiveDate::from_ymd_opt(2025, 7, 15).unwrap());

        let second = Expense::find_page(&pool, user_id, 1).await.unwrap();
        assert_eq!(second.items.len(), 3);
        assert!(!second.has_more());
    }

    #[tokio::test]
    async fn create_joins_category_labels() {
        let pool = test_pool().await;
        let user_id = Uuid::new_v4();
        let category = ExpenseCategory::create(
            &pool,
            &CreateExpenseCategory {
                user_id,
                name: "Food".to_string(),
                color: "#ff0000".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let mut data = entry(user_id, 9.5, 3);
        data.category_id = Some(category.id);
        let expense = Expense::create(&pool, &data, Uuid::new_v4()).await.unwrap();
        assert_eq!(expense.category_name.as_deref(), Some("Food"));
        assert_eq!(expense.category_color.as_deref(), Some("#ff0000"));
        assert_eq!(expense.expense_type, ExpenseType::Expense);
    }
}
