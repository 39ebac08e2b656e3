//! Routes for the expense ledger and its derived summaries.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use db::models::expense::{
    CreateExpense, CreateExpenseCategory, Expense, ExpenseCategory, ExpenseType,
};
use serde::{Deserialize, Serialize};
use services::services::expense_stats::{
    CategoryTotal, LedgerSummary, TimeWindow, filter_window, percentage, summarize,
    totals_by_category,
};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize, TS)]
pub struct UserScopedQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize, TS)]
pub struct ExpensePageQuery {
    pub user_id: Uuid,
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
pub struct SummaryQuery {
    pub user_id: Uuid,
    /// "all" (default), "7days", "month", or "range".
    pub window: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl SummaryQuery {
    fn time_window(&self) -> TimeWindow {
        match self.window.as_deref() {
            Some("7days") => TimeWindow::Last7Days,
            Some("month") => TimeWindow::ThisMonth,
            Some("range") => TimeWindow::Range {
                from: self.from,
                to: self.to,
            },
            _ => TimeWindow::All,
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct ExpensePageResponse {
    pub items: Vec<Expense>,
    pub total_count: i64,
    pub page: i64,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct CategoryBreakdown {
    pub name: String,
    pub color: String,
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct SummaryResponse {
    pub summary: LedgerSummary,
    pub expense_categories: Vec<CategoryBreakdown>,
    pub income_categories: Vec<CategoryBreakdown>,
}

fn breakdown(totals: Vec<CategoryTotal>, total: f64) -> Vec<CategoryBreakdown> {
    totals
        .into_iter()
        .map(|t| CategoryBreakdown {
            percentage: percentage(t.amount, total),
            name: t.name,
            color: t.color,
            amount: t.amount,
        })
        .collect()
}

/// GET /api/expense-categories?user_id=...
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<UserScopedQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ExpenseCategory>>>, ApiError> {
    let categories = ExpenseCategory::find_by_user_id(&state.pool, query.user_id).await?;
    Ok(ResponseJson(ApiResponse::success(categories)))
}

/// POST /api/expense-categories
pub async fn create_category(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateExpenseCategory>,
) -> Result<ResponseJson<ApiResponse<ExpenseCategory>>, ApiError> {
    let category = ExpenseCategory::create(&state.pool, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(category)))
}

/// DELETE /api/expense-categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = ExpenseCategory::delete(&state.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("expense category"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// GET /api/expenses?user_id=...&page=0
/// Fixed pages of twelve, newest first.
pub async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<ExpensePageQuery>,
) -> Result<ResponseJson<ApiResponse<ExpensePageResponse>>, ApiError> {
    let page = Expense::find_page(&state.pool, query.user_id, query.page.unwrap_or(0)).await?;
    let has_more = page.has_more();
    Ok(ResponseJson(ApiResponse::success(ExpensePageResponse {
        has_more,
        items: page.items,
        total_count: page.total_count,
        page: page.page,
    })))
}

/// POST /api/expenses
pub async fn create_expense(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateExpense>,
) -> Result<ResponseJson<ApiResponse<Expense>>, ApiError> {
    let expense = Expense::create(&state.pool, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(expense)))
}

/// DELETE /api/expenses/{id}
pub async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Expense::delete(&state.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("expense"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// GET /api/expenses/summary?user_id=...&window=7days
/// Totals and per-category breakdowns over the requested time window,
/// recomputed from the full ledger on every call.
pub async fn expense_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<ResponseJson<ApiResponse<SummaryResponse>>, ApiError> {
    let rows = Expense::summary_rows(&state.pool, query.user_id).await?;
    let rows = filter_window(&rows, query.time_window(), Utc::now().date_naive());

    let summary = summarize(&rows);
    let expense_categories = breakdown(
        totals_by_category(&rows, ExpenseType::Expense),
        summary.total_expenses,
    );
    let income_categories = breakdown(
        totals_by_category(&rows, ExpenseType::Income),
        summary.total_income,
    );

    Ok(ResponseJson(ApiResponse::success(SummaryResponse {
        summary,
        expense_categories,
        income_categories,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/expense-categories",
            get(list_categories).post(create_category),
        )
        .route("/expense-categories/{id}", axum::routing::delete(delete_category))
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/summary", get(expense_summary))
        .route("/expenses/{id}", axum::routing::delete(delete_expense))
}
