use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use super::immersion::ImmersionData;

const COLUMNS: &str = "id, user_id, product_name, country, price, status, problems, \
     target_customers, warranty, promotion, uniqueness, immersion_data, created_at, updated_at";

/// How many non-empty problem statements a client must carry before any save.
pub const MIN_PROBLEMS: usize = 3;

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "client_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClientStatus {
    #[default]
    Active,
    InProgress,
    Completed,
    OnHold,
}

/// A product/offer being marketed. `problems` and `immersion_data` are
/// JSON-serialized TEXT columns; use [`Client::problems`] and
/// [`Client::parsed_immersion`] to read them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Client {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_name: String,
    pub country: String,
    pub price: String,
    pub status: ClientStatus,
    pub problems: String,
    pub target_customers: String,
    pub warranty: String,
    pub promotion: String,
    pub uniqueness: String,
    pub immersion_data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Per-field validation failures, collected before any store call is issued.
#[derive(Debug, Clone, Serialize, Error, TS)]
#[error("validation failed for {} field(s)", .fields.len())]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateClient {
    pub user_id: Uuid,
    pub product_name: String,
    pub country: String,
    pub price: String,
    pub status: Option<ClientStatus>,
    pub problems: Vec<String>,
    pub target_customers: String,
    pub warranty: String,
    pub promotion: String,
    pub uniqueness: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateClient {
    pub product_name: String,
    pub country: String,
    pub price: String,
    pub status: Option<ClientStatus>,
    pub problems: Vec<String>,
    pub target_customers: String,
    pub warranty: String,
    pub promotion: String,
    pub uniqueness: String,
}

fn validate_fields(
    product_name: &str,
    country: &str,
    price: &str,
    problems: &[String],
    target_customers: &str,
    warranty: &str,
    promotion: &str,
    uniqueness: &str,
) -> Result<(), ValidationErrors> {
    let mut fields = Vec::new();
    let mut require = |field: &str, value: &str, message: &str| {
        if value.trim().is_empty() {
            fields.push(FieldError {
                field: field.to_string(),
                message: message.to_string(),
            });
        }
    };

    require("product_name", product_name, "product name is required");
    require("country", country, "country is required");
    require("price", price, "price is required");
    require(
        "target_customers",
        target_customers,
        "target customers are required",
    );
    require("warranty", warranty, "warranty is required");
    require("promotion", promotion, "promotion is required");
    require("uniqueness", uniqueness, "uniqueness is required");

    let valid_problems = problems.iter().filter(|p| !p.trim().is_empty()).count();
    if valid_problems < MIN_PROBLEMS {
        fields.push(FieldError {
            field: "problems".to_string(),
            message: format!("at least {MIN_PROBLEMS} problem statements are required"),
        });
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { fields })
    }
}

fn non_empty_problems(problems: &[String]) -> Vec<String> {
    problems
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(|p| p.trim().to_string())
        .collect()
}

fn encode_json<T: Serialize>(value: &T) -> Result<String, sqlx::Error> {
    serde_json::to_string(value).map_err(|e| sqlx::Error::Protocol(e.to_string()))
}

impl CreateClient {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_fields(
            &self.product_name,
            &self.country,
            &self.price,
            &self.problems,
            &self.target_customers,
            &self.warranty,
            &self.promotion,
            &self.uniqueness,
        )
    }
}

impl UpdateClient {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_fields(
            &self.product_name,
            &self.country,
            &self.price,
            &self.problems,
            &self.target_customers,
            &self.warranty,
            &self.promotion,
            &self.uniqueness,
        )
    }
}

impl Client {
    /// The stored problem statements, parsed from their JSON column.
    pub fn problems(&self) -> Vec<String> {
        serde_json::from_str(&self.problems).unwrap_or_default()
    }

    /// Parse the stored immersion report, if any.
    pub fn parsed_immersion(&self) -> Option<ImmersionData> {
        self.immersion_data
            .as_ref()
            .and_then(|json| serde_json::from_str(json).ok())
    }

    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM clients WHERE user_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Client>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateClient,
        client_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let status = data.status.clone().unwrap_or_default();
        let problems = encode_json(&non_empty_problems(&data.problems))?;
        let query = format!(
            "INSERT INTO clients (id, user_id, product_name, country, price, status, problems, \
                                  target_customers, warranty, promotion, uniqueness) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(client_id)
            .bind(data.user_id)
            .bind(&data.product_name)
            .bind(&data.country)
            .bind(&data.price)
            .bind(status)
            .bind(problems)
            .bind(&data.target_customers)
            .bind(&data.warranty)
            .bind(&data.promotion)
            .bind(&data.uniqueness)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateClient,
    ) -> Result<Self, sqlx::Error> {
        let status = data.status.clone().unwrap_or_default();
        let problems = encode_json(&non_empty_problems(&data.problems))?;
        let query = format!(
            "UPDATE clients \
             SET product_name = $2, country = $3, price = $4, status = $5, problems = $6, \
                 target_customers = $7, warranty = $8, promotion = $9, uniqueness = $10, \
                 updated_at = CURRENT_TIMESTAMP \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(&data.product_name)
            .bind(&data.country)
            .bind(&data.price)
            .bind(status)
            .bind(problems)
            .bind(&data.target_customers)
            .bind(&data.warranty)
            .bind(&data.promotion)
            .bind(&data.uniqueness)
            .fetch_one(pool)
            .await
    }

    /// Replace the stored immersion report wholesale (or clear it with
    /// `None`). A single UPDATE, so no intermediate state is observable.
    pub async fn set_immersion(
        pool: &SqlitePool,
        id: Uuid,
        report: Option<&ImmersionData>,
    ) -> Result<(), sqlx::Error> {
        let json = match report {
            Some(report) => Some(encode_json(report)?),
            None => None,
        };
        sqlx::query(
            "UPDATE clients SET immersion_data = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .bind(json)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
