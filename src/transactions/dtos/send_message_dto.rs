use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors};

// Rendering of a date that was never sent.
static ZERO_DATE: &str = "0001-01-01T00:00:00";

static FIELDS: [&str; 7] = [
    "TransactionId",
    "UserId",
    "ProductId",
    "TransactionDate",
    "TransactionTotalPrice",
    "TransactionPaymentMethod",
    "TransactionStatus",
];

/// The transaction fields the queue message is built from. Table storage
/// metadata (PartitionKey, RowKey, ETag, Timestamp) is ignored.
///
/// Integer and date fields may be absent but not `null`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct SendMessageDto {
    #[serde(default, deserialize_with = "non_null")]
    pub transaction_id: Option<i32>,
    #[validate(required(message = "User is required."))]
    #[serde(default, deserialize_with = "non_null")]
    pub user_id: Option<i32>,
    #[validate(required(message = "Product ID is required."))]
    #[serde(default, deserialize_with = "non_null")]
    pub product_id: Option<i32>,
    #[validate(required(message = "Transaction date is required."))]
    #[serde(default, deserialize_with = "deserialize_transaction_date")]
    pub transaction_date: Option<NaiveDateTime>,
    pub transaction_total_price: Option<f64>,
    #[validate(required(message = "Payment method is required."))]
    pub transaction_payment_method: Option<String>,
    pub transaction_status: Option<String>,
}

impl SendMessageDto {
    /// Parses a request body, matching property names case-insensitively.
    /// A `null` body yields `None`.
    pub fn from_json(body: &[u8]) -> Result<Option<SendMessageDto>, serde_json::Error> {
        let value = match serde_json::from_slice::<Value>(body)? {
            Value::Object(object) => Value::Object(canonicalize_keys(object)),
            other => other,
        };

        serde_json::from_value(value)
    }

    pub fn message(&self) -> String {
        let transaction_date = match &self.transaction_date {
            Some(date) => date.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            None => ZERO_DATE.to_string(),
        };

        format!(
            "New transaction by User {} of Product {} on {}",
            self.user_id.unwrap_or_default(),
            self.product_id.unwrap_or_default(),
            transaction_date
        )
    }
}

pub fn validation_messages(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|field| field.iter())
        .map(|e| match &e.message {
            Some(message) => message.to_string(),
            None => e.code.to_string(),
        })
        .collect();
    messages.sort();

    messages.join(" ")
}

fn canonicalize_keys(object: Map<String, Value>) -> Map<String, Value> {
    object
        .into_iter()
        .map(|(key, value)| {
            match FIELDS.iter().find(|field| field.eq_ignore_ascii_case(&key)) {
                Some(field) => (field.to_string(), value),
                None => (key, value),
            }
        })
        .collect()
}

fn non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn deserialize_transaction_date<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;

    match parse_transaction_date(&value) {
        Some(date) => Ok(Some(date)),
        None => Err(serde::de::Error::custom(format!(
            "invalid TransactionDate: {}",
            value
        ))),
    }
}

/// Accepts local date-times, RFC 3339 (normalized to UTC) and bare dates.
fn parse_transaction_date(value: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = value.parse::<NaiveDateTime>() {
        return Some(date);
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.naive_utc());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
