//! Request authentication via timestamp and hash validation
//!
//! Protected requests carry a `timestamp` (Unix epoch milliseconds) and a
//! `hash` (SHA-256, 64 hex chars). The hash covers the canonical JSON form
//! of the request (hash field zeroed, keys sorted, no whitespace) with the
//! shared secret appended as a decimal string. The secret lives in the
//! `settings` table; the special value 0 disables auth checking entirely.
//!
//! This module contains only pure functions and database operations; the
//! axum middleware lives in the server crate.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(feature = "sqlx")]
use sqlx::SqlitePool;

/// Settings key holding the shared secret
pub const SHARED_SECRET_KEY: &str = "api_shared_secret";

/// Oldest acceptable request timestamp, in milliseconds before now
pub const MAX_TIMESTAMP_AGE_MS: i64 = 1000;

/// Furthest acceptable future timestamp, in milliseconds (clock drift only)
pub const MAX_TIMESTAMP_SKEW_MS: i64 = 1;

const DUMMY_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Authentication failure conditions
#[derive(Debug, Clone)]
pub enum ApiAuthError {
    /// Timestamp outside acceptable window
    InvalidTimestamp {
        timestamp: i64,
        now: i64,
        reason: String,
    },

    /// Hash does not match calculated value
    InvalidHash { provided: String, calculated: String },

    /// Timestamp field missing from request
    MissingTimestamp,

    /// Hash field missing from request
    MissingHash,

    /// Database error loading shared secret
    DatabaseError(String),

    /// Failed to parse request body
    ParseError(String),
}

impl std::fmt::Display for ApiAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiAuthError::InvalidTimestamp { reason, .. } => {
                write!(f, "Invalid timestamp: {}", reason)
            }
            ApiAuthError::InvalidHash { .. } => write!(f, "Invalid hash"),
            ApiAuthError::MissingTimestamp => write!(f, "Missing timestamp field"),
            ApiAuthError::MissingHash => write!(f, "Missing hash field"),
            ApiAuthError::DatabaseError(err) => write!(f, "Database error: {}", err),
            ApiAuthError::ParseError(err) => write!(f, "Parse error: {}", err),
        }
    }
}

impl std::error::Error for ApiAuthError {}

// ========================================
// Shared Secret Management
// ========================================

/// Load the shared secret from the settings table, generating and storing
/// one on first use.
#[cfg(feature = "sqlx")]
pub async fn load_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    let result: Option<(String,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(SHARED_SECRET_KEY)
            .fetch_optional(db)
            .await
            .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    match result {
        Some((value,)) => value
            .parse::<i64>()
            .map_err(|e| ApiAuthError::DatabaseError(format!("Invalid i64: {}", e))),
        None => initialize_shared_secret(db).await,
    }
}

/// Generate a crypto-random nonzero secret and store it
#[cfg(feature = "sqlx")]
pub async fn initialize_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    use rand::Rng;

    let mut rng = rand::thread_rng();
    let secret: i64 = loop {
        let val = rng.gen::<i64>();
        if val != 0 {
            break val;
        }
    };

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(SHARED_SECRET_KEY)
        .bind(secret.to_string())
        .execute(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    Ok(secret)
}

// ========================================
// Timestamp Validation
// ========================================

/// Validate a request timestamp against the acceptance window
///
/// The window is asymmetric: up to [`MAX_TIMESTAMP_AGE_MS`] in the past
/// (processing delay) but only [`MAX_TIMESTAMP_SKEW_MS`] in the future.
pub fn validate_timestamp(timestamp: i64) -> Result<(), ApiAuthError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64;

    let diff = now - timestamp;

    if diff > MAX_TIMESTAMP_AGE_MS {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!("Timestamp {}ms too old (max {}ms past)", diff, MAX_TIMESTAMP_AGE_MS),
        });
    }

    if diff < -MAX_TIMESTAMP_SKEW_MS {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!(
                "Timestamp {}ms in future (max {}ms future)",
                diff.abs(),
                MAX_TIMESTAMP_SKEW_MS
            ),
        });
    }

    Ok(())
}

// ========================================
// Hash Calculation and Validation
// ========================================

/// Calculate the request hash
///
/// 1. Replace the hash field with 64 zeros
/// 2. Convert to canonical JSON (sorted keys, no whitespace)
/// 3. Append the shared secret as a decimal i64 string
/// 4. SHA-256 the concatenation, hex-encoded
pub fn calculate_hash(json_value: &Value, shared_secret: i64) -> String {
    let mut value = json_value.clone();
    if let Some(obj) = value.as_object_mut() {
        obj.insert("hash".to_string(), Value::String(DUMMY_HASH.to_string()));
    }

    let canonical = to_canonical_json(&value);
    let to_hash = format!("{}{}", canonical, shared_secret);

    let mut hasher = Sha256::new();
    hasher.update(to_hash.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Convert JSON to canonical form (sorted keys, no whitespace)
pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<_> = map.iter().collect();
            pairs.sort_by_key(|(k, _)| *k);
            let items: Vec<String> = pairs
                .into_iter()
                .map(|(k, v)| format!("\"{}\":{}", k, to_canonical_json(v)))
                .collect();
            format!("{{{}}}", items.join(","))
        }
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
    }
}

/// Validate the provided hash against the calculated value
pub fn validate_hash(
    provided_hash: &str,
    json_value: &Value,
    shared_secret: i64,
) -> Result<(), ApiAuthError> {
    let calculated = calculate_hash(json_value, shared_secret);

    if provided_hash != calculated {
        return Err(ApiAuthError::InvalidHash {
            provided: provided_hash.to_string(),
            calculated,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as i64
    }

    #[test]
    fn current_and_recent_timestamps_accepted() {
        let now = now_ms();
        assert!(validate_timestamp(now).is_ok());
        assert!(validate_timestamp(now - 500).is_ok());
        assert!(validate_timestamp(now - MAX_TIMESTAMP_AGE_MS).is_ok());
    }

    #[test]
    fn stale_timestamp_rejected() {
        let now = now_ms();
        assert!(validate_timestamp(now - MAX_TIMESTAMP_AGE_MS - 100).is_err());
    }

    #[test]
    fn future_timestamp_rejected() {
        let now = now_ms();
        assert!(validate_timestamp(now + 100).is_err());
    }

    #[test]
    fn hash_is_deterministic_and_secret_dependent() {
        let body = json!({
            "name": "EQ-5D translation",
            "timestamp": 1730000000000i64,
            "hash": "dummy"
        });

        let hash = calculate_hash(&body, 123456789);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, calculate_hash(&body, 123456789));
        assert_ne!(hash, calculate_hash(&body, 987654321));
    }

    #[test]
    fn hash_ignores_provided_hash_field() {
        let secret = 42;
        let a = json!({"name": "x", "hash": "aaaa"});
        let b = json!({"name": "x", "hash": "bbbb"});
        assert_eq!(calculate_hash(&a, secret), calculate_hash(&b, secret));
    }

    #[test]
    fn canonical_json_sorts_keys_without_whitespace() {
        let value = json!({"z": 3, "a": 1, "m": 2});
        let canonical = to_canonical_json(&value);
        assert_eq!(canonical, "{\"a\":1,\"m\":2,\"z\":3}");
    }

    #[test]
    fn canonical_json_escapes_strings() {
        let value = json!({"text": "say \"yes\"\\no"});
        let canonical = to_canonical_json(&value);
        assert!(canonical.contains("say \\\"yes\\\"\\\\no"));
    }

    #[test]
    fn correct_hash_validates_wrong_hash_rejected() {
        let body = json!({"name": "x", "timestamp": 1730000000000i64, "hash": "dummy"});
        let secret = 123456789;
        let good = calculate_hash(&body, secret);
        assert!(validate_hash(&good, &body, secret).is_ok());
        assert!(validate_hash(DUMMY_HASH, &body, secret).is_err());
    }
}
