use axum::http::HeaderMap;
use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::app::{env::Envy, errors::DefaultApiError, models::api_error::ApiError};

pub static FUNCTION_KEY_HEADER: &str = "x-functions-key";

#[derive(Debug, Default, Deserialize)]
pub struct FunctionKeyQuery {
    pub code: Option<String>,
}

/// Checks the shared function key, taken from the `x-functions-key` header or
/// the `code` query parameter. Without a configured key every request is
/// refused unless `AUTH_DISABLED=true`.
pub fn authorize(headers: &HeaderMap, query: &FunctionKeyQuery, envy: &Envy) -> Result<(), ApiError> {
    let Some(expected) = envy.function_key() else {
        if envy.auth_disabled() {
            return Ok(());
        }

        tracing::error!("FUNCTION_KEY is not configured and AUTH_DISABLED is not set.");
        return Err(DefaultApiError::PermissionDenied.value());
    };

    let from_header = headers
        .get(FUNCTION_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    let presented = from_header.or(query.code.as_deref());

    match presented {
        Some(key) if keys_match(key, expected) => Ok(()),
        _ => {
            tracing::warn!("rejected request with missing or invalid function key");
            Err(DefaultApiError::PermissionDenied.value())
        }
    }
}

fn keys_match(presented: &str, expected: &str) -> bool {
    // ct_eq on slices of different lengths is false without comparing bytes
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, StatusCode};

    use super::*;

    fn keyed() -> Envy {
        Envy {
            function_key: Some("s3cret".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn refuses_everything_when_no_key_configured() {
        let err = authorize(&HeaderMap::new(), &FunctionKeyQuery::default(), &Envy::default())
            .unwrap_err();
        assert_eq!(err.code, StatusCode::UNAUTHORIZED);

        let query = FunctionKeyQuery {
            code: Some("anything".to_string()),
        };
        assert!(authorize(&HeaderMap::new(), &query, &Envy::default()).is_err());
    }

    #[test]
    fn open_only_when_auth_explicitly_disabled() {
        let envy = Envy {
            auth_disabled: Some(true),
            ..Default::default()
        };

        assert!(authorize(&HeaderMap::new(), &FunctionKeyQuery::default(), &envy).is_ok());
    }

    #[test]
    fn configured_key_wins_over_auth_disabled() {
        let envy = Envy {
            auth_disabled: Some(true),
            ..keyed()
        };

        assert!(authorize(&HeaderMap::new(), &FunctionKeyQuery::default(), &envy).is_err());
    }

    #[test]
    fn accepts_header_or_query_key() {
        let mut headers = HeaderMap::new();
        headers.insert(FUNCTION_KEY_HEADER, HeaderValue::from_static("s3cret"));
        assert!(authorize(&headers, &FunctionKeyQuery::default(), &keyed()).is_ok());

        let query = FunctionKeyQuery {
            code: Some("s3cret".to_string()),
        };
        assert!(authorize(&HeaderMap::new(), &query, &keyed()).is_ok());
    }

    #[test]
    fn rejects_missing_wrong_or_prefixed_key() {
        let err = authorize(&HeaderMap::new(), &FunctionKeyQuery::default(), &keyed()).unwrap_err();
        assert_eq!(err.code, StatusCode::UNAUTHORIZED);

        for guess in ["guess", "s3cre", "s3cret!", ""] {
            let query = FunctionKeyQuery {
                code: Some(guess.to_string()),
            };
            let err = authorize(&HeaderMap::new(), &query, &keyed()).unwrap_err();
            assert_eq!(err.code, StatusCode::UNAUTHORIZED);
            assert_eq!(err.message, "Unauthorized.");
        }
    }
}
