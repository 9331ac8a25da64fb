//! API error responses.
//!
//! Every failure a handler can produce collapses into [`ApiError`], which
//! renders the wire shape `{"code": ...}` plus, for validation failures, an
//! `errors` list with one entry per violation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::{AuthError, PasswordError};
use crate::db::DbError;
use crate::web::schema::{SchemaError, Violation};

/// Response body for errors.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<Violation>>,
}

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    errors: Option<Vec<Violation>>,
}

impl ApiError {
    /// 401: no usable credential was presented.
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "unauthorized",
            errors: None,
        }
    }

    /// 403: a credential was presented but is invalid or expired.
    pub fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            code: "forbidden",
            errors: None,
        }
    }

    /// 404: the looked-up resource does not exist (for this tenant).
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "not_found",
            errors: None,
        }
    }

    /// 409: uniqueness conflict.
    pub fn conflict() -> Self {
        Self {
            status: StatusCode::CONFLICT,
            code: "conflict",
            errors: None,
        }
    }

    /// 400 with the full violation list.
    pub fn invalid_request(errors: Vec<Violation>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_request",
            errors: Some(errors),
        }
    }

    /// 500; details stay in the log, never in the response.
    pub fn server_error() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "server_error",
            errors: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code,
            errors: self.errors,
        };
        (self.status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status, self.code)
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            // Missing or structurally broken carrier: not authenticated.
            AuthError::Missing | AuthError::Malformed => ApiError::unauthorized(),
            // Well-formed token that fails verification: authenticated-ish
            // but rejected.
            AuthError::InvalidSignature | AuthError::Expired => ApiError::forbidden(),
        }
    }
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::MissingBody => ApiError::invalid_request(vec![Violation {
                code: "missing_body",
                field: None,
            }]),
            SchemaError::Invalid(violations) => ApiError::invalid_request(violations),
            SchemaError::Decode(e) => {
                tracing::debug!("body passed schema but failed to decode: {e}");
                ApiError::invalid_request(vec![Violation {
                    code: "invalid_body",
                    field: None,
                }])
            }
            SchemaError::Compile(e) => {
                tracing::error!("schema failed to compile: {e}");
                ApiError::server_error()
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::UserNotFound(_)
            | DbError::EmailNotFound(_)
            | DbError::VehicleNotFound(_)
            | DbError::ScheduleItemNotFound(_) => ApiError::not_found(),
            DbError::EmailTaken(_) => ApiError::conflict(),
            DbError::Sqlx(_) => {
                tracing::error!("database error: {err}");
                ApiError::server_error()
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            // Wrong password or unreadable stored hash both read as a
            // failed login to the caller.
            PasswordError::VerificationFailed | PasswordError::InvalidHash => {
                ApiError::unauthorized()
            }
            PasswordError::Hash(e) => {
                tracing::error!("password hashing failed: {e}");
                ApiError::server_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_mapping_splits_401_and_403() {
        assert_eq!(
            ApiError::from(AuthError::Missing).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::Malformed).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidSignature).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AuthError::Expired).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn db_not_found_maps_to_404() {
        let err = ApiError::from(DbError::VehicleNotFound(3));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn schema_errors_map_to_400() {
        let missing = ApiError::from(SchemaError::MissingBody);
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.code(), "invalid_request");

        let invalid = ApiError::from(SchemaError::Invalid(vec![Violation {
            code: "missing_field",
            field: Some("model".to_string()),
        }]));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn hash_failure_is_internal() {
        let err = ApiError::from(PasswordError::Hash("entropy".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "server_error");
    }
}
