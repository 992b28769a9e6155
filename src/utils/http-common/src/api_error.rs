// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// This type is used to simplify error handling in HTTP handlers and unify
/// logging of API errors.
///
/// The typical usage pattern is:
///
/// ```
/// async fn handler() -> Result<(), ApiError> {
///     operation().await.api_err()?;
///     Ok(())
/// }
/// ````
///
/// A conversion between the domain error and [`ApiError`] has to exist. We on
/// purpose avoid [From] and [Into] traits and using [`IntoApiError`] instead as
/// we want this conversion to be explicit - it's too easy to put a question
/// mark operator on a fallible operation without thinking what it will actually
/// do.
///
/// Note that between handlers the same domain error can carry a different
/// meaning and deserve a different status code, so blanket conversions are
/// provided only for [`InternalError`]. When a handler needs to return
/// distinct status codes it can still take advantage of uniform error
/// handling using this pattern:
///
/// ```
/// async fn handler() -> Result<(), ApiError> {
///     match operation().await {
///         Ok(_) => Ok(()),
///         Err(OperationError::NotFound(e)) => Err(ApiError::not_found(e)),
///         Err(e) => Err(e.api_err()),
///     }
/// }
/// ```
#[derive(Debug, Error)]
#[error("api error {status_code:?}")]
pub struct ApiError {
    pub status_code: http::StatusCode,
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl ApiError {
    pub fn new(
        source: impl std::error::Error + Send + Sync + 'static,
        status_code: http::StatusCode,
    ) -> Self {
        Self {
            status_code,
            source: source.into(),
        }
    }

    pub fn new_unauthorized() -> Self {
        Self {
            source: "Unauthorized access".into(),
            status_code: http::StatusCode::UNAUTHORIZED,
        }
    }

    pub fn new_unauthorized_from(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(source, http::StatusCode::UNAUTHORIZED)
    }

    pub fn bad_request(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(source, http::StatusCode::BAD_REQUEST)
    }

    pub fn bad_request_with_message(message: &str) -> Self {
        Self {
            source: message.to_string().into(),
            status_code: http::StatusCode::BAD_REQUEST,
        }
    }

    pub fn bad_request_without_reason() -> Self {
        Self {
            source: "Bad request".into(),
            status_code: http::StatusCode::BAD_REQUEST,
        }
    }

    pub fn not_found(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(source, http::StatusCode::NOT_FOUND)
    }

    pub fn not_found_without_reason() -> Self {
        Self {
            source: "Not Found".into(),
            status_code: http::StatusCode::NOT_FOUND,
        }
    }
}

impl From<InternalError> for ApiError {
    fn from(e: InternalError) -> Self {
        e.api_err()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, utoipa::ToSchema)]
pub struct ApiErrorResponse {
    pub message: String,
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        // TODO: Logging as a side effect of conversion is not great - we should move
        // this into a middleware
        if self.status_code == http::StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(
                error = ?self.source,
                error_msg = %self.source,
                status_code = %self.status_code,
                "Internal API error",
            );
            (self.status_code, "").into_response()
        } else {
            tracing::warn!(
                error = ?self.source,
                error_msg = %self.source,
                status_code = %self.status_code,
                "API error",
            );

            let response_body = axum::response::Json(ApiErrorResponse {
                message: self.source.to_string(),
            });

            (self.status_code, response_body).into_response()
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Provides explicit conversion into [`ApiError`].
pub trait IntoApiError {
    fn api_err(self) -> ApiError;
}

impl IntoApiError for InternalError {
    fn api_err(self) -> ApiError {
        ApiError::new(self, http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Allows using `.api_err()` method on [Result] types.
pub trait ResultIntoApiError<K, E>
where
    E: IntoApiError,
{
    fn api_err(self) -> Result<K, ApiError>;
}

impl<K, E> ResultIntoApiError<K, E> for Result<K, E>
where
    E: IntoApiError,
{
    fn api_err(self) -> Result<K, ApiError> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.api_err()),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
