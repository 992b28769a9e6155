// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use axum::extract::Query;
use axum::{Extension, Json};
use axum_extra::extract::Host;
use dill::Catalog;
use http_common::{ApiError, ApiErrorResponse, IntoApiError};
use portcullis_auth_web3::{
    EvmWalletAddressConvertor,
    FallbackNonce,
    WalletAuthenticationContext,
    WalletAuthenticationRequest,
    WalletAuthenticationService,
    WalletVerificationError,
};
use serde::{Deserialize, Serialize};

use crate::ServerUrlConfig;
use crate::axum_utils::from_catalog_n;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VerifyQueryParams {
    /// Signed EIP-4361 message text
    pub message: String,
    /// Hex-encoded EIP-191 signature, `0x` prefix optional
    pub signature: String,
    /// Wallet address the challenge was issued to
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct VerifyRequestBody {
    /// Signed EIP-4361 message text
    pub message: String,
    /// Hex-encoded EIP-191 signature, `0x` prefix optional
    pub signature: String,
    /// Wallet address the challenge was issued to
    pub address: String,
    /// Client-stored nonce, for deployments where server-side nonce storage
    /// was unavailable at issuance time; requires `issued_at_ms`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Unix-epoch milliseconds the fallback nonce was issued at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at_ms: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct VerifyResponseBody {
    /// Authenticated wallet, EIP-55 checksummed
    pub address: String,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Verify a signed challenge (query-string variant)
#[utoipa::path(
    get,
    path = "/verify",
    params(VerifyQueryParams),
    responses(
        (status = OK, body = VerifyResponseBody),
        (status = BAD_REQUEST, body = ApiErrorResponse),
        (status = UNAUTHORIZED, body = ApiErrorResponse),
    ),
    tag = "portcullis",
)]
pub async fn auth_web3_verify_get_handler(
    Extension(catalog): Extension<Catalog>,
    Host(observed_host): Host,
    Query(params): Query<VerifyQueryParams>,
) -> Result<Json<VerifyResponseBody>, ApiError> {
    verify_signed_message(
        &catalog,
        observed_host,
        &params.address,
        params.message,
        params.signature,
        None,
    )
    .await
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Verify a signed challenge (JSON-body variant)
///
/// Unlike the query-string variant, the body may carry an inline
/// `{nonce, issued_at_ms}` pair that substitutes for a stored nonce.
#[utoipa::path(
    post,
    path = "/verify",
    request_body = VerifyRequestBody,
    responses(
        (status = OK, body = VerifyResponseBody),
        (status = BAD_REQUEST, body = ApiErrorResponse),
        (status = UNAUTHORIZED, body = ApiErrorResponse),
    ),
    tag = "portcullis",
)]
pub async fn auth_web3_verify_post_handler(
    Extension(catalog): Extension<Catalog>,
    Host(observed_host): Host,
    Json(request): Json<VerifyRequestBody>,
) -> Result<Json<VerifyResponseBody>, ApiError> {
    let fallback_nonce = match (request.nonce, request.issued_at_ms) {
        (None, None) => None,
        (Some(nonce), Some(issued_at_ms)) => {
            let issued_at = chrono::DateTime::from_timestamp_millis(issued_at_ms)
                .ok_or_else(|| ApiError::bad_request_with_message("issued_at_ms is out of range"))?;
            Some(FallbackNonce { nonce, issued_at })
        }
        (_, _) => {
            return Err(ApiError::bad_request_with_message(
                "nonce and issued_at_ms must be supplied together",
            ));
        }
    };

    verify_signed_message(
        &catalog,
        observed_host,
        &request.address,
        request.message,
        request.signature,
        fallback_nonce,
    )
    .await
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

async fn verify_signed_message(
    catalog: &Catalog,
    observed_host: String,
    address: &str,
    message: String,
    signature: String,
    fallback_nonce: Option<FallbackNonce>,
) -> Result<Json<VerifyResponseBody>, ApiError> {
    let (wallet_authentication_service, server_url_config) =
        from_catalog_n!(catalog, dyn WalletAuthenticationService, ServerUrlConfig);

    let wallet_address = EvmWalletAddressConvertor::parse(address).map_err(ApiError::bad_request)?;

    let request = WalletAuthenticationRequest {
        wallet_address,
        message,
        signature,
        fallback_nonce,
    };
    let context = WalletAuthenticationContext {
        observed_host,
        verification_endpoint: server_url_config.wallet_verification_endpoint(),
    };

    let verified = wallet_authentication_service
        .verify_signed_message(&request, &context)
        .await
        .map_err(map_verification_error)?;

    Ok(Json(VerifyResponseBody {
        address: EvmWalletAddressConvertor::checksummed_string(&verified.wallet_address),
    }))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn map_verification_error(e: WalletVerificationError) -> ApiError {
    use WalletVerificationError as E;

    match e {
        E::InvalidParams(e) => ApiError::bad_request(e),
        E::MissingNonce(e) => ApiError::new_unauthorized_from(e),
        E::ExpiredNonce(e) => ApiError::new_unauthorized_from(e),
        E::MalformedMessage(e) => ApiError::new_unauthorized_from(e),
        E::InvalidNonce(e) => ApiError::new_unauthorized_from(e),
        E::InvalidDomain(e) => ApiError::new_unauthorized_from(e),
        E::InvalidUri(e) => ApiError::new_unauthorized_from(e),
        E::InvalidSignature(e) => ApiError::new_unauthorized_from(e),
        E::Internal(e) => e.api_err(),
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
