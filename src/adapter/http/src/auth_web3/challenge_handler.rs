// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use dill::Catalog;
use http_common::{ApiError, ApiErrorResponse, ResultIntoApiError};
use internal_error::ResultIntoInternal;
use portcullis_auth_web3::{EvmWalletAddressConvertor, Web3NonceService};
use serde::{Deserialize, Serialize};

use crate::axum_utils::from_catalog_n;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ChallengeRequestBody {
    /// Wallet that intends to sign the challenge
    pub wallet_address: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ChallengeResponseBody {
    /// Wallet the challenge was issued to, EIP-55 checksummed
    pub wallet_address: String,
    /// Nonce the client must embed in the message it signs
    pub nonce: String,
    /// Moment the challenge stops being accepted
    pub expires_at: DateTime<Utc>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Issue a sign-in challenge for a wallet
///
/// A fresh single-use nonce is generated and stored for the wallet; a repeat
/// request replaces any prior unconsumed challenge.
#[utoipa::path(
    post,
    path = "/challenge",
    request_body = ChallengeRequestBody,
    responses(
        (status = OK, body = ChallengeResponseBody),
        (status = BAD_REQUEST, body = ApiErrorResponse),
    ),
    tag = "portcullis",
)]
pub async fn auth_web3_challenge_handler(
    Extension(catalog): Extension<Catalog>,
    Json(request): Json<ChallengeRequestBody>,
) -> Result<Json<ChallengeResponseBody>, ApiError> {
    let nonce_service = from_catalog_n!(catalog, dyn Web3NonceService);

    let wallet_address =
        EvmWalletAddressConvertor::parse(&request.wallet_address).map_err(ApiError::bad_request)?;

    let nonce_entity = nonce_service
        .create_nonce(wallet_address)
        .await
        .int_err()
        .api_err()?;

    Ok(Json(ChallengeResponseBody {
        wallet_address: EvmWalletAddressConvertor::checksummed_string(&nonce_entity.wallet_address),
        nonce: nonce_entity.nonce.into_inner(),
        expires_at: nonce_entity.expires_at,
    }))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
