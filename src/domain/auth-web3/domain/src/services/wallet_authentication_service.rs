// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use chrono::{DateTime, Utc};
use internal_error::InternalError;
use thiserror::Error;
use url::Url;

use crate::{EvmWalletAddress, MalformedAuthMessageError};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Verifies a signed EIP-4361 message against the nonce issued to the wallet
/// and the context of the request that delivered it.
///
/// Checks run in a fixed order and the first failure aborts the whole
/// attempt: input presence, nonce resolution, structural decode, nonce match,
/// field completeness, domain binding, URI binding, signature verification,
/// nonce consumption. There is no partial success - the caller either
/// receives a [`VerifiedWallet`] or a classified error.
#[async_trait::async_trait]
pub trait WalletAuthenticationService: Send + Sync {
    async fn verify_signed_message(
        &self,
        request: &WalletAuthenticationRequest,
        context: &WalletAuthenticationContext,
    ) -> Result<VerifiedWallet, WalletVerificationError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone)]
pub struct WalletAuthenticationRequest {
    /// Wallet the challenge was issued to
    pub wallet_address: EvmWalletAddress,
    /// Textual EIP-4361 message as it was signed
    pub message: String,
    /// Hex-encoded 65-byte EIP-191 signature, `0x`-prefix optional
    pub signature: String,
    /// Client-stored nonce used only when the server has none on record
    pub fallback_nonce: Option<FallbackNonce>,
}

/// In deployments where server-side nonce storage was unavailable at issuance
/// time the client carries the nonce and its issuance timestamp itself and
/// submits both alongside the signed message.
#[derive(Debug, Clone)]
pub struct FallbackNonce {
    pub nonce: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WalletAuthenticationContext {
    /// Host observed on the incoming request, `x-forwarded-host` already
    /// applied by the transport
    pub observed_host: String,
    /// Canonical URL of the verification endpoint for this deployment
    pub verification_endpoint: Url,
}

/// The sole artifact of a successful verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedWallet {
    pub wallet_address: EvmWalletAddress,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Terminal, non-retryable rejections of a single verification attempt.
/// `Internal` is reserved for infrastructure faults (store or verifier
/// plumbing), never for protocol violations.
#[derive(Error, Debug)]
pub enum WalletVerificationError {
    #[error(transparent)]
    InvalidParams(#[from] InvalidParamsError),

    #[error(transparent)]
    MissingNonce(#[from] MissingNonceError),

    #[error(transparent)]
    ExpiredNonce(#[from] ExpiredNonceError),

    #[error(transparent)]
    MalformedMessage(#[from] MalformedAuthMessageError),

    #[error(transparent)]
    InvalidNonce(#[from] InvalidNonceError),

    #[error(transparent)]
    InvalidDomain(#[from] InvalidDomainError),

    #[error(transparent)]
    InvalidUri(#[from] InvalidUriError),

    #[error(transparent)]
    InvalidSignature(#[from] InvalidSignatureError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl PartialEq for WalletVerificationError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidParams(a), Self::InvalidParams(b)) => a == b,
            (Self::MissingNonce(a), Self::MissingNonce(b)) => a == b,
            (Self::ExpiredNonce(a), Self::ExpiredNonce(b)) => a == b,
            (Self::MalformedMessage(a), Self::MalformedMessage(b)) => a == b,
            (Self::InvalidNonce(a), Self::InvalidNonce(b)) => a == b,
            (Self::InvalidDomain(a), Self::InvalidDomain(b)) => a == b,
            (Self::InvalidUri(a), Self::InvalidUri(b)) => a == b,
            (Self::InvalidSignature(a), Self::InvalidSignature(b)) => a == b,
            (Self::Internal(a), Self::Internal(b)) => a.reason().eq(&b.reason()),
            (_, _) => false,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug, PartialEq, Eq)]
#[error("authentication message and signature must be provided")]
pub struct InvalidParamsError;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug, PartialEq, Eq)]
#[error("no nonce on record for wallet: {wallet}")]
pub struct MissingNonceError {
    pub wallet: EvmWalletAddress,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug, PartialEq, Eq)]
#[error("nonce issued at {issued_at} is outside the validity window")]
pub struct ExpiredNonceError {
    pub issued_at: DateTime<Utc>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug, PartialEq, Eq)]
#[error("nonce in the message does not match the issued nonce")]
pub struct InvalidNonceError;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug, PartialEq, Eq)]
#[error("message domain '{message_domain}' does not match request host '{observed_host}'")]
pub struct InvalidDomainError {
    pub message_domain: String,
    pub observed_host: String,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug, PartialEq, Eq)]
#[error("message URI '{message_uri}' does not match the verification endpoint '{expected_uri}'")]
pub struct InvalidUriError {
    pub message_uri: String,
    pub expected_uri: String,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug, PartialEq, Eq)]
#[error("signature verification failed")]
pub struct InvalidSignatureError;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
