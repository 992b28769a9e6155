// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use portcullis_auth_web3::*;
use time_source::SystemTimeSource;
use url::Url;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[dill::component]
#[dill::interface(dyn WalletAuthenticationService)]
pub struct WalletAuthenticationServiceImpl {
    nonce_repo: Arc<dyn Web3AuthEip4361NonceRepository>,
    signature_verifier: Arc<dyn WalletSignatureVerifier>,
    nonce_config: Arc<Web3AuthNonceConfig>,
    time_source: Arc<dyn SystemTimeSource>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// The nonce a submitted message is required to echo. When the store has no
/// entry for the wallet it may come from the client-supplied fallback, in
/// which case there is nothing to consume afterwards.
struct ExpectedNonce {
    nonce: String,
    server_issued: bool,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl WalletAuthenticationServiceImpl {
    async fn resolve_expected_nonce(
        &self,
        request: &WalletAuthenticationRequest,
        now: DateTime<Utc>,
    ) -> Result<ExpectedNonce, WalletVerificationError> {
        match self.nonce_repo.get_nonce(&request.wallet_address).await {
            Ok(entity) => Ok(ExpectedNonce {
                nonce: entity.nonce.into_inner(),
                server_issued: true,
            }),
            Err(GetNonceError::NotFound(_)) => {
                let Some(fallback) = &request.fallback_nonce else {
                    return Err(MissingNonceError {
                        wallet: request.wallet_address,
                    }
                    .into());
                };

                let age = now.signed_duration_since(fallback.issued_at);
                if age > self.nonce_config.nonce_validity_window {
                    return Err(ExpiredNonceError {
                        issued_at: fallback.issued_at,
                    }
                    .into());
                }

                Ok(ExpectedNonce {
                    nonce: fallback.nonce.clone(),
                    server_issued: false,
                })
            }
            Err(GetNonceError::Internal(e)) => Err(e.into()),
        }
    }

    fn check_domain_binding(
        message: &SignedAuthMessage,
        context: &WalletAuthenticationContext,
    ) -> Result<(), WalletVerificationError> {
        let message_domain = message.domain();

        // Host names are case-insensitive, ports are not implied: a message
        // signed for "example.com:8080" does not match plain "example.com"
        if !message_domain.eq_ignore_ascii_case(&context.observed_host) {
            return Err(InvalidDomainError {
                message_domain,
                observed_host: context.observed_host.clone(),
            }
            .into());
        }

        Ok(())
    }

    fn check_uri_binding(
        message: &SignedAuthMessage,
        context: &WalletAuthenticationContext,
    ) -> Result<(), WalletVerificationError> {
        let message_uri = message.uri();

        // Scheme, host, port, and path must all agree with the canonical
        // verification endpoint. Query and fragment are ignored on both sides.
        let matches_expected = match Url::parse(&message_uri) {
            Ok(parsed) => {
                let expected = &context.verification_endpoint;

                parsed.scheme() == expected.scheme()
                    && parsed.host_str() == expected.host_str()
                    && parsed.port_or_known_default() == expected.port_or_known_default()
                    && parsed.path() == expected.path()
            }
            Err(_) => false,
        };

        if !matches_expected {
            return Err(InvalidUriError {
                message_uri,
                expected_uri: context.verification_endpoint.to_string(),
            }
            .into());
        }

        Ok(())
    }

    fn decode_signature(signature: &str) -> Result<Vec<u8>, WalletVerificationError> {
        let hex_digits = signature.strip_prefix("0x").unwrap_or(signature);

        hex::decode(hex_digits).map_err(|_| InvalidSignatureError.into())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl WalletAuthenticationService for WalletAuthenticationServiceImpl {
    #[tracing::instrument(level = "debug", skip_all, fields(wallet_address = %request.wallet_address))]
    async fn verify_signed_message(
        &self,
        request: &WalletAuthenticationRequest,
        context: &WalletAuthenticationContext,
    ) -> Result<VerifiedWallet, WalletVerificationError> {
        if request.message.is_empty() || request.signature.is_empty() {
            return Err(InvalidParamsError.into());
        }

        let now = self.time_source.now();
        let expected_nonce = self.resolve_expected_nonce(request, now).await?;

        let message = SignedAuthMessage::parse(&request.message)?;

        if message.nonce() != expected_nonce.nonce {
            return Err(InvalidNonceError.into());
        }

        // Field completeness beyond this point is guaranteed by the grammar:
        // a decoded message always carries domain, address, and URI

        Self::check_domain_binding(&message, context)?;
        Self::check_uri_binding(&message, context)?;

        let signature = Self::decode_signature(&request.signature)?;

        if !self.signature_verifier.verify(&message, &signature).await? {
            return Err(InvalidSignatureError.into());
        }

        // The delete doubles as the replay barrier: of several concurrent
        // attempts replaying one nonce, only the first to consume it wins,
        // even though all of them may have passed the signature check
        if expected_nonce.server_issued {
            match self
                .nonce_repo
                .consume_nonce(&request.wallet_address, now)
                .await
            {
                Ok(()) => {}
                Err(ConsumeNonceError::NotFound(e)) => {
                    return Err(MissingNonceError { wallet: e.wallet }.into());
                }
                Err(ConsumeNonceError::Internal(e)) => return Err(e.into()),
            }
        }

        Ok(VerifiedWallet {
            wallet_address: message.wallet_address(),
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
