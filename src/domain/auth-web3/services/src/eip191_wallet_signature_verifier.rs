// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;
use portcullis_auth_web3::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Verifies EIP-191 ("personal_sign") signatures by recovering the signing
/// key from the signature and comparing the derived address to the one the
/// message claims. Every cryptographic failure mode (wrong length, malformed
/// scalar, recovered signer mismatch) is reported as a plain negative verdict.
pub struct Eip191WalletSignatureVerifier {}

#[dill::component(pub)]
#[dill::interface(dyn WalletSignatureVerifier)]
impl Eip191WalletSignatureVerifier {
    pub fn new() -> Self {
        Self {}
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl WalletSignatureVerifier for Eip191WalletSignatureVerifier {
    async fn verify(
        &self,
        message: &SignedAuthMessage,
        signature: &[u8],
    ) -> Result<bool, InternalError> {
        // EIP-191 signatures are exactly r (32) || s (32) || v (1)
        let Ok(signature) = <&[u8; 65]>::try_from(signature) else {
            return Ok(false);
        };

        Ok(message.as_eip4361().verify_eip191(signature).is_ok())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
