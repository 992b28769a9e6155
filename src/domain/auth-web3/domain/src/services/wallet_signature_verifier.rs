// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;

use crate::SignedAuthMessage;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// External cryptographic capability: decides whether `signature` was
/// produced over `message` by the wallet the message claims. The validation
/// pipeline treats this as an opaque boolean oracle and performs no
/// cryptography of its own.
#[cfg_attr(any(feature = "testing", test), mockall::automock)]
#[async_trait::async_trait]
pub trait WalletSignatureVerifier: Send + Sync {
    async fn verify(
        &self,
        message: &SignedAuthMessage,
        signature: &[u8],
    ) -> Result<bool, InternalError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
