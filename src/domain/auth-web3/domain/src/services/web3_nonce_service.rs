// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use internal_error::InternalError;
use thiserror::Error;

use crate::{EvmWalletAddress, Web3AuthEip4361NonceEntity};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Issues single-use challenges.
#[async_trait::async_trait]
pub trait Web3NonceService: Send + Sync {
    /// Generates a fresh nonce for the wallet and persists it with the
    /// configured validity window. A prior unconsumed nonce for the same
    /// wallet is overwritten without being read.
    async fn create_nonce(
        &self,
        wallet_address: EvmWalletAddress,
    ) -> Result<Web3AuthEip4361NonceEntity, CreateNonceError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug)]
pub enum CreateNonceError {
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl PartialEq for CreateNonceError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Internal(a), Self::Internal(b)) => a.reason().eq(&b.reason()),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
