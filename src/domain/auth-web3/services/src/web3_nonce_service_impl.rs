// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use internal_error::ResultIntoInternal;
use portcullis_auth_web3::*;
use time_source::SystemTimeSource;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[dill::component]
#[dill::interface(dyn Web3NonceService)]
pub struct Web3NonceServiceImpl {
    nonce_repo: Arc<dyn Web3AuthEip4361NonceRepository>,
    nonce_config: Arc<Web3AuthNonceConfig>,
    time_source: Arc<dyn SystemTimeSource>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl Web3NonceService for Web3NonceServiceImpl {
    #[tracing::instrument(level = "debug", skip_all, fields(%wallet_address))]
    async fn create_nonce(
        &self,
        wallet_address: EvmWalletAddress,
    ) -> Result<Web3AuthEip4361NonceEntity, CreateNonceError> {
        let entity = Web3AuthEip4361NonceEntity {
            wallet_address,
            nonce: Web3AuthenticationEip4361Nonce::new(),
            expires_at: self.time_source.now() + self.nonce_config.nonce_validity_window,
        };

        self.nonce_repo.set_nonce(&entity).await.int_err()?;

        Ok(entity)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
