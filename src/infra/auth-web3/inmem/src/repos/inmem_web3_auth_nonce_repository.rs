// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use time_source::SystemTimeSource;
use tokio::sync::RwLock;

use crate::domain::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Default)]
struct State {
    nonce_by_wallet: HashMap<EvmWalletAddress, Web3AuthEip4361NonceEntity>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct InMemoryWeb3AuthNonceRepository {
    time_source: Arc<dyn SystemTimeSource>,
    state: Arc<RwLock<State>>,
}

#[dill::component(pub)]
#[dill::interface(dyn Web3AuthEip4361NonceRepository)]
#[dill::scope(dill::Singleton)]
impl InMemoryWeb3AuthNonceRepository {
    pub fn new(time_source: Arc<dyn SystemTimeSource>) -> Self {
        Self {
            time_source,
            state: Arc::new(RwLock::new(State::default())),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[async_trait::async_trait]
impl Web3AuthEip4361NonceRepository for InMemoryWeb3AuthNonceRepository {
    async fn set_nonce(&self, entity: &Web3AuthEip4361NonceEntity) -> Result<(), SetNonceError> {
        let mut writable_state = self.state.write().await;

        writable_state
            .nonce_by_wallet
            .insert(entity.wallet_address, entity.clone());

        Ok(())
    }

    async fn get_nonce(
        &self,
        wallet: &EvmWalletAddress,
    ) -> Result<Web3AuthEip4361NonceEntity, GetNonceError> {
        let readable_state = self.state.read().await;

        // An entry past its deadline is present physically but must behave
        // as absent until cleanup evicts it
        match readable_state.nonce_by_wallet.get(wallet) {
            Some(entity) if !entity.is_expired(self.time_source.now()) => Ok(entity.clone()),
            _ => Err(GetNonceError::NotFound(WalletNotFoundError {
                wallet: *wallet,
            })),
        }
    }

    async fn consume_nonce(
        &self,
        wallet: &EvmWalletAddress,
        now: DateTime<Utc>,
    ) -> Result<(), ConsumeNonceError> {
        // Single writer lock spans the liveness check and the removal, making
        // consumption atomic: of two concurrent consumers exactly one wins
        let mut writable_state = self.state.write().await;

        let is_alive = writable_state
            .nonce_by_wallet
            .get(wallet)
            .is_some_and(|entity| !entity.is_expired(now));

        if !is_alive {
            return Err(ConsumeNonceError::NotFound(WalletNotFoundError {
                wallet: *wallet,
            }));
        }

        writable_state.nonce_by_wallet.remove(wallet);

        Ok(())
    }

    async fn cleanup_expired_nonces(
        &self,
        now: DateTime<Utc>,
    ) -> Result<usize, CleanupExpiredNoncesError> {
        let mut writable_state = self.state.write().await;

        let len_before_cleanup = writable_state.nonce_by_wallet.len();

        writable_state
            .nonce_by_wallet
            .retain(|_, entity| !entity.is_expired(now));

        Ok(len_before_cleanup - writable_state.nonce_by_wallet.len())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
