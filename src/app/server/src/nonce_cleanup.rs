// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use chrono::Duration;
use dill::Catalog;
use internal_error::{InternalError, ResultIntoInternal};
use portcullis_auth_web3::Web3AuthEip4361NonceRepository;
use time_source::SystemTimeSource;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Periodically evicts expired nonces, keeping the store from growing
/// unboundedly with challenges that were issued but never verified.
pub struct NonceCleanupJob {
    nonce_repo: Arc<dyn Web3AuthEip4361NonceRepository>,
    time_source: Arc<dyn SystemTimeSource>,
    interval: Duration,
}

impl NonceCleanupJob {
    pub fn new(catalog: &Catalog, interval: Duration) -> Self {
        Self {
            nonce_repo: catalog.get_one().unwrap(),
            time_source: catalog.get_one().unwrap(),
            interval,
        }
    }

    pub async fn run(self) -> Result<(), InternalError> {
        loop {
            self.time_source.sleep(self.interval).await;

            let deleted_count = self
                .nonce_repo
                .cleanup_expired_nonces(self.time_source.now())
                .await
                .int_err()?;

            if deleted_count > 0 {
                tracing::debug!(deleted_count, "Evicted expired nonces");
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
