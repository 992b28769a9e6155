// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use portcullis_auth_web3::*;
use portcullis_auth_web3_inmem::InMemoryWeb3AuthNonceRepository;
use portcullis_auth_web3_services::Web3NonceServiceImpl;
use time_source::{SystemTimeSource, SystemTimeSourceStub};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_create_nonce_persists_challenge_with_validity_window() {
    let harness = Web3NonceServiceHarness::new();

    let t0 = Utc.with_ymd_and_hms(2050, 1, 1, 12, 0, 0).unwrap();
    harness.time_source_stub.set(t0);

    let wallet = EvmWalletAddressConvertor::parse("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed")
        .unwrap();

    let entity = harness.nonce_service.create_nonce(wallet).await.unwrap();

    assert_eq!(entity.wallet_address, wallet);
    assert_eq!(
        entity.expires_at,
        t0 + Duration::seconds(DEFAULT_NONCE_VALIDITY_WINDOW_SECONDS)
    );

    // The freshly issued challenge is immediately visible to verification
    pretty_assertions::assert_eq!(Ok(entity), harness.nonce_repo.get_nonce(&wallet).await);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_create_nonce_reissue_replaces_previous_challenge() {
    let harness = Web3NonceServiceHarness::new();

    let t0 = Utc.with_ymd_and_hms(2050, 1, 1, 12, 0, 0).unwrap();
    harness.time_source_stub.set(t0);

    let wallet = EvmWalletAddressConvertor::parse("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed")
        .unwrap();

    let first_entity = harness.nonce_service.create_nonce(wallet).await.unwrap();
    let second_entity = harness.nonce_service.create_nonce(wallet).await.unwrap();

    assert_ne!(first_entity.nonce, second_entity.nonce);

    pretty_assertions::assert_eq!(
        Ok(second_entity),
        harness.nonce_repo.get_nonce(&wallet).await
    );
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_create_nonce_issues_unguessable_alphanumeric_tokens() {
    let harness = Web3NonceServiceHarness::new();

    let t0 = Utc.with_ymd_and_hms(2050, 1, 1, 12, 0, 0).unwrap();
    harness.time_source_stub.set(t0);

    let wallet = EvmWalletAddressConvertor::parse("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed")
        .unwrap();

    let entity = harness.nonce_service.create_nonce(wallet).await.unwrap();
    let nonce = entity.nonce.as_ref();

    // Generated nonces comfortably exceed the 8-character protocol minimum
    assert!(nonce.len() >= 8);
    assert!(nonce.chars().all(char::is_alphanumeric));
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Harness
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

struct Web3NonceServiceHarness {
    nonce_service: Arc<dyn Web3NonceService>,
    nonce_repo: Arc<dyn Web3AuthEip4361NonceRepository>,
    time_source_stub: Arc<SystemTimeSourceStub>,
}

impl Web3NonceServiceHarness {
    pub fn new() -> Self {
        let catalog = {
            let mut b = dill::CatalogBuilder::new();
            b.add::<Web3NonceServiceImpl>()
                .add::<InMemoryWeb3AuthNonceRepository>()
                .add_value(Web3AuthNonceConfig::default())
                .add_value(SystemTimeSourceStub::new())
                .bind::<dyn SystemTimeSource, SystemTimeSourceStub>();

            b.build()
        };

        Self {
            nonce_service: catalog.get_one().unwrap(),
            nonce_repo: catalog.get_one().unwrap(),
            time_source_stub: catalog.get_one().unwrap(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
