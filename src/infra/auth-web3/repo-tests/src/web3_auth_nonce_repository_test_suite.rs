// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{DateTime, Duration, TimeZone, Utc};
use portcullis_auth_web3::*;
use time_source::SystemTimeSourceStub;

use crate::web3_auth_test_utils::{make_test_nonce_entity, make_test_wallet};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn test_set_and_get_nonce(catalog: &dill::Catalog) {
    let harness = Web3AuthNonceRepositoryTestSuiteHarness::new(catalog);
    let t0 = harness.freeze_time();

    let wallet = make_test_wallet(0xA1);
    let entity = make_test_nonce_entity(wallet, t0 + Duration::minutes(10));

    assert_matches!(harness.nonce_repo.set_nonce(&entity).await, Ok(()));

    pretty_assertions::assert_eq!(Ok(entity), harness.nonce_repo.get_nonce(&wallet).await);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn test_set_nonce_overwrites_previous(catalog: &dill::Catalog) {
    let harness = Web3AuthNonceRepositoryTestSuiteHarness::new(catalog);
    let t0 = harness.freeze_time();

    let wallet = make_test_wallet(0xA2);
    let first_entity = make_test_nonce_entity(wallet, t0 + Duration::minutes(10));
    let second_entity = make_test_nonce_entity(wallet, t0 + Duration::minutes(20));

    assert_ne!(first_entity.nonce, second_entity.nonce);

    assert_matches!(harness.nonce_repo.set_nonce(&first_entity).await, Ok(()));
    assert_matches!(harness.nonce_repo.set_nonce(&second_entity).await, Ok(()));

    pretty_assertions::assert_eq!(
        Ok(second_entity),
        harness.nonce_repo.get_nonce(&wallet).await
    );
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn test_get_nonce_missing_wallet(catalog: &dill::Catalog) {
    let harness = Web3AuthNonceRepositoryTestSuiteHarness::new(catalog);
    harness.freeze_time();

    let unknown_wallet = make_test_wallet(0xA3);

    pretty_assertions::assert_eq!(
        Err(GetNonceError::NotFound(WalletNotFoundError {
            wallet: unknown_wallet
        })),
        harness.nonce_repo.get_nonce(&unknown_wallet).await
    );
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn test_nonce_becomes_unreadable_after_expiry(catalog: &dill::Catalog) {
    let harness = Web3AuthNonceRepositoryTestSuiteHarness::new(catalog);
    let t0 = harness.freeze_time();

    let wallet = make_test_wallet(0xA4);
    let expires_at = t0 + Duration::minutes(10);
    let entity = make_test_nonce_entity(wallet, expires_at);

    assert_matches!(harness.nonce_repo.set_nonce(&entity).await, Ok(()));

    // One second before the deadline the nonce is still readable
    harness.time_source_stub.set(expires_at - Duration::seconds(1));

    assert_matches!(harness.nonce_repo.get_nonce(&wallet).await, Ok(_));

    // At the deadline it is gone
    harness.time_source_stub.set(expires_at);

    pretty_assertions::assert_eq!(
        Err(GetNonceError::NotFound(WalletNotFoundError { wallet })),
        harness.nonce_repo.get_nonce(&wallet).await
    );
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn test_consume_nonce_is_single_use(catalog: &dill::Catalog) {
    let harness = Web3AuthNonceRepositoryTestSuiteHarness::new(catalog);
    let t0 = harness.freeze_time();

    let wallet = make_test_wallet(0xA5);
    let entity = make_test_nonce_entity(wallet, t0 + Duration::minutes(10));

    assert_matches!(harness.nonce_repo.set_nonce(&entity).await, Ok(()));

    assert_matches!(
        harness
            .nonce_repo
            .consume_nonce(&wallet, t0 + Duration::seconds(1))
            .await,
        Ok(())
    );

    // Second consumption of the same nonce must lose
    pretty_assertions::assert_eq!(
        Err(ConsumeNonceError::NotFound(WalletNotFoundError { wallet })),
        harness
            .nonce_repo
            .consume_nonce(&wallet, t0 + Duration::seconds(2))
            .await
    );

    pretty_assertions::assert_eq!(
        Err(GetNonceError::NotFound(WalletNotFoundError { wallet })),
        harness.nonce_repo.get_nonce(&wallet).await
    );
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn test_consume_nonce_missing_wallet(catalog: &dill::Catalog) {
    let harness = Web3AuthNonceRepositoryTestSuiteHarness::new(catalog);
    let t0 = harness.freeze_time();

    let unknown_wallet = make_test_wallet(0xA6);

    pretty_assertions::assert_eq!(
        Err(ConsumeNonceError::NotFound(WalletNotFoundError {
            wallet: unknown_wallet
        })),
        harness.nonce_repo.consume_nonce(&unknown_wallet, t0).await
    );
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn test_consume_nonce_after_expiry(catalog: &dill::Catalog) {
    let harness = Web3AuthNonceRepositoryTestSuiteHarness::new(catalog);
    let t0 = harness.freeze_time();

    let wallet = make_test_wallet(0xA7);
    let expires_at = t0 + Duration::minutes(10);
    let entity = make_test_nonce_entity(wallet, expires_at);

    assert_matches!(harness.nonce_repo.set_nonce(&entity).await, Ok(()));

    // An expired nonce is not consumable, even though its row may still
    // be physically present until cleanup runs
    pretty_assertions::assert_eq!(
        Err(ConsumeNonceError::NotFound(WalletNotFoundError { wallet })),
        harness.nonce_repo.consume_nonce(&wallet, expires_at).await
    );
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn test_cleanup_expired_nonces(catalog: &dill::Catalog) {
    let harness = Web3AuthNonceRepositoryTestSuiteHarness::new(catalog);
    let t0 = harness.freeze_time();

    let short_lived_wallet = make_test_wallet(0xA8);
    let long_lived_wallet = make_test_wallet(0xA9);

    let short_lived_entity = make_test_nonce_entity(short_lived_wallet, t0 + Duration::minutes(5));
    let long_lived_entity = make_test_nonce_entity(long_lived_wallet, t0 + Duration::minutes(10));

    assert_matches!(
        harness.nonce_repo.set_nonce(&short_lived_entity).await,
        Ok(())
    );
    assert_matches!(
        harness.nonce_repo.set_nonce(&long_lived_entity).await,
        Ok(())
    );

    pretty_assertions::assert_eq!(
        Ok(0),
        harness
            .nonce_repo
            .cleanup_expired_nonces(t0 + Duration::minutes(1))
            .await
    );

    pretty_assertions::assert_eq!(
        Ok(1),
        harness
            .nonce_repo
            .cleanup_expired_nonces(t0 + Duration::minutes(5))
            .await
    );

    harness.time_source_stub.set(t0 + Duration::minutes(6));

    pretty_assertions::assert_eq!(
        Err(GetNonceError::NotFound(WalletNotFoundError {
            wallet: short_lived_wallet
        })),
        harness.nonce_repo.get_nonce(&short_lived_wallet).await
    );
    assert_matches!(
        harness.nonce_repo.get_nonce(&long_lived_wallet).await,
        Ok(_)
    );

    pretty_assertions::assert_eq!(
        Ok(1),
        harness
            .nonce_repo
            .cleanup_expired_nonces(t0 + Duration::minutes(11))
            .await
    );
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Harness
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

struct Web3AuthNonceRepositoryTestSuiteHarness {
    pub nonce_repo: Arc<dyn Web3AuthEip4361NonceRepository>,
    pub time_source_stub: Arc<SystemTimeSourceStub>,
}

impl Web3AuthNonceRepositoryTestSuiteHarness {
    pub fn new(catalog: &dill::Catalog) -> Self {
        Self {
            nonce_repo: catalog.get_one().unwrap(),
            time_source_stub: catalog.get_one().unwrap(),
        }
    }

    pub fn freeze_time(&self) -> DateTime<Utc> {
        let t0 = Utc.with_ymd_and_hms(2050, 1, 1, 12, 0, 0).unwrap();

        self.time_source_stub.set(t0);

        t0
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
