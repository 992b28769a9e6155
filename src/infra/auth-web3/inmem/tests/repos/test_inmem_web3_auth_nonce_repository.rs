// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use portcullis_auth_web3_inmem::InMemoryWeb3AuthNonceRepository;
use time_source::{SystemTimeSource, SystemTimeSourceStub};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_set_and_get_nonce() {
    let harness = InMemoryWeb3AuthNonceRepositoryHarness::new();

    portcullis_auth_web3_repo_tests::web3_auth_nonce_repository::test_set_and_get_nonce(
        &harness.catalog,
    )
    .await;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_set_nonce_overwrites_previous() {
    let harness = InMemoryWeb3AuthNonceRepositoryHarness::new();

    portcullis_auth_web3_repo_tests::web3_auth_nonce_repository::test_set_nonce_overwrites_previous(
        &harness.catalog,
    )
    .await;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_get_nonce_missing_wallet() {
    let harness = InMemoryWeb3AuthNonceRepositoryHarness::new();

    portcullis_auth_web3_repo_tests::web3_auth_nonce_repository::test_get_nonce_missing_wallet(
        &harness.catalog,
    )
    .await;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_nonce_becomes_unreadable_after_expiry() {
    let harness = InMemoryWeb3AuthNonceRepositoryHarness::new();

    portcullis_auth_web3_repo_tests::web3_auth_nonce_repository::test_nonce_becomes_unreadable_after_expiry(
        &harness.catalog,
    )
    .await;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_consume_nonce_is_single_use() {
    let harness = InMemoryWeb3AuthNonceRepositoryHarness::new();

    portcullis_auth_web3_repo_tests::web3_auth_nonce_repository::test_consume_nonce_is_single_use(
        &harness.catalog,
    )
    .await;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_consume_nonce_missing_wallet() {
    let harness = InMemoryWeb3AuthNonceRepositoryHarness::new();

    portcullis_auth_web3_repo_tests::web3_auth_nonce_repository::test_consume_nonce_missing_wallet(
        &harness.catalog,
    )
    .await;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_consume_nonce_after_expiry() {
    let harness = InMemoryWeb3AuthNonceRepositoryHarness::new();

    portcullis_auth_web3_repo_tests::web3_auth_nonce_repository::test_consume_nonce_after_expiry(
        &harness.catalog,
    )
    .await;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_cleanup_expired_nonces() {
    let harness = InMemoryWeb3AuthNonceRepositoryHarness::new();

    portcullis_auth_web3_repo_tests::web3_auth_nonce_repository::test_cleanup_expired_nonces(
        &harness.catalog,
    )
    .await;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Harness
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

struct InMemoryWeb3AuthNonceRepositoryHarness {
    catalog: dill::Catalog,
}

impl InMemoryWeb3AuthNonceRepositoryHarness {
    pub fn new() -> Self {
        let mut b = dill::CatalogBuilder::new();
        b.add::<InMemoryWeb3AuthNonceRepository>();
        b.add_value(SystemTimeSourceStub::new());
        b.bind::<dyn SystemTimeSource, SystemTimeSourceStub>();

        Self { catalog: b.build() }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
