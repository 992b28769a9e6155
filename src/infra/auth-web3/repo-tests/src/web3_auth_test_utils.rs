// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use chrono::{DateTime, Utc};
use portcullis_auth_web3::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub fn make_test_wallet(seed: u8) -> EvmWalletAddress {
    EvmWalletAddress::from([seed; 20])
}

pub fn make_test_nonce_entity(
    wallet_address: EvmWalletAddress,
    expires_at: DateTime<Utc>,
) -> Web3AuthEip4361NonceEntity {
    Web3AuthEip4361NonceEntity {
        wallet_address,
        nonce: Web3AuthenticationEip4361Nonce::new(),
        expires_at,
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
