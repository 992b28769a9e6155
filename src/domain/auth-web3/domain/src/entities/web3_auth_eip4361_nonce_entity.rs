// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use chrono::{DateTime, Utc};

use crate::{EvmWalletAddress, Web3AuthenticationEip4361Nonce};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// A challenge issued to a wallet, alive until `expires_at` or until consumed
/// by a successful verification, whichever comes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Web3AuthEip4361NonceEntity {
    pub wallet_address: EvmWalletAddress,
    pub nonce: Web3AuthenticationEip4361Nonce,
    pub expires_at: DateTime<Utc>,
}

impl Web3AuthEip4361NonceEntity {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
