// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use chrono::Duration;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub const DEFAULT_NONCE_VALIDITY_WINDOW_SECONDS: i64 = 600;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// One validity window governs both sides of the nonce lifecycle: the TTL a
/// stored nonce is issued with, and the maximum age accepted for a
/// client-supplied fallback nonce.
#[derive(Debug, Clone)]
pub struct Web3AuthNonceConfig {
    pub nonce_validity_window: Duration,
}

impl Web3AuthNonceConfig {
    pub fn new(nonce_validity_window: Duration) -> Self {
        Self {
            nonce_validity_window,
        }
    }
}

impl Default for Web3AuthNonceConfig {
    fn default() -> Self {
        Self {
            nonce_validity_window: Duration::seconds(DEFAULT_NONCE_VALIDITY_WINDOW_SECONDS),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
