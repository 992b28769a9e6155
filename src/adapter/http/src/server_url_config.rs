// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use url::Url;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Public URLs this deployment is reachable at, as seen by clients. Signed
/// messages are checked against these, not against whatever interface the
/// server happens to listen on.
#[derive(Debug, Clone)]
pub struct ServerUrlConfig {
    /// Base URL of the REST API, treated as a directory (trailing slash
    /// significant for joining)
    pub base_url_rest: Url,
}

impl ServerUrlConfig {
    pub fn new(base_url_rest: Url) -> Self {
        Self { base_url_rest }
    }

    /// Canonical URL of the verify endpoint that signed messages must be
    /// scoped to
    pub fn wallet_verification_endpoint(&self) -> Url {
        // Joining a fixed relative path onto an absolute base cannot fail
        self.base_url_rest.join("auth-web3/verify").unwrap()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
