// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::str::FromStr;

use thiserror::Error;

use crate::EvmWalletAddress;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// An EIP-4361 ("Sign-In with Ethereum") message decoded from its textual
/// form. Decoding is purely structural - matching the decoded fields against
/// the expected nonce, host, and endpoint is the caller's responsibility.
pub struct SignedAuthMessage {
    message: siwe::Message,
}

impl SignedAuthMessage {
    pub fn parse(raw: &str) -> Result<Self, MalformedAuthMessageError> {
        let message = siwe::Message::from_str(raw).map_err(|e| MalformedAuthMessageError {
            reason: e.to_string(),
        })?;

        Ok(Self { message })
    }

    /// Host (and optional port) the signing client claimed to be talking to
    pub fn domain(&self) -> String {
        self.message.domain.to_string()
    }

    pub fn nonce(&self) -> &str {
        &self.message.nonce
    }

    pub fn wallet_address(&self) -> EvmWalletAddress {
        EvmWalletAddress::from(self.message.address)
    }

    /// Endpoint URI the message was scoped to
    pub fn uri(&self) -> String {
        self.message.uri.to_string()
    }

    pub fn as_eip4361(&self) -> &siwe::Message {
        &self.message
    }
}

impl std::fmt::Debug for SignedAuthMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedAuthMessage")
            .field("domain", &self.domain())
            .field("wallet_address", &self.wallet_address())
            .field("uri", &self.uri())
            .field("nonce", &self.nonce())
            .finish_non_exhaustive()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug, PartialEq, Eq)]
#[error("authentication message is malformed: {reason}")]
pub struct MalformedAuthMessageError {
    pub reason: String,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
