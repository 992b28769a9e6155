// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub type EvmWalletAddress = alloy_primitives::Address;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct EvmWalletAddressConvertor;

impl EvmWalletAddressConvertor {
    /// EIP-55 mixed-case rendition, used everywhere an address leaves the
    /// process (storage keys, API responses, log fields).
    pub fn checksummed_string(address: &EvmWalletAddress) -> String {
        address.to_checksum(None)
    }

    /// Accepts any-case hex with an optional `0x` prefix. Checksum
    /// normalization happens on output, not on input.
    pub fn parse(raw: &str) -> Result<EvmWalletAddress, InvalidEvmWalletAddressError> {
        raw.parse()
            .map_err(|_| InvalidEvmWalletAddressError { raw: raw.into() })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid EVM wallet address: {raw}")]
pub struct InvalidEvmWalletAddressError {
    pub raw: String,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
