// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod evm_wallet_address;
mod signed_auth_message;
mod web3_auth_eip4361_nonce;
mod web3_auth_eip4361_nonce_entity;

pub use evm_wallet_address::*;
pub use signed_auth_message::*;
pub use web3_auth_eip4361_nonce::*;
pub use web3_auth_eip4361_nonce_entity::*;
