// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod wallet_authentication_service;
mod wallet_signature_verifier;
mod web3_nonce_service;

pub use wallet_authentication_service::*;
pub use wallet_signature_verifier::*;
pub use web3_nonce_service::*;
