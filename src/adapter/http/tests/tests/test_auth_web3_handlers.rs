// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use http_common::ApiErrorResponse;
use internal_error::{InternalError, ResultIntoInternal};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use portcullis_adapter_http::ServerUrlConfig;
use portcullis_adapter_http::auth_web3::{
    ChallengeRequestBody,
    ChallengeResponseBody,
    VerifyRequestBody,
    VerifyResponseBody,
};
use portcullis_auth_web3::{EvmWalletAddress, EvmWalletAddressConvertor, Web3AuthNonceConfig};
use portcullis_auth_web3_inmem::InMemoryWeb3AuthNonceRepository;
use portcullis_auth_web3_services::{
    Eip191WalletSignatureVerifier,
    WalletAuthenticationServiceImpl,
    Web3NonceServiceImpl,
};
use time_source::{SystemTimeSource, SystemTimeSourceStub};
use url::Url;

use crate::harness::{TestAPIServer, await_client_server_flow};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

const TEST_WALLET_ADDRESS: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

const FALLBACK_NONCE: &str = "aBcDeF1234567890q";

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

struct Harness {
    api_server: TestAPIServer,
    time_source_stub: Arc<SystemTimeSourceStub>,
}

impl Harness {
    async fn new() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let local_addr = listener.local_addr().unwrap();

        // Signed messages are checked against the public base URL, so tests
        // make it point at the very socket the server listens on
        let base_url_rest = Url::parse(&format!("http://{local_addr}/")).unwrap();

        let catalog = {
            let mut b = dill::CatalogBuilder::new();

            b.add::<WalletAuthenticationServiceImpl>()
                .add::<Web3NonceServiceImpl>()
                .add::<Eip191WalletSignatureVerifier>()
                .add::<InMemoryWeb3AuthNonceRepository>()
                .add_value(Web3AuthNonceConfig::default())
                .add_value(ServerUrlConfig::new(base_url_rest))
                .add_value(SystemTimeSourceStub::new_set(frozen_time()))
                .bind::<dyn SystemTimeSource, SystemTimeSourceStub>();

            b.build()
        };

        let time_source_stub = catalog.get_one::<SystemTimeSourceStub>().unwrap();
        let api_server = TestAPIServer::new(catalog, listener);

        Self {
            api_server,
            time_source_stub,
        }
    }

    fn api_server_addr(&self) -> String {
        self.api_server.local_addr().to_string()
    }

    fn challenge_url(&self) -> String {
        format!("http://{}/auth-web3/challenge", self.api_server_addr())
    }

    fn verify_url(&self) -> String {
        format!("http://{}/auth-web3/verify", self.api_server_addr())
    }

    async fn api_server_run(self) -> Result<(), InternalError> {
        self.api_server.run().await.int_err()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_challenge_issues_nonce_with_validity_window() {
    let harness = Harness::new().await;
    let challenge_url = harness.challenge_url();

    let client = async move {
        let client = reqwest::Client::new();

        let challenge_response = client
            .post(challenge_url)
            .json(&ChallengeRequestBody {
                wallet_address: TEST_WALLET_ADDRESS.to_lowercase(),
            })
            .send()
            .await
            .unwrap();
        assert_eq!(200, challenge_response.status());

        let challenge = challenge_response
            .json::<ChallengeResponseBody>()
            .await
            .unwrap();

        // Case-normalized on output even when submitted lowercase
        pretty_assertions::assert_eq!(TEST_WALLET_ADDRESS, challenge.wallet_address);
        pretty_assertions::assert_eq!(frozen_time() + Duration::seconds(600), challenge.expires_at);

        assert!(challenge.nonce.len() >= 8);
        assert!(challenge.nonce.chars().all(|c| c.is_ascii_alphanumeric()));
    };

    await_client_server_flow!(harness.api_server_run(), client);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_challenge_rejects_malformed_wallet() {
    let harness = Harness::new().await;
    let challenge_url = harness.challenge_url();

    let client = async move {
        let client = reqwest::Client::new();

        let challenge_response = client
            .post(challenge_url)
            .json(&ChallengeRequestBody {
                wallet_address: "not-a-wallet".to_string(),
            })
            .send()
            .await
            .unwrap();
        assert_eq!(400, challenge_response.status());

        let error = challenge_response.json::<ApiErrorResponse>().await.unwrap();
        pretty_assertions::assert_eq!("invalid EVM wallet address: not-a-wallet", error.message);
    };

    await_client_server_flow!(harness.api_server_run(), client);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_verify_query_variant_round_trip() {
    let harness = Harness::new().await;

    let api_server_addr = harness.api_server_addr();
    let challenge_url = harness.challenge_url();
    let verify_url = harness.verify_url();

    let client = async move {
        let client = reqwest::Client::new();

        let (signing_key, wallet) = make_signing_wallet();
        let wallet_str = EvmWalletAddressConvertor::checksummed_string(&wallet);

        let challenge = client
            .post(challenge_url)
            .json(&ChallengeRequestBody {
                wallet_address: wallet_str.clone(),
            })
            .send()
            .await
            .unwrap()
            .json::<ChallengeResponseBody>()
            .await
            .unwrap();

        let message = make_message_text(&api_server_addr, &verify_url, &wallet, &challenge.nonce);
        let signature = sign_eip191(&signing_key, &message);

        let verify_response = client
            .get(&verify_url)
            .query(&[
                ("message", message.as_str()),
                ("signature", signature.as_str()),
                ("address", wallet_str.as_str()),
            ])
            .send()
            .await
            .unwrap();
        assert_eq!(200, verify_response.status());

        let verified = verify_response.json::<VerifyResponseBody>().await.unwrap();
        pretty_assertions::assert_eq!(wallet_str, verified.address);

        // The nonce is consumed - replaying the very same request is refused
        let replay_response = client
            .get(&verify_url)
            .query(&[
                ("message", message.as_str()),
                ("signature", signature.as_str()),
                ("address", wallet_str.as_str()),
            ])
            .send()
            .await
            .unwrap();
        assert_eq!(401, replay_response.status());

        let error = replay_response.json::<ApiErrorResponse>().await.unwrap();
        pretty_assertions::assert_eq!(
            format!("no nonce on record for wallet: {wallet_str}"),
            error.message
        );
    };

    await_client_server_flow!(harness.api_server_run(), client);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_verify_rejects_challenge_past_validity_window() {
    let harness = Harness::new().await;

    let api_server_addr = harness.api_server_addr();
    let challenge_url = harness.challenge_url();
    let verify_url = harness.verify_url();
    let time_source_stub = harness.time_source_stub.clone();

    let client = async move {
        let client = reqwest::Client::new();

        let (signing_key, wallet) = make_signing_wallet();
        let wallet_str = EvmWalletAddressConvertor::checksummed_string(&wallet);

        let challenge = client
            .post(challenge_url)
            .json(&ChallengeRequestBody {
                wallet_address: wallet_str.clone(),
            })
            .send()
            .await
            .unwrap()
            .json::<ChallengeResponseBody>()
            .await
            .unwrap();

        let message = make_message_text(&api_server_addr, &verify_url, &wallet, &challenge.nonce);
        let signature = sign_eip191(&signing_key, &message);

        // At the reported expiry instant the challenge behaves as never
        // issued, even for a correctly signed message
        time_source_stub.set(challenge.expires_at);

        let verify_response = client
            .get(&verify_url)
            .query(&[
                ("message", message.as_str()),
                ("signature", signature.as_str()),
                ("address", wallet_str.as_str()),
            ])
            .send()
            .await
            .unwrap();
        assert_eq!(401, verify_response.status());

        let error = verify_response.json::<ApiErrorResponse>().await.unwrap();
        pretty_assertions::assert_eq!(
            format!("no nonce on record for wallet: {wallet_str}"),
            error.message
        );
    };

    await_client_server_flow!(harness.api_server_run(), client);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_verify_json_variant_accepts_fallback_nonce() {
    let harness = Harness::new().await;

    let api_server_addr = harness.api_server_addr();
    let verify_url = harness.verify_url();

    let client = async move {
        let client = reqwest::Client::new();

        let (signing_key, wallet) = make_signing_wallet();
        let wallet_str = EvmWalletAddressConvertor::checksummed_string(&wallet);

        // No challenge was ever issued - the client carries the nonce itself
        let message = make_message_text(&api_server_addr, &verify_url, &wallet, FALLBACK_NONCE);
        let signature = sign_eip191(&signing_key, &message);

        let verify_response = client
            .post(&verify_url)
            .json(&VerifyRequestBody {
                message: message.clone(),
                signature: signature.clone(),
                address: wallet_str.clone(),
                nonce: Some(FALLBACK_NONCE.to_string()),
                issued_at_ms: Some(frozen_time().timestamp_millis()),
            })
            .send()
            .await
            .unwrap();
        assert_eq!(200, verify_response.status());

        let verified = verify_response.json::<VerifyResponseBody>().await.unwrap();
        pretty_assertions::assert_eq!(wallet_str, verified.address);

        // A fallback nonce older than the validity window is refused
        let stale_issued_at = frozen_time() - Duration::milliseconds(600_001);
        let stale_response = client
            .post(&verify_url)
            .json(&VerifyRequestBody {
                message,
                signature,
                address: wallet_str,
                nonce: Some(FALLBACK_NONCE.to_string()),
                issued_at_ms: Some(stale_issued_at.timestamp_millis()),
            })
            .send()
            .await
            .unwrap();
        assert_eq!(401, stale_response.status());

        let error = stale_response.json::<ApiErrorResponse>().await.unwrap();
        pretty_assertions::assert_eq!(
            format!("nonce issued at {stale_issued_at} is outside the validity window"),
            error.message
        );
    };

    await_client_server_flow!(harness.api_server_run(), client);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_verify_json_variant_rejects_half_of_fallback_pair() {
    let harness = Harness::new().await;
    let verify_url = harness.verify_url();

    let client = async move {
        let client = reqwest::Client::new();

        let verify_response = client
            .post(&verify_url)
            .json(&VerifyRequestBody {
                message: "irrelevant".to_string(),
                signature: "irrelevant".to_string(),
                address: TEST_WALLET_ADDRESS.to_string(),
                nonce: Some(FALLBACK_NONCE.to_string()),
                issued_at_ms: None,
            })
            .send()
            .await
            .unwrap();
        assert_eq!(400, verify_response.status());

        let error = verify_response.json::<ApiErrorResponse>().await.unwrap();
        pretty_assertions::assert_eq!(
            "nonce and issued_at_ms must be supplied together",
            error.message
        );
    };

    await_client_server_flow!(harness.api_server_run(), client);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_verify_rejects_empty_inputs() {
    let harness = Harness::new().await;
    let verify_url = harness.verify_url();

    let client = async move {
        let client = reqwest::Client::new();

        let verify_response = client
            .get(&verify_url)
            .query(&[
                ("message", ""),
                ("signature", ""),
                ("address", TEST_WALLET_ADDRESS),
            ])
            .send()
            .await
            .unwrap();
        assert_eq!(400, verify_response.status());

        let error = verify_response.json::<ApiErrorResponse>().await.unwrap();
        pretty_assertions::assert_eq!(
            "authentication message and signature must be provided",
            error.message
        );
    };

    await_client_server_flow!(harness.api_server_run(), client);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_verify_rejects_foreign_domain() {
    let harness = Harness::new().await;

    let api_server_addr = harness.api_server_addr();
    let challenge_url = harness.challenge_url();
    let verify_url = harness.verify_url();

    let client = async move {
        let client = reqwest::Client::new();

        let (signing_key, wallet) = make_signing_wallet();
        let wallet_str = EvmWalletAddressConvertor::checksummed_string(&wallet);

        let challenge = client
            .post(challenge_url)
            .json(&ChallengeRequestBody {
                wallet_address: wallet_str.clone(),
            })
            .send()
            .await
            .unwrap()
            .json::<ChallengeResponseBody>()
            .await
            .unwrap();

        // Signed for another site entirely
        let message = make_message_text("evil.example.com", &verify_url, &wallet, &challenge.nonce);
        let signature = sign_eip191(&signing_key, &message);

        let verify_response = client
            .get(&verify_url)
            .query(&[
                ("message", message.as_str()),
                ("signature", signature.as_str()),
                ("address", wallet_str.as_str()),
            ])
            .send()
            .await
            .unwrap();
        assert_eq!(401, verify_response.status());

        let error = verify_response.json::<ApiErrorResponse>().await.unwrap();
        pretty_assertions::assert_eq!(
            format!(
                "message domain 'evil.example.com' does not match request host \
                 '{api_server_addr}'"
            ),
            error.message
        );
    };

    await_client_server_flow!(harness.api_server_run(), client);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_verify_honors_forwarded_host() {
    let harness = Harness::new().await;

    let challenge_url = harness.challenge_url();
    let verify_url = harness.verify_url();

    let client = async move {
        let client = reqwest::Client::new();

        let (signing_key, wallet) = make_signing_wallet();
        let wallet_str = EvmWalletAddressConvertor::checksummed_string(&wallet);

        let challenge = client
            .post(challenge_url)
            .json(&ChallengeRequestBody {
                wallet_address: wallet_str.clone(),
            })
            .send()
            .await
            .unwrap()
            .json::<ChallengeResponseBody>()
            .await
            .unwrap();

        // Behind a reverse proxy the client-facing host differs from the
        // socket the server listens on
        let message = make_message_text("node.example.com", &verify_url, &wallet, &challenge.nonce);
        let signature = sign_eip191(&signing_key, &message);

        let verify_response = client
            .get(&verify_url)
            .header("x-forwarded-host", "node.example.com")
            .query(&[
                ("message", message.as_str()),
                ("signature", signature.as_str()),
                ("address", wallet_str.as_str()),
            ])
            .send()
            .await
            .unwrap();
        assert_eq!(200, verify_response.status());

        let verified = verify_response.json::<VerifyResponseBody>().await.unwrap();
        pretty_assertions::assert_eq!(wallet_str, verified.address);
    };

    await_client_server_flow!(harness.api_server_run(), client);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_openapi_document_lists_auth_routes() {
    let harness = Harness::new().await;
    let openapi_url = format!("http://{}/openapi.json", harness.api_server_addr());

    let client = async move {
        let client = reqwest::Client::new();

        let response = client.get(openapi_url).send().await.unwrap();
        assert_eq!(200, response.status());

        let document = response.json::<serde_json::Value>().await.unwrap();
        let paths = document["paths"].as_object().unwrap();

        assert!(paths.contains_key("/auth-web3/challenge"));
        assert!(paths.contains_key("/auth-web3/verify"));
    };

    await_client_server_flow!(harness.api_server_run(), client);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Helpers
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn frozen_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2050, 1, 1, 12, 0, 0).unwrap()
}

fn make_signing_wallet() -> (SigningKey, EvmWalletAddress) {
    let signing_key = SigningKey::random(&mut rand::thread_rng());

    let uncompressed_public_key = signing_key.verifying_key().to_encoded_point(false);
    let public_key_hash = alloy_primitives::keccak256(&uncompressed_public_key.as_bytes()[1..]);
    let wallet = EvmWalletAddress::from_slice(&public_key_hash[12..]);

    (signing_key, wallet)
}

fn sign_eip191(signing_key: &SigningKey, message_text: &str) -> String {
    let prefixed_message = format!(
        "\x19Ethereum Signed Message:\n{}{message_text}",
        message_text.len()
    );
    let digest = alloy_primitives::keccak256(prefixed_message.as_bytes());

    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable(digest.as_slice())
        .unwrap();

    let mut signature_bytes = signature.to_vec();
    signature_bytes.push(recovery_id.to_byte() + 27);

    format!("0x{}", hex::encode(signature_bytes))
}

fn make_message_text(domain: &str, uri: &str, wallet: &EvmWalletAddress, nonce: &str) -> String {
    format!(
        "{domain} wants you to sign in with your Ethereum account:\n\
         {wallet}\n\
         \n\
         \n\
         URI: {uri}\n\
         Version: 1\n\
         Chain ID: 1\n\
         Nonce: {nonce}\n\
         Issued At: 2050-01-01T12:00:00Z",
        wallet = EvmWalletAddressConvertor::checksummed_string(wallet),
    )
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
