// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::net::SocketAddr;

use chrono::Duration;
use dill::CatalogBuilder;
use internal_error::{InternalError, ResultIntoInternal};
use portcullis_adapter_http::ServerUrlConfig;
use portcullis_auth_web3::Web3AuthNonceConfig;
use portcullis_auth_web3_inmem::InMemoryWeb3AuthNonceRepository;
use portcullis_auth_web3_services::{
    Eip191WalletSignatureVerifier,
    WalletAuthenticationServiceImpl,
    Web3NonceServiceImpl,
};
use time_source::SystemTimeSourceDefault;
use url::Url;

use crate::api_server::APIServer;
use crate::cli::Cli;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub const BINARY_NAME: &str = "portcullis-server";
pub const DEFAULT_RUST_LOG: &str = "info";

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn run(args: Cli) -> Result<(), InternalError> {
    let addr = SocketAddr::from((args.address, args.http_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context_int_err(format!("binding {addr}"))?;
    let local_addr = listener.local_addr().int_err()?;

    // Unless told otherwise, assume clients reach us directly at the bound
    // address
    let base_url_rest = args
        .base_url
        .clone()
        .unwrap_or_else(|| Url::parse(&format!("http://{local_addr}/")).unwrap());

    let server_url_config = ServerUrlConfig::new(base_url_rest);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        args = ?args,
        verification_endpoint = %server_url_config.wallet_verification_endpoint(),
        "Starting {BINARY_NAME}",
    );

    let catalog = configure_catalog(
        server_url_config,
        Duration::seconds(args.nonce_ttl_secs),
    )
    .build();

    let api_server = APIServer::new(
        catalog,
        listener,
        Duration::seconds(args.nonce_cleanup_interval_secs),
    );

    tracing::info!(
        "API server is listening on: http://{}",
        api_server.local_addr()
    );

    tokio::select! {
        res = api_server.run() => res,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down, Ctrl+C pressed");
            Ok(())
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub fn configure_catalog(
    server_url_config: ServerUrlConfig,
    nonce_ttl: Duration,
) -> CatalogBuilder {
    let mut b = CatalogBuilder::new();

    b.add::<SystemTimeSourceDefault>();

    b.add::<InMemoryWeb3AuthNonceRepository>();

    b.add::<Web3NonceServiceImpl>();
    b.add::<Eip191WalletSignatureVerifier>();
    b.add::<WalletAuthenticationServiceImpl>();

    b.add_value(Web3AuthNonceConfig::new(nonce_ttl));
    b.add_value(server_url_config);

    b
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
