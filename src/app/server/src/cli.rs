// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::net::IpAddr;

use observability::init::LogFormat;
use url::Url;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, clap::Parser)]
#[command(
    name = crate::app::BINARY_NAME,
    version,
    about = "Challenge-response wallet authentication service",
)]
pub struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "127.0.0.1")]
    pub address: IpAddr,

    /// Port to listen on, `0` selects a random free port
    #[arg(long, default_value_t = 8080)]
    pub http_port: u16,

    /// Public base URL of this deployment that signed messages are scoped
    /// to. Set it when running behind a reverse proxy; defaults to the bound
    /// address
    #[arg(long)]
    pub base_url: Option<Url>,

    /// Seconds an issued nonce remains valid
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(i64).range(1..))]
    pub nonce_ttl_secs: i64,

    /// Seconds between sweeps that evict expired nonces from the store
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(i64).range(1..))]
    pub nonce_cleanup_interval_secs: i64,

    /// Log format: compact, pretty, json
    #[arg(long, default_value = "compact")]
    pub log_format: LogFormat,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////


////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
