// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod api_server;
mod app;
mod cli;
mod nonce_cleanup;

use clap::Parser as _;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn main() {
    let args = cli::Cli::parse();

    observability::init::init_tracing(app::DEFAULT_RUST_LOG, args.log_format);
    observability::set_hook_trace_panics(false);

    let runtime = tokio::runtime::Runtime::new().unwrap();

    match runtime.block_on(app::run(args)) {
        Ok(()) => {}
        Err(e) => {
            tracing::error!(error = ?e, "Server exited with an error");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
