// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::future::IntoFuture;
use std::net::SocketAddr;

use dill::Catalog;
use observability::axum::unknown_fallback_handler;
use utoipa_axum::router::OpenApiRouter;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct TestAPIServer {
    server_future: Box<dyn std::future::Future<Output = Result<(), std::io::Error>> + Unpin + Send>,
    local_addr: SocketAddr,
}

impl TestAPIServer {
    pub fn new(catalog: Catalog, listener: tokio::net::TcpListener) -> Self {
        let (router, api) = OpenApiRouter::new()
            .nest(
                "/auth-web3",
                portcullis_adapter_http::auth_web3::root_router(),
            )
            .layer(
                tower::ServiceBuilder::new()
                    .layer(
                        tower_http::cors::CorsLayer::new()
                            .allow_origin(tower_http::cors::Any)
                            .allow_methods(vec![http::Method::GET, http::Method::POST])
                            .allow_headers(tower_http::cors::Any),
                    )
                    .layer(axum::extract::Extension(catalog)),
            )
            .split_for_parts();

        let router = router
            .route(
                "/openapi.json",
                axum::routing::get(move || async move { axum::Json(api) }),
            )
            .fallback(unknown_fallback_handler);

        let local_addr = listener.local_addr().unwrap();

        let server_future =
            Box::new(axum::serve(listener, router.into_make_service()).into_future());

        Self {
            server_future,
            local_addr,
        }
    }

    pub fn local_addr(&self) -> &SocketAddr {
        &self.local_addr
    }

    pub async fn run(self) -> Result<(), std::io::Error> {
        self.server_future.await
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
