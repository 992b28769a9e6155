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

use chrono::Duration;
use dill::Catalog;
use internal_error::{InternalError, ResultIntoInternal};
use observability::axum::unknown_fallback_handler;
use utoipa::OpenApi as _;
use utoipa_axum::router::OpenApiRouter;

use crate::nonce_cleanup::NonceCleanupJob;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct APIServer {
    server_future: Box<dyn std::future::Future<Output = Result<(), std::io::Error>> + Unpin + Send>,
    local_addr: SocketAddr,
    nonce_cleanup: NonceCleanupJob,
}

impl APIServer {
    pub fn new(
        catalog: Catalog,
        listener: tokio::net::TcpListener,
        nonce_cleanup_interval: Duration,
    ) -> Self {
        let nonce_cleanup = NonceCleanupJob::new(&catalog, nonce_cleanup_interval);

        let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
            .nest("/auth-web3", portcullis_adapter_http::auth_web3::root_router())
            .layer(
                tower::ServiceBuilder::new()
                    .layer(tower_http::trace::TraceLayer::new_for_http())
                    .layer(
                        tower_http::cors::CorsLayer::new()
                            .allow_origin(tower_http::cors::Any)
                            .allow_methods(vec![http::Method::GET, http::Method::POST])
                            .allow_headers(tower_http::cors::Any),
                    )
                    .layer(axum::extract::Extension(catalog)),
            )
            .fallback(unknown_fallback_handler)
            .split_for_parts();

        let router = router
            .route(
                "/openapi.json",
                axum::routing::get(move || async move { axum::Json(api) }),
            )
            .route(
                "/system/health",
                axum::routing::get(observability::health::health_handler),
            );

        let local_addr = listener.local_addr().unwrap();

        let server_future =
            Box::new(axum::serve(listener, router.into_make_service()).into_future());

        Self {
            server_future,
            local_addr,
            nonce_cleanup,
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub async fn run(self) -> Result<(), InternalError> {
        tokio::select! {
            res = self.server_future => res.int_err(),
            res = self.nonce_cleanup.run() => res,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "Portcullis",
        description = "Challenge-response wallet authentication over signed EIP-4361 messages",
    ),
    tags(
        (name = "portcullis", description = "Wallet authentication endpoints"),
    ),
)]
struct ApiDoc;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
