// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Resolves one or more components from a [`dill::Catalog`], returning a tuple
/// when called with several types:
///
/// ```ignore
/// let (nonce_service, url_config) =
///     from_catalog_n!(catalog, dyn Web3NonceService, ServerUrlConfig);
/// ```
macro_rules! from_catalog_n {
    ($catalog:expr, $T:ty $(,)?) => {{
        let catalog: &dill::Catalog = &$catalog;
        catalog.get_one::<$T>().unwrap()
    }};
    ($catalog:expr, $T:ty, $($Ts:ty),+ $(,)?) => {{
        let catalog: &dill::Catalog = &$catalog;
        (
            catalog.get_one::<$T>().unwrap(),
            $(catalog.get_one::<$Ts>().unwrap()),+
        )
    }};
}

pub(crate) use from_catalog_n;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
