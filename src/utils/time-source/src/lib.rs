// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Abstracts the system time source, allowing to rely on real time in
/// production code while substituting a controllable clock in tests.
#[async_trait::async_trait]
pub trait SystemTimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// SystemTimeSourceDefault
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct SystemTimeSourceDefault;

#[dill::component(pub)]
#[dill::interface(dyn SystemTimeSource)]
impl SystemTimeSourceDefault {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl SystemTimeSource for SystemTimeSourceDefault {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        let duration = duration.to_std().unwrap_or_default();

        tokio::time::sleep(duration).await;
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// SystemTimeSourceStub
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Returns a pre-set time, or the real system time until one is set.
pub struct SystemTimeSourceStub {
    t: Mutex<Option<DateTime<Utc>>>,
}

impl SystemTimeSourceStub {
    pub fn new() -> Self {
        Self {
            t: Mutex::new(None),
        }
    }

    pub fn new_set(t: DateTime<Utc>) -> Self {
        Self {
            t: Mutex::new(Some(t)),
        }
    }

    pub fn set(&self, t: DateTime<Utc>) {
        *self.t.lock().unwrap() = Some(t);
    }

    pub fn unset(&self) {
        *self.t.lock().unwrap() = None;
    }
}

#[async_trait::async_trait]
impl SystemTimeSource for SystemTimeSourceStub {
    fn now(&self) -> DateTime<Utc> {
        match *self.t.lock().unwrap() {
            None => Utc::now(),
            Some(t) => t,
        }
    }

    async fn sleep(&self, _duration: Duration) {
        // Stub time does not flow - a sleep is only a scheduling point
        tokio::task::yield_now().await;
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
