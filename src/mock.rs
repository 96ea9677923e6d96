//! # Mock Hooks
//!
//! Utilities for testing hook-driven rendering without writing a hook type
//! per test.
//!
//! Create a [`MockHook`], queue the calls you expect with
//! [`MockHook::expect_call`], hand a clone to the config and call
//! [`MockHook::verify`] once the render is done.
//!
//! ```ignore
//! let hook = MockHook::new();
//! hook.expect_call().link("mco:boss", "./boss").return_ok();
//!
//! let cfg = HalConfig::procedure_hook(hook.clone());
//! let doc = engine.render(json!({}), Some(&cfg), "/people/100").await?;
//! hook.verify();
//! ```

use crate::error::HookError;
use crate::hooks::HalPopulatable;
use crate::link::LinkSpec;
use crate::representation::Representation;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One scripted hook invocation.
struct Expectation {
    links: Vec<(String, LinkSpec)>,
    delay: Option<Duration>,
    response: Result<(), HookError>,
}

/// A hook that replays scripted calls in order.
///
/// Each call adds the scripted links, optionally sleeps, then returns the
/// scripted result. A call with nothing scripted panics.
#[derive(Clone, Default)]
pub struct MockHook {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    calls: Arc<AtomicUsize>,
}

impl MockHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next call.
    pub fn expect_call(&self) -> CallExpectationBuilder {
        CallExpectationBuilder {
            links: Vec::new(),
            delay: None,
            expectations: self.expectations.clone(),
        }
    }

    /// Number of times the hook has run.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Panics unless every scripted call has happened.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().len();
        if remaining != 0 {
            panic!("Not all hook expectations were met. {remaining} remaining");
        }
    }
}

#[async_trait]
impl HalPopulatable for MockHook {
    async fn populate(&self, rep: &mut Representation) -> Result<(), HookError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Some(expectation) = self.expectations.lock().pop_front() else {
            panic!("Unexpected hook call for {}", rep.self_href());
        };
        for (rel, spec) in expectation.links {
            rep.link(&rel, spec);
        }
        if let Some(delay) = expectation.delay {
            tokio::time::sleep(delay).await;
        }
        expectation.response
    }
}

/// Builder for a scripted call.
pub struct CallExpectationBuilder {
    links: Vec<(String, LinkSpec)>,
    delay: Option<Duration>,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl CallExpectationBuilder {
    /// Add a link during the call.
    pub fn link(mut self, rel: impl Into<String>, spec: impl Into<LinkSpec>) -> Self {
        self.links.push((rel.into(), spec.into()));
        self
    }

    /// Suspend for `delay` before completing.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn return_ok(self) {
        self.push(Ok(()));
    }

    pub fn return_err(self, msg: impl Into<String>) {
        self.push(Err(HookError::Failed(msg.into())));
    }

    fn push(self, response: Result<(), HookError>) {
        self.expectations.lock().push_back(Expectation {
            links: self.links,
            delay: self.delay,
            response,
        });
    }
}
