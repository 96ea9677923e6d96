//! Programmatic population hooks.
//!
//! A route's `prepare` hook is a [`HalPopulatable`]. Implement the trait for
//! hooks that need to await something; wrap a plain closure with
//! [`FnHook`] (or [`HalConfig::procedure`](crate::HalConfig::procedure))
//! when the work is synchronous.

use crate::error::HookError;
use crate::representation::Representation;
use async_trait::async_trait;

/// Something that can add links and embeds to a representation in progress.
///
/// The engine awaits the returned future before moving to the next phase.
/// Returning an error aborts the whole response.
#[async_trait]
pub trait HalPopulatable: Send + Sync {
    async fn populate(&self, rep: &mut Representation) -> Result<(), HookError>;
}

/// Adapter turning a synchronous closure into a [`HalPopulatable`].
pub struct FnHook<F>(pub F);

#[async_trait]
impl<F> HalPopulatable for FnHook<F>
where
    F: Fn(&mut Representation) -> Result<(), HookError> + Send + Sync,
{
    async fn populate(&self, rep: &mut Representation) -> Result<(), HookError> {
        (self.0)(rep)
    }
}
