use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::PixelveilError;
use crate::result::Result;

/// Cooperative cancellation for long running embed, extract and sequence generation.
///
/// The token is owned by the caller, clones share the same flag. Workers poll it
/// between scan lines and bail out with [`PixelveilError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(PixelveilError::Cancelled);
        }
        Ok(())
    }
}
