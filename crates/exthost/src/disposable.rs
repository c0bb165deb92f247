//! Revocable registrations.

use std::fmt;

/// The lifetime of one registration or subscription.
///
/// Owned by whichever side created it. Disposing releases the underlying
/// resource; doing it again is a no-op.
pub struct Disposable {
    action: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Disposable {
    pub fn new(action: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self { action: Some(Box::new(action)) }
    }

    /// A disposable with nothing to release.
    pub fn noop() -> Self {
        Self { action: None }
    }

    /// Releases the resource. Idempotent.
    pub fn dispose(&mut self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.action.is_none()
    }
}

impl fmt::Debug for Disposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposable")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
