/// Per-request metric state, or nothing when metrics are disabled.
///
/// Callers run the same code path either way; every recording method on a
/// disabled capture is a no-op.
pub struct Capture<S>(Option<S>);

impl<S> Default for Capture<S> {
    fn default() -> Self {
        Self::disabled()
    }
}

impl<S> Capture<S> {
    pub fn disabled() -> Self {
        Self(None)
    }

    pub fn enabled(state: S) -> Self {
        Self(Some(state))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    pub fn take(self) -> Option<S> {
        self.0
    }

    pub fn as_mut(&mut self) -> Option<&mut S> {
        self.0.as_mut()
    }
}
