//! Password handling.

use std::fmt;

const MASK: &str = "********";

/// A password that never prints itself.
///
/// `Debug` and `Display` both render a fixed mask, so a `Secret` can sit in
/// structs that are logged with `{:?}` without leaking. The buffer is
/// overwritten when the value is dropped.
///
/// Zeroing is best effort. It covers the buffer this value owns at drop
/// time and nothing else: every [`Clone`] is a separate allocation that is
/// only cleared when that clone drops, and the `String` a `Secret` is built
/// from may already have left reallocated copies behind. Plaintext handed
/// out by [`Secret::expose`] and copied elsewhere (request headers, the
/// settings file) is outside its reach.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a plaintext value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the plaintext. Call sites should be limited to where the
    /// password actually leaves the process (auth headers, the settings file).
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the password is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The mask shown in place of the value.
    pub const fn masked() -> &'static str {
        MASK
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({MASK})")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        let mut bytes = std::mem::take(&mut self.0).into_bytes();
        bytes.iter_mut().for_each(|b| *b = 0);
        std::hint::black_box(&bytes);
    }
}
