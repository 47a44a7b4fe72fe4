//! Scoped codec sessions.
//!
//! [`DecoderSession`] and [`EncoderSession`] own a boxed codec and guarantee
//! that it is closed exactly once. Closing explicitly through
//! [`DecoderSession::close`] surfaces close errors; a session dropped while
//! still open (early return, `?`, panic unwind) is closed by `Drop`, which
//! can only log a failure.

use crate::codec::{Decoder, Encoder};
use crate::IoResult;
use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};

/// An open read session.
pub struct DecoderSession {
    inner: Box<dyn Decoder>,
    open: bool,
}

impl DecoderSession {
    /// Takes ownership of an opened decoder.
    pub fn new(inner: Box<dyn Decoder>) -> Self {
        Self { inner, open: true }
    }

    /// Closes the session and reports the codec's close result.
    pub fn close(mut self) -> IoResult<()> {
        self.open = false;
        self.inner.close()
    }
}

impl Deref for DecoderSession {
    type Target = dyn Decoder;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl DerefMut for DecoderSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.as_mut()
    }
}

impl Drop for DecoderSession {
    fn drop(&mut self) {
        if self.open {
            debug!(format = self.inner.format_name(), "closing decoder on drop");
            if let Err(e) = self.inner.close() {
                warn!(format = self.inner.format_name(), error = %e, "decoder close failed");
            }
        }
    }
}

/// An open write session.
pub struct EncoderSession {
    inner: Box<dyn Encoder>,
    open: bool,
}

impl EncoderSession {
    /// Takes ownership of an opened encoder.
    pub fn new(inner: Box<dyn Encoder>) -> Self {
        Self { inner, open: true }
    }

    /// Flushes and closes the session, reporting the codec's close result.
    pub fn close(mut self) -> IoResult<()> {
        self.open = false;
        self.inner.close()
    }
}

impl Deref for EncoderSession {
    type Target = dyn Encoder;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl DerefMut for EncoderSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.as_mut()
    }
}

impl Drop for EncoderSession {
    fn drop(&mut self) {
        if self.open {
            debug!(format = self.inner.format_name(), "closing encoder on drop");
            if let Err(e) = self.inner.close() {
                warn!(format = self.inner.format_name(), error = %e, "encoder close failed");
            }
        }
    }
}
