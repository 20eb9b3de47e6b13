//! response body
//!
//! the raw payload of a wire response. a body is owned by exactly one reader
//! and released once, either explicitly via [`ResponseBody::close`] or when
//! it is dropped.

use bytes::{Buf, Bytes};
use std::fmt;
use std::io::{self, Read};

type CloseHook = Box<dyn FnOnce() + Send>;

/// single-use readable response payload
pub struct ResponseBody {
    reader: Option<Box<dyn Read + Send>>,
    on_close: Option<CloseHook>,
}

impl ResponseBody {
    /// body over an in-memory buffer
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::from_reader(bytes.into().reader())
    }

    /// body over any blocking reader
    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Some(Box::new(reader)),
            on_close: None,
        }
    }

    /// run `hook` when the body is released
    ///
    /// transports use this to return connections or buffers.
    pub fn on_close(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(hook));
        self
    }

    /// true once the body has been released
    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    /// release the underlying reader; later calls are no-ops
    pub fn close(&mut self) {
        if let Some(reader) = self.reader.take() {
            drop(reader);
            if let Some(hook) = self.on_close.take() {
                hook();
            }
        }
    }
}

impl Read for ResponseBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.reader.as_mut() {
            Some(reader) => reader.read(buf),
            None => Err(io::Error::other("response body already closed")),
        }
    }
}

impl Drop for ResponseBody {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseBody")
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counted(bytes: &'static str) -> (ResponseBody, Arc<AtomicUsize>) {
        let closes = Arc::new(AtomicUsize::new(0));
        let hook = closes.clone();
        let body = ResponseBody::from_bytes(bytes).on_close(move || {
            hook.fetch_add(1, Ordering::SeqCst);
        });
        (body, closes)
    }

    #[test]
    fn test_read_then_close_once() {
        let (mut body, closes) = counted("{\"data\":{}}");
        let mut text = String::new();
        body.read_to_string(&mut text).unwrap();
        assert_eq!(text, "{\"data\":{}}");

        body.close();
        body.close();
        drop(body);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_closes() {
        let (body, closes) = counted("unread");
        drop(body);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_read_after_close_fails() {
        let (mut body, _) = counted("{}");
        body.close();
        assert!(body.is_closed());
        let mut buf = [0u8; 4];
        assert!(body.read(&mut buf).is_err());
    }
}
