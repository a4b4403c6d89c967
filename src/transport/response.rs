//! # Responses as seen by the retry loop.
//!
//! The retry loop only needs a status code and a way to give the underlying
//! connection back before the next attempt. [`Response`] captures exactly that and is
//! implemented for the crate's own [`Reply`] and for [`reqwest::Response`].

/// A reply that can be classified and released.
pub trait Response {
    /// HTTP status code.
    fn status(&self) -> u16;

    /// Releases the reply's resources (connection, buffered body).
    ///
    /// Called by the transport on a retryable reply **before** sleeping. The default
    /// drops `self`, which is sufficient for owned buffers and pooled connections.
    fn release(self)
    where
        Self: Sized,
    {
        drop(self);
    }
}

/// Fully buffered reply produced by an [`Exchange`](crate::Exchange).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    /// HTTP status code.
    pub status: u16,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl Reply {
    /// Creates a reply.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for `2xx`.
    #[inline]
    pub fn is_success(&self) -> bool {
        crate::policies::is_success(self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl Response for Reply {
    fn status(&self) -> u16 {
        self.status
    }
}

impl Response for reqwest::Response {
    fn status(&self) -> u16 {
        reqwest::Response::status(self).as_u16()
    }
}
