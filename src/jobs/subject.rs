//! # Job subjects.
//!
//! [`JobSubject`] names the server-side job a poll session drives.

use std::fmt;
use std::sync::Arc;

/// Opaque identifier of a server-side job (e.g. a document id).
///
/// Cheap to clone. Kept raw here; it is percent-encoded only when placed into a URL path.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobSubject(Arc<str>);

impl JobSubject {
    /// Creates a subject from anything string-like.
    pub fn new(subject: impl Into<Arc<str>>) -> Self {
        Self(subject.into())
    }

    /// Returns the raw subject.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for JobSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobSubject({:?})", &*self.0)
    }
}

impl AsRef<str> for JobSubject {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobSubject {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for JobSubject {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&JobSubject> for JobSubject {
    fn from(s: &JobSubject) -> Self {
        s.clone()
    }
}

impl From<&JobSubject> for Arc<str> {
    fn from(s: &JobSubject) -> Self {
        Arc::clone(&s.0)
    }
}
