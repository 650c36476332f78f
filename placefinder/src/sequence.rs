//! Ordering of asynchronous responses.
//!
//! Requests are not cancelled when a newer one is issued. Instead every request gets an id from a
//! [`RequestSequence`], and a response is applied only if its id is still the latest one.

use std::fmt::{Display, Formatter};

/// Identifier of a request issued by a [`RequestSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Numeric value of the id. Ids of one sequence grow monotonically.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic counter of the requests of one channel (e.g. suggestions or nearby places).
#[derive(Debug, Default, Clone)]
pub struct RequestSequence {
    last_issued: u64,
    latest: Option<RequestId>,
}

impl RequestSequence {
    /// Creates a sequence that has not issued anything yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new id. All ids issued before it become stale.
    pub fn issue(&mut self) -> RequestId {
        self.last_issued += 1;
        let id = RequestId(self.last_issued);
        self.latest = Some(id);
        id
    }

    /// The id whose response is still awaited, if any.
    pub fn latest(&self) -> Option<RequestId> {
        self.latest
    }

    /// Returns true if a response to the `id` request should be applied.
    pub fn is_latest(&self, id: RequestId) -> bool {
        self.latest == Some(id)
    }

    /// Makes all issued ids stale without issuing a new one.
    pub fn invalidate(&mut self) {
        self.latest = None;
    }
}
