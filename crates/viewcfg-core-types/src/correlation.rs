//! Correlation types for request tracking
//!
//! A view save or lookup arrives from an upstream request layer that has
//! already authenticated the caller. These types carry the request identity
//! and the acting role through the engine so logs and errors can be tied
//! back to the request that produced them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a UUIDv7-backed string identifier
macro_rules! correlation_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh, time-ordered identifier
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Adopt an identifier minted upstream
            pub fn from_string(s: String) -> Self {
                Self(s)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

correlation_id!(
    /// Identifier of a single request to the engine
    RequestId
);

correlation_id!(
    /// Trace identifier propagated from the upstream request layer
    TraceId
);

/// Context carried through operation boundaries
///
/// `acting_role` is the role of the authenticated session. It is used as the
/// fallback role set when a saved view names no roles of its own.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub trace_id: Option<TraceId>,
    pub acting_role: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Context for a request whose id was assigned upstream
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            trace_id: None,
            acting_role: None,
        }
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Set the role of the session performing the request
    pub fn with_acting_role(mut self, role: impl Into<String>) -> Self {
        self.acting_role = Some(role.into());
        self
    }

    pub fn acting_role(&self) -> Option<&str> {
        self.acting_role.as_deref()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
