//! `crumbs-auth`: identity claims adapter for Crumbs request handling.
//!
//! Presents a decoded token's claims through named accessors and exposes the
//! permission / object-access assertions handlers call before doing work.
//! Token decoding and signature verification happen upstream.

pub mod authorize;
pub mod claims;
pub mod identity;
pub mod permissions;

pub use authorize::{AssertionError, AssertionResult};
pub use claims::{ClaimsError, ClaimsMap, WellKnownClaim, anonymous_claims};
pub use identity::IdentityView;
pub use permissions::{Permission, PermissionRequest};
