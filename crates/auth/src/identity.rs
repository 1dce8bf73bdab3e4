//! Read-only view over a request's identity claims.

use std::sync::Arc;

use serde_json::Value;

use crate::claims::{ClaimsMap, WellKnownClaim, anonymous_claims};

#[derive(Debug, Clone)]
enum Binding {
    Anonymous,
    Claims(Arc<ClaimsMap>),
}

/// Identity of the caller for one request or session.
///
/// # Invariants
/// - Bound once at construction, never mutated afterwards.
/// - Only a view built without claims is anonymous. Claims supplied by the
///   caller make the view authenticated, even when they carry the same values
///   as the anonymous sentinel.
#[derive(Debug, Clone)]
pub struct IdentityView {
    binding: Binding,
}

impl IdentityView {
    /// Bind `claims`, or the anonymous identity when there are none.
    pub fn new(claims: Option<ClaimsMap>) -> Self {
        match claims {
            Some(claims) => Self::from_claims(claims),
            None => Self::anonymous(),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            binding: Binding::Anonymous,
        }
    }

    pub fn from_claims(claims: ClaimsMap) -> Self {
        Self::from_shared(Arc::new(claims))
    }

    /// Bind claims that are already shared, without copying them.
    pub fn from_shared(claims: Arc<ClaimsMap>) -> Self {
        Self {
            binding: Binding::Claims(claims),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.binding, Binding::Claims(_))
    }

    pub fn claims(&self) -> &ClaimsMap {
        match &self.binding {
            Binding::Anonymous => anonymous_claims(),
            Binding::Claims(claims) => claims.as_ref(),
        }
    }

    /// Raw value of a well-known claim. `None` when the token doesn't carry it.
    pub fn claim(&self, claim: WellKnownClaim) -> Option<&Value> {
        self.claims().well_known(claim)
    }

    pub fn login_id(&self) -> Option<&Value> {
        self.claim(WellKnownClaim::CrumbsLoginId)
    }

    pub fn full_name(&self) -> Option<&Value> {
        self.claim(WellKnownClaim::CommonName)
    }

    pub fn username(&self) -> Option<&Value> {
        self.claim(WellKnownClaim::UserName)
    }

    pub fn primary_group(&self) -> Option<&Value> {
        self.claim(WellKnownClaim::PrimaryGroup)
    }

    pub fn site_type_id(&self) -> Option<&Value> {
        self.claim(WellKnownClaim::SiteTypeId)
    }

    pub fn party_role_id(&self) -> Option<&Value> {
        self.claim(WellKnownClaim::CrumbsPartyRoleId)
    }

    pub fn v8_party_role_id(&self) -> Option<&Value> {
        self.claim(WellKnownClaim::V8PartyRoleId)
    }

    pub fn family_name(&self) -> Option<&Value> {
        self.claim(WellKnownClaim::FamilyName)
    }

    pub fn given_name(&self) -> Option<&Value> {
        self.claim(WellKnownClaim::GivenName)
    }
}

impl Default for IdentityView {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl From<ClaimsMap> for IdentityView {
    fn from(value: ClaimsMap) -> Self {
        Self::from_claims(value)
    }
}

impl From<Option<ClaimsMap>> for IdentityView {
    fn from(value: Option<ClaimsMap>) -> Self {
        Self::new(value)
    }
}
