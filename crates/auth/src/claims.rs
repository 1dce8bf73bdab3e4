use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Claims issued by the Crumbs identity provider that the adapter knows how to read.
///
/// Every other key in a token is carried through untouched.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WellKnownClaim {
    PrimaryGroup,
    SiteTypeId,
    CommonName,
    CrumbsLoginId,
    CrumbsPartyRoleId,
    V8PartyRoleId,
    FamilyName,
    GivenName,
    UserName,
}

impl WellKnownClaim {
    pub const ALL: [WellKnownClaim; 9] = [
        WellKnownClaim::PrimaryGroup,
        WellKnownClaim::SiteTypeId,
        WellKnownClaim::CommonName,
        WellKnownClaim::CrumbsLoginId,
        WellKnownClaim::CrumbsPartyRoleId,
        WellKnownClaim::V8PartyRoleId,
        WellKnownClaim::FamilyName,
        WellKnownClaim::GivenName,
        WellKnownClaim::UserName,
    ];

    /// Key of this claim inside a decoded token payload.
    pub const fn key(self) -> &'static str {
        match self {
            WellKnownClaim::PrimaryGroup => {
                "http://schemas.firstmac.com.au/ws/2015/03/identity/claims/primarygroup"
            }
            WellKnownClaim::SiteTypeId => {
                "http://schemas.firstmac.com.au/ws/2009/12/identity/claims/sitetypeid"
            }
            WellKnownClaim::CommonName => "common_name",
            WellKnownClaim::CrumbsLoginId => "crumbs_login_id",
            WellKnownClaim::CrumbsPartyRoleId => "crumbs_party_role_id",
            WellKnownClaim::V8PartyRoleId => "v8_party_role_id",
            WellKnownClaim::FamilyName => "family_name",
            WellKnownClaim::GivenName => "given_name",
            WellKnownClaim::UserName => "name",
        }
    }
}

impl core::fmt::Display for WellKnownClaim {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("claims must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Decoded token claims (transport-agnostic).
///
/// Signature verification and decoding happen upstream; by the time a payload
/// reaches this type it is trusted. Values are kept exactly as issued.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimsMap(Map<String, Value>);

impl ClaimsMap {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn well_known(&self, claim: WellKnownClaim) -> Option<&Value> {
        self.0.get(claim.key())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Builder-style insert, mostly for fixtures and tests.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ClaimsMap {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

impl TryFrom<Value> for ClaimsMap {
    type Error = ClaimsError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err(ClaimsError::NotAnObject("null")),
            Value::Bool(_) => Err(ClaimsError::NotAnObject("a boolean")),
            Value::Number(_) => Err(ClaimsError::NotAnObject("a number")),
            Value::String(_) => Err(ClaimsError::NotAnObject("a string")),
            Value::Array(_) => Err(ClaimsError::NotAnObject("an array")),
        }
    }
}

static ANONYMOUS: LazyLock<ClaimsMap> = LazyLock::new(|| {
    ClaimsMap::new()
        .with(WellKnownClaim::PrimaryGroup.key(), "nogroup")
        .with(WellKnownClaim::SiteTypeId.key(), Value::Null)
        .with(WellKnownClaim::CommonName.key(), "nobody")
        .with(WellKnownClaim::CrumbsLoginId.key(), Value::Null)
        .with(WellKnownClaim::CrumbsPartyRoleId.key(), Value::Null)
        .with(WellKnownClaim::V8PartyRoleId.key(), Value::Null)
        .with(WellKnownClaim::FamilyName.key(), "Anonymous")
        .with(WellKnownClaim::GivenName.key(), "Anonymous")
        .with(WellKnownClaim::UserName.key(), Value::Null)
});

/// Sentinel claims used when a request carries no identity.
pub fn anonymous_claims() -> &'static ClaimsMap {
    &ANONYMOUS
}
