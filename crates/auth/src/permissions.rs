use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AssertionError;

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "loans.read"). Nothing at
/// this layer interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Permission {
    fn from(value: &str) -> Self {
        Self(Cow::Owned(value.to_string()))
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

/// Input accepted by [`IdentityView::assert_permission`](crate::IdentityView::assert_permission).
///
/// Callers may pass a single permission or a set of them. Requests built from
/// loosely typed JSON can also end up `Unspecified`, which the assertion rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionRequest {
    Single(Permission),
    Set(Vec<Permission>),
    Unspecified,
}

impl PermissionRequest {
    /// Flatten into the list of permissions to check.
    pub fn normalize(self) -> Result<Vec<Permission>, AssertionError> {
        match self {
            PermissionRequest::Single(p) => Ok(vec![p]),
            PermissionRequest::Set(perms) => Ok(perms),
            PermissionRequest::Unspecified => Err(AssertionError::NoPermissionsSpecified),
        }
    }
}

impl From<Permission> for PermissionRequest {
    fn from(value: Permission) -> Self {
        Self::Single(value)
    }
}

impl From<&str> for PermissionRequest {
    fn from(value: &str) -> Self {
        Self::Single(value.into())
    }
}

impl From<String> for PermissionRequest {
    fn from(value: String) -> Self {
        Self::Single(value.into())
    }
}

impl From<Vec<Permission>> for PermissionRequest {
    fn from(value: Vec<Permission>) -> Self {
        Self::Set(value)
    }
}

impl From<Vec<String>> for PermissionRequest {
    fn from(value: Vec<String>) -> Self {
        Self::Set(value.into_iter().map(Permission::from).collect())
    }
}

impl From<Vec<&str>> for PermissionRequest {
    fn from(value: Vec<&str>) -> Self {
        Self::Set(value.into_iter().map(Permission::from).collect())
    }
}

impl From<&[&str]> for PermissionRequest {
    fn from(value: &[&str]) -> Self {
        Self::Set(value.iter().copied().map(Permission::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PermissionRequest {
    fn from(value: [&str; N]) -> Self {
        Self::Set(value.into_iter().map(Permission::from).collect())
    }
}

// Arrays are accepted whatever they hold; non-string members keep their JSON text.
impl From<Value> for PermissionRequest {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Single(s.into()),
            Value::Array(items) => Self::Set(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => Permission::from(s),
                        other => Permission::from(other.to_string()),
                    })
                    .collect(),
            ),
            _ => Self::Unspecified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_permission_is_wrapped() {
        let perms = PermissionRequest::from("read").normalize().unwrap();
        assert_eq!(perms, vec![Permission::new("read")]);
    }

    #[test]
    fn set_is_kept_in_order() {
        let perms = PermissionRequest::from(["b", "a", "b"]).normalize().unwrap();
        let names: Vec<&str> = perms.iter().map(Permission::as_str).collect();
        assert_eq!(names, vec!["b", "a", "b"]);
    }

    #[test]
    fn empty_set_is_still_a_request() {
        let perms = PermissionRequest::from(Vec::<String>::new()).normalize().unwrap();
        assert!(perms.is_empty());
    }

    #[test]
    fn json_inputs() {
        assert_eq!(
            PermissionRequest::from(json!("read")),
            PermissionRequest::Single(Permission::new("read"))
        );
        assert_eq!(
            PermissionRequest::from(json!(["read", 7])),
            PermissionRequest::Set(vec![Permission::new("read"), Permission::new("7")])
        );
        assert_eq!(PermissionRequest::from(json!(42)), PermissionRequest::Unspecified);
        assert_eq!(PermissionRequest::from(json!({"p": 1})), PermissionRequest::Unspecified);
        assert_eq!(PermissionRequest::from(Value::Null), PermissionRequest::Unspecified);
    }

    #[test]
    fn unspecified_is_rejected() {
        let err = PermissionRequest::Unspecified.normalize().unwrap_err();
        assert_eq!(err, AssertionError::NoPermissionsSpecified);
    }

    #[test]
    fn permission_serializes_as_plain_string() {
        let json = serde_json::to_value(Permission::new("loans.read")).unwrap();
        assert_eq!(json, json!("loans.read"));
    }
}
