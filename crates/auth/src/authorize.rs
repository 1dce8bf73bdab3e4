//! Permission and object-access assertions.
//!
//! Both assertions are wired end to end but no policy source exists yet, so
//! every well-formed request is granted.

use serde_json::Value;
use thiserror::Error;

use crate::{IdentityView, Permission, PermissionRequest};

/// Result of an assertion: `Ok(true)` when the identity satisfies the request.
pub type AssertionResult = Result<bool, AssertionError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssertionError {
    /// The caller passed something that is neither a permission nor a set of them.
    #[error("No permissions were specified to assert")]
    NoPermissionsSpecified,

    #[error("No objects were specified to assert")]
    NoObjectsSpecified,

    #[error("{message}")]
    PermissionNotAsserted {
        message: String,
        requested_permissions: Vec<Permission>,
    },

    #[error("{message}")]
    ObjectAccessNotAsserted {
        message: String,
        requested_objects: Value,
    },
}

impl AssertionError {
    pub fn permission_not_asserted<I, P>(message: impl Into<String>, perms: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        Self::PermissionNotAsserted {
            message: message.into(),
            requested_permissions: perms.into_iter().map(Into::into).collect(),
        }
    }

    pub fn object_access_not_asserted(message: impl Into<String>, objects: Value) -> Self {
        Self::ObjectAccessNotAsserted {
            message: message.into(),
            requested_objects: objects,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::PermissionNotAsserted { message, .. }
            | Self::ObjectAccessNotAsserted { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn requested_permissions(&self) -> Option<&[Permission]> {
        match self {
            Self::PermissionNotAsserted {
                requested_permissions,
                ..
            } => Some(requested_permissions),
            _ => None,
        }
    }

    pub fn requested_objects(&self) -> Option<&Value> {
        match self {
            Self::ObjectAccessNotAsserted {
                requested_objects, ..
            } => Some(requested_objects),
            _ => None,
        }
    }

    /// Whether this is an access denial rather than a malformed call.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            Self::PermissionNotAsserted { .. } | Self::ObjectAccessNotAsserted { .. }
        )
    }
}

impl IdentityView {
    /// Assert that this identity holds every requested permission.
    ///
    /// Accepts a single permission or a set. The future yields once before it
    /// settles, even though no I/O happens yet.
    pub async fn assert_permission(&self, perms: impl Into<PermissionRequest>) -> AssertionResult {
        let request: PermissionRequest = perms.into();
        tokio::task::yield_now().await;

        let perms = request.normalize()?;

        if let Some(missing) = missing_permissions(self, &perms) {
            tracing::trace!(missing = ?missing, "permission assertion denied");
            return Err(AssertionError::permission_not_asserted(
                format!(
                    "User did not assert the required permissions: {}",
                    join(&missing)
                ),
                perms,
            ));
        }

        Ok(true)
    }

    /// Assert that this identity may reach the objects described by `request`.
    ///
    /// `request` is an arbitrary JSON description (e.g. `{"loan": [1, 2]}`);
    /// `Value::Null` means nothing was specified.
    pub async fn assert_object_access(&self, request: &Value) -> AssertionResult {
        tokio::task::yield_now().await;

        if request.is_null() {
            return Err(AssertionError::NoObjectsSpecified);
        }

        if !object_scope_granted(self, request) {
            tracing::trace!("object access assertion denied");
            return Err(AssertionError::object_access_not_asserted(
                "User does not have security scope over the requested objects",
                request.clone(),
            ));
        }

        Ok(true)
    }
}

// TODO: resolve against the primary group / party role claims once the
// identity provider publishes a permission mapping. Until then nothing is missing.
fn missing_permissions(_identity: &IdentityView, _required: &[Permission]) -> Option<Vec<Permission>> {
    None
}

// TODO: check object ids against the party role scope once an ACL source exists.
fn object_scope_granted(_identity: &IdentityView, _request: &Value) -> bool {
    true
}

fn join(perms: &[Permission]) -> String {
    perms
        .iter()
        .map(Permission::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
