use crumbs_auth::{AssertionError, ClaimsMap, IdentityView, WellKnownClaim};
use serde_json::{Value, json};

/// Decoded payload of the standard-user token issued by the test identity provider.
fn standard_user_payload() -> Value {
    json!({
        "iss": "https://firstmac",
        "aud": "https://firstmac/resources",
        "exp": 2470982800u64,
        "nbf": 1470975600u64,
        "client_id": "internal",
        "scope": ["openid", "profile", "roles", "sitetype", "crumbsidentity"],
        "sub": "58A3F8618444486F8013574F4",
        "auth_time": 1470975600u64,
        "idp": "winauth",
        "name": "Standard.User@firstmac.com.au",
        "application_name": "Crumbs",
        "common_name": "Standard User",
        "crumbs_login_id": "3",
        "crumbs_party_role_id": "3",
        "email": "Standard.User@firstmac.com.au",
        "family_name": "User",
        "given_name": "Standard",
        "http://schemas.firstmac.com.au/ws/2009/12/identity/claims/sitetypeid": "4",
        "tenant": "internal_crumbs",
        "v8_party_role_id": "3",
        "amr": ["Cookies"]
    })
}

fn std_user() -> IdentityView {
    let claims: ClaimsMap = serde_json::from_value(standard_user_payload()).expect("payload is an object");
    IdentityView::from_claims(claims)
}

#[test]
fn standard_user_is_authenticated() {
    assert!(std_user().is_authenticated());
}

#[test]
fn accessors_reproduce_token_values() {
    let user = std_user();

    assert_eq!(user.login_id(), Some(&json!("3")));
    assert_eq!(user.full_name(), Some(&json!("Standard User")));
    assert_eq!(user.username(), Some(&json!("Standard.User@firstmac.com.au")));
    assert_eq!(user.site_type_id(), Some(&json!("4")));
    assert_eq!(user.party_role_id(), Some(&json!("3")));
    assert_eq!(user.v8_party_role_id(), Some(&json!("3")));
    assert_eq!(user.family_name(), Some(&json!("User")));
    assert_eq!(user.given_name(), Some(&json!("Standard")));

    // The standard user token carries no primary group claim.
    assert_eq!(user.primary_group(), None);
}

#[test]
fn accessors_match_raw_payload_lookups() {
    let payload = standard_user_payload();
    let user = std_user();

    for claim in WellKnownClaim::ALL {
        assert_eq!(user.claim(claim), payload.get(claim.key()), "claim {claim}");
    }
}

#[test]
fn passthrough_claims_survive() {
    let user = std_user();
    let claims = user.claims();

    assert_eq!(claims.get("tenant"), Some(&json!("internal_crumbs")));
    assert_eq!(claims.get("amr"), Some(&json!(["Cookies"])));
    assert_eq!(claims.len(), standard_user_payload().as_object().unwrap().len());
}

#[test]
fn claims_from_non_object_payload_fail() {
    assert!(ClaimsMap::try_from(json!("eyJ0eXAiOiJKV1Qi")).is_err());
}

#[tokio::test]
async fn standard_user_assertions_are_granted() {
    let user = std_user();

    assert_eq!(user.assert_permission("loans.read").await, Ok(true));
    assert_eq!(user.assert_permission(vec!["loans.read", "loans.write"]).await, Ok(true));
    assert_eq!(user.assert_object_access(&json!({ "id": [1, 2, 3] })).await, Ok(true));
}

#[tokio::test]
async fn malformed_assertions_fail_through_the_future() {
    let user = std_user();

    assert_eq!(
        user.assert_permission(json!({ "perm": "loans.read" })).await,
        Err(AssertionError::NoPermissionsSpecified)
    );
    assert_eq!(
        user.assert_object_access(&Value::Null).await,
        Err(AssertionError::NoObjectsSpecified)
    );
}

#[tokio::test]
async fn views_can_be_shared_across_tasks() {
    let user = std::sync::Arc::new(std_user());

    let handles: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|perm| {
            let user = std::sync::Arc::clone(&user);
            tokio::spawn(async move { user.assert_permission(perm).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Ok(true));
    }
}
