//! User store integration tests against in-memory SQLite.

mod support;

use std::collections::HashSet;

use chrono::{TimeZone, Utc};
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

use common::StoreError;
use domain::{normalize, Claim, UserLoginInfo, ERROR_DUPLICATE_KEY};
use identity_store::RoleUserStore;

use support::{database, new_user, saved_role, saved_user, user_store};

#[tokio::test]
async fn test_create_then_find_round_trips_scalar_fields() {
    let store = user_store().await;
    let cancel = CancellationToken::new();

    let mut user = new_user("alice", "alice@x.com");
    user.email_confirmed = true;
    user.password_hash = Some("hash".to_string());
    user.phone_number = Some("+100200".to_string());
    user.phone_number_confirmed = true;
    user.two_factor_enabled = true;
    user.lockout_enabled = true;
    user.lockout_end = Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
    user.access_failed_count = 2;

    let result = assert_ok!(store.create(&mut user, &cancel).await);
    assert!(result.succeeded());
    assert!(user.id > 0);

    let id = store.get_user_id(&user, &cancel).unwrap().unwrap();
    let found = assert_ok!(store.find_by_id(&id, &cancel).await).unwrap();
    assert_eq!(found, user);
}

#[tokio::test]
async fn test_generated_ids_are_distinct() {
    let store = user_store().await;
    let alice = saved_user(&store, "alice").await;
    let bob = saved_user(&store, "bob").await;
    assert_ne!(alice.id, bob.id);
}

#[tokio::test]
async fn test_update_is_visible_on_next_find() {
    let store = user_store().await;
    let cancel = CancellationToken::new();
    let mut user = saved_user(&store, "alice").await;

    store
        .set_phone_number(&mut user, Some("555".to_string()), &cancel)
        .unwrap();
    store.set_two_factor_enabled(&mut user, true, &cancel).unwrap();

    // Staged only until update
    let before = store
        .find_by_id(&user.id.to_string(), &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(before.phone_number, None);

    let result = store.update(&user, &cancel).await.unwrap();
    assert!(result.succeeded());

    let after = store
        .find_by_id(&user.id.to_string(), &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.phone_number.as_deref(), Some("555"));
    assert!(after.two_factor_enabled);
}

#[tokio::test]
async fn test_update_from_stale_copy_overwrites_row() {
    let store = user_store().await;
    let cancel = CancellationToken::new();
    let user = saved_user(&store, "alice").await;
    let mut stale = user.clone();

    let mut current = user;
    current.phone_number = Some("111".to_string());
    current.concurrency_stamp = Some("second".to_string());
    assert!(store.update(&current, &cancel).await.unwrap().succeeded());

    stale.phone_number = Some("999".to_string());
    stale.concurrency_stamp = Some("stale".to_string());
    let result = assert_ok!(store.update(&stale, &cancel).await);
    assert!(result.succeeded());

    let found = store
        .find_by_id(&stale.id.to_string(), &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.phone_number.as_deref(), Some("999"));
    assert_eq!(found.concurrency_stamp.as_deref(), Some("stale"));
}

#[tokio::test]
async fn test_delete_then_find_is_absent() {
    let store = user_store().await;
    let cancel = CancellationToken::new();
    let user = saved_user(&store, "alice").await;

    let result = store.delete(&user, &cancel).await.unwrap();
    assert!(result.succeeded());

    let found = assert_ok!(store.find_by_id(&user.id.to_string(), &cancel).await);
    assert!(found.is_none());
}

#[tokio::test]
async fn test_alice_scenario() {
    let store = user_store().await;
    let cancel = CancellationToken::new();

    let mut alice = new_user("alice", "alice@x.com");
    assert!(store.create(&mut alice, &cancel).await.unwrap().succeeded());

    let by_name = store
        .find_by_name(&normalize("alice"), &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_name.id, alice.id);

    let by_email = store
        .find_by_email(&normalize("alice@x.com"), &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, alice.id);

    assert!(store.delete(&alice, &cancel).await.unwrap().succeeded());
    assert!(store
        .find_by_id(&alice.id.to_string(), &cancel)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_duplicate_normalized_name_fails_as_result() {
    let store = user_store().await;
    let cancel = CancellationToken::new();
    saved_user(&store, "alice").await;

    let mut twin = new_user("ALICE", "other@x.com");
    let result = assert_ok!(store.create(&mut twin, &cancel).await);
    assert!(!result.succeeded());
    assert_eq!(result.errors()[0].code, ERROR_DUPLICATE_KEY);
}

#[tokio::test]
async fn test_lookups_of_unknown_users_are_absent() {
    let store = user_store().await;
    let cancel = CancellationToken::new();

    assert!(store.find_by_id("404", &cancel).await.unwrap().is_none());
    assert!(store.find_by_name("NOBODY", &cancel).await.unwrap().is_none());
    assert!(store
        .find_by_login("github", "missing", &cancel)
        .await
        .unwrap()
        .is_none());
}

// =============================================================================
// Claims
// =============================================================================

#[tokio::test]
async fn test_add_and_remove_claims() {
    let store = user_store().await;
    let cancel = CancellationToken::new();
    let user = saved_user(&store, "alice").await;

    let claims = [Claim::new("role", "admin"), Claim::new("dept", "ops")];
    store.add_claims(&user, &claims, &cancel).await.unwrap();
    assert_eq!(store.get_claims(&user, &cancel).await.unwrap(), claims.to_vec());

    store
        .remove_claims(&user, &[Claim::new("role", "admin")], &cancel)
        .await
        .unwrap();
    assert_eq!(
        store.get_claims(&user, &cancel).await.unwrap(),
        vec![Claim::new("dept", "ops")]
    );
}

#[tokio::test]
async fn test_replace_claim_is_idempotent() {
    let store = user_store().await;
    let cancel = CancellationToken::new();
    let user = saved_user(&store, "alice").await;
    let old = Claim::new("t", "old");
    let new = Claim::new("t", "new");
    store.add_claims(&user, &[old.clone()], &cancel).await.unwrap();

    store.replace_claim(&user, &old, &new, &cancel).await.unwrap();
    store.replace_claim(&user, &old, &new, &cancel).await.unwrap();

    let claims = store.get_claims(&user, &cancel).await.unwrap();
    assert_eq!(claims.iter().filter(|c| **c == new).count(), 1);
    assert!(!claims.contains(&old));
}

#[tokio::test]
async fn test_users_for_claim_matches_type_and_value() {
    let store = user_store().await;
    let cancel = CancellationToken::new();
    let alice = saved_user(&store, "alice").await;
    let bob = saved_user(&store, "bob").await;
    let carol = saved_user(&store, "carol").await;
    let dave = saved_user(&store, "dave").await;

    store
        .add_claims(&alice, &[Claim::new("t", "v"), Claim::new("x", "y")], &cancel)
        .await
        .unwrap();
    store.add_claims(&bob, &[Claim::new("t", "v")], &cancel).await.unwrap();
    store.add_claims(&carol, &[Claim::new("t", "other")], &cancel).await.unwrap();
    store.add_claims(&dave, &[Claim::new("other", "v")], &cancel).await.unwrap();

    let users = store
        .get_users_for_claim(&Claim::new("t", "v"), &cancel)
        .await
        .unwrap();
    let ids: HashSet<i64> = users.iter().map(|u| u.id).collect();
    assert_eq!(ids, HashSet::from([alice.id, bob.id]));
}

// =============================================================================
// Logins
// =============================================================================

#[tokio::test]
async fn test_logins_resolve_back_to_user() {
    let store = user_store().await;
    let cancel = CancellationToken::new();
    let user = saved_user(&store, "alice").await;
    let login = UserLoginInfo::new("github", "gh-42", Some("GitHub".to_string()));

    store.add_login(&user, &login, &cancel).await.unwrap();
    assert_eq!(store.get_logins(&user, &cancel).await.unwrap(), vec![login]);

    let found = store
        .find_by_login("github", "gh-42", &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, user.id);

    store
        .remove_login(&user, "github", "gh-42", &cancel)
        .await
        .unwrap();
    assert!(store.get_logins(&user, &cancel).await.unwrap().is_empty());
}

// =============================================================================
// Tokens, authenticator key and recovery codes
// =============================================================================

#[tokio::test]
async fn test_set_token_updates_in_place() {
    let store = user_store().await;
    let cancel = CancellationToken::new();
    let user = saved_user(&store, "alice").await;

    store
        .set_token(&user, "github", "access", Some("one"), &cancel)
        .await
        .unwrap();
    store
        .set_token(&user, "github", "access", Some("two"), &cancel)
        .await
        .unwrap();
    assert_eq!(
        store.get_token(&user, "github", "access", &cancel).await.unwrap(),
        Some("two".to_string())
    );

    store
        .remove_token(&user, "github", "access", &cancel)
        .await
        .unwrap();
    assert_eq!(
        store.get_token(&user, "github", "access", &cancel).await.unwrap(),
        None
    );
    // Removing a missing token is fine
    assert_ok!(store.remove_token(&user, "github", "access", &cancel).await);
}

#[tokio::test]
async fn test_authenticator_key_round_trip() {
    let store = user_store().await;
    let cancel = CancellationToken::new();
    let user = saved_user(&store, "alice").await;

    assert_eq!(store.get_authenticator_key(&user, &cancel).await.unwrap(), None);
    store
        .set_authenticator_key(&user, "JBSWY3DPEHPK3PXP", &cancel)
        .await
        .unwrap();
    assert_eq!(
        store.get_authenticator_key(&user, &cancel).await.unwrap(),
        Some("JBSWY3DPEHPK3PXP".to_string())
    );
}

#[tokio::test]
async fn test_recovery_codes_count_and_redeem() {
    let store = user_store().await;
    let cancel = CancellationToken::new();
    let user = saved_user(&store, "alice").await;

    assert_eq!(store.count_codes(&user, &cancel).await.unwrap(), 0);

    store
        .replace_codes(&user, ["a", "b", "c"], &cancel)
        .await
        .unwrap();
    assert_eq!(store.count_codes(&user, &cancel).await.unwrap(), 3);

    assert!(store.redeem_code(&user, "B", &cancel).await.unwrap());
    assert_eq!(store.count_codes(&user, &cancel).await.unwrap(), 2);

    assert!(!store.redeem_code(&user, "b", &cancel).await.unwrap());
    assert_eq!(store.count_codes(&user, &cancel).await.unwrap(), 2);
}

// =============================================================================
// Roles
// =============================================================================

#[tokio::test]
async fn test_add_to_missing_role_is_role_not_found() {
    let store = user_store().await;
    let cancel = CancellationToken::new();
    let user = saved_user(&store, "alice").await;

    let err = assert_err!(store.add_to_role(&user, "GHOSTS", &cancel).await);
    assert!(matches!(err, StoreError::RoleNotFound(ref name) if name == "GHOSTS"));

    let err = assert_err!(store.is_in_role(&user, "GHOSTS", &cancel).await);
    assert_eq!(err.code(), "ROLE_NOT_FOUND");

    let err = assert_err!(store.remove_from_role(&user, "GHOSTS", &cancel).await);
    assert!(matches!(err, StoreError::RoleNotFound(ref name) if name == "GHOSTS"));
}

#[tokio::test]
async fn test_unknown_role_has_no_members() {
    let store = user_store().await;
    saved_user(&store, "alice").await;

    let members = assert_ok!(
        store
            .get_users_in_role("GHOSTS", &CancellationToken::new())
            .await
    );
    assert!(members.is_empty());
}

#[tokio::test]
async fn test_cancelled_relationship_calls_write_nothing() {
    let db = database().await;
    let store: RoleUserStore<i64, _> = RoleUserStore::new(db.clone());
    saved_role(&db, "Admin").await;
    let user = saved_user(&store, "alice").await;
    let cancelled = CancellationToken::new();
    cancelled.cancel();

    let err = assert_err!(store.add_to_role(&user, "ADMIN", &cancelled).await);
    assert!(matches!(err, StoreError::Cancelled));
    let err = assert_err!(
        store
            .set_token(&user, "github", "access_token", Some("abc"), &cancelled)
            .await
    );
    assert!(matches!(err, StoreError::Cancelled));

    let cancel = CancellationToken::new();
    assert!(!store.is_in_role(&user, "ADMIN", &cancel).await.unwrap());
    assert_eq!(
        store
            .get_token(&user, "github", "access_token", &cancel)
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn test_role_membership_lifecycle() {
    let db = database().await;
    let store: RoleUserStore<i64, _> = RoleUserStore::new(db.clone());
    let cancel = CancellationToken::new();
    saved_role(&db, "Admin").await;
    saved_role(&db, "Editor").await;
    let alice = saved_user(&store, "alice").await;
    let bob = saved_user(&store, "bob").await;

    store.add_to_role(&alice, "ADMIN", &cancel).await.unwrap();
    store.add_to_role(&alice, "ADMIN", &cancel).await.unwrap();
    store.add_to_role(&alice, "EDITOR", &cancel).await.unwrap();
    store.add_to_role(&bob, "EDITOR", &cancel).await.unwrap();

    assert_eq!(
        store.get_roles(&alice, &cancel).await.unwrap(),
        vec!["Admin".to_string(), "Editor".to_string()]
    );
    assert!(store.is_in_role(&alice, "ADMIN", &cancel).await.unwrap());
    assert!(!store.is_in_role(&bob, "ADMIN", &cancel).await.unwrap());

    let admins = store.get_users_in_role("ADMIN", &cancel).await.unwrap();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].id, alice.id);

    store.remove_from_role(&alice, "ADMIN", &cancel).await.unwrap();
    assert!(!store.is_in_role(&alice, "ADMIN", &cancel).await.unwrap());
    assert!(store.get_users_in_role("ADMIN", &cancel).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_user_cascades_to_relations() {
    let db = database().await;
    let store: RoleUserStore<i64, _> = RoleUserStore::new(db.clone());
    let cancel = CancellationToken::new();
    saved_role(&db, "Admin").await;
    let user = saved_user(&store, "alice").await;
    store.add_to_role(&user, "ADMIN", &cancel).await.unwrap();
    store
        .add_claims(&user, &[Claim::new("t", "v")], &cancel)
        .await
        .unwrap();

    assert!(store.delete(&user, &cancel).await.unwrap().succeeded());

    assert!(store.get_users_in_role("ADMIN", &cancel).await.unwrap().is_empty());
    assert!(store
        .get_users_for_claim(&Claim::new("t", "v"), &cancel)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_disposed_store_fails_fast() {
    let store = user_store().await;
    let cancel = CancellationToken::new();
    let user = saved_user(&store, "alice").await;

    store.dispose();
    let err = assert_err!(store.get_claims(&user, &cancel).await);
    assert!(matches!(err, StoreError::Disposed));
}
