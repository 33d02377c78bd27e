//! Role store integration tests.

mod support;

use tokio_test::assert_ok;
use tokio_util::sync::CancellationToken;

use domain::{normalize, Claim, IdentityRole, ERROR_DUPLICATE_KEY};
use identity_store::infra::Database;
use identity_store::{RoleStore, RoleUserStore};

use support::{database, saved_role, saved_user};

async fn role_store() -> (Database, RoleStore<i64, Database>) {
    let db = database().await;
    let store = RoleStore::new(db.clone());
    (db, store)
}

#[tokio::test]
async fn test_create_assigns_id_and_finds_by_name() {
    let (_db, store) = role_store().await;
    let cancel = CancellationToken::new();
    let mut role = IdentityRole::new("Admin");
    role.normalized_name = Some(normalize("Admin"));

    let result = assert_ok!(store.create(&mut role, &cancel).await);
    assert!(result.succeeded());
    assert!(role.id > 0);

    let found = store.find_by_name("ADMIN", &cancel).await.unwrap().unwrap();
    assert_eq!(found, role);
    let id = store.get_role_id(&role, &cancel).unwrap().unwrap();
    assert_eq!(store.find_by_id(&id, &cancel).await.unwrap(), Some(role));
}

#[tokio::test]
async fn test_duplicate_role_name_is_reported() {
    let (db, store) = role_store().await;
    saved_role(&db, "Admin").await;

    let mut twin = IdentityRole::new("admin");
    twin.normalized_name = Some(normalize("admin"));
    let result = store.create(&mut twin, &CancellationToken::new()).await.unwrap();
    assert_eq!(result.errors()[0].code, ERROR_DUPLICATE_KEY);
}

#[tokio::test]
async fn test_rename_persists_on_update() {
    let (db, store) = role_store().await;
    let cancel = CancellationToken::new();
    let mut role = saved_role(&db, "Admin").await;

    store
        .set_role_name(&mut role, Some("Administrators".to_string()), &cancel)
        .unwrap();
    store
        .set_normalized_role_name(&mut role, Some(normalize("Administrators")), &cancel)
        .unwrap();
    assert!(store.update(&role, &cancel).await.unwrap().succeeded());

    assert!(store.find_by_name("ADMIN", &cancel).await.unwrap().is_none());
    let found = store
        .find_by_name("ADMINISTRATORS", &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        store.get_role_name(&found, &cancel).unwrap().as_deref(),
        Some("Administrators")
    );
}

#[tokio::test]
async fn test_role_claims() {
    let (db, store) = role_store().await;
    let cancel = CancellationToken::new();
    let role = saved_role(&db, "Admin").await;

    store
        .add_claim(&role, &Claim::new("permission", "users.write"), &cancel)
        .await
        .unwrap();
    store
        .add_claim(&role, &Claim::new("permission", "users.read"), &cancel)
        .await
        .unwrap();
    store
        .remove_claim(&role, &Claim::new("permission", "users.write"), &cancel)
        .await
        .unwrap();

    assert_eq!(
        store.get_claims(&role, &cancel).await.unwrap(),
        vec![Claim::new("permission", "users.read")]
    );
}

#[tokio::test]
async fn test_deleting_role_drops_memberships() {
    let (db, store) = role_store().await;
    let users: RoleUserStore<i64, _> = RoleUserStore::new(db.clone());
    let cancel = CancellationToken::new();
    let role = saved_role(&db, "Admin").await;
    let alice = saved_user(&users, "alice").await;
    users.add_to_role(&alice, "ADMIN", &cancel).await.unwrap();

    assert!(store.delete(&role, &cancel).await.unwrap().succeeded());

    assert!(store.find_by_name("ADMIN", &cancel).await.unwrap().is_none());
    assert!(users.get_roles(&alice, &cancel).await.unwrap().is_empty());
}
