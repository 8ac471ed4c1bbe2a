/// Integration tests for the account and token stores
///
/// These exercise the single-current-token invariant and the identity join
/// against a live PostgreSQL, so every test is `#[ignore]`d; run them with
/// `cargo test -p taskmesh-auth -- --ignored` and DATABASE_URL set.

mod common;

use common::TestContext;
use taskmesh_auth::models::account::{Account, UpdateAccount};
use taskmesh_auth::models::token::TokenRecord;
use taskmesh_shared::auth::jwt::{create_token, Claims};
use taskmesh_shared::models::role::Role;
use uuid::Uuid;

const SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Issuing a second token supersedes the first at the storage layer, even
/// though the first still verifies cryptographically.
#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_token_freshness_invariant() {
    let ctx = TestContext::new().await.unwrap();
    let account = ctx.create_account(Role::Client).await.unwrap();

    let t1 = create_token(&Claims::new(&account.username), SECRET).unwrap();
    TokenRecord::issue(&ctx.db, account.id, &t1).await.unwrap();
    assert!(TokenRecord::verify_local(&ctx.db, account.id, &t1)
        .await
        .unwrap());

    let t2 = create_token(&Claims::new(&account.username), SECRET).unwrap();
    TokenRecord::issue(&ctx.db, account.id, &t2).await.unwrap();

    assert!(
        !TokenRecord::verify_local(&ctx.db, account.id, &t1)
            .await
            .unwrap(),
        "superseded token must stop verifying"
    );
    assert!(TokenRecord::verify_local(&ctx.db, account.id, &t2)
        .await
        .unwrap());

    ctx.cleanup_account(account.id).await.unwrap();
}

/// The identity-keyed check answers the same question as the local check,
/// keyed by the external UUID.
#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_verify_by_identity() {
    let ctx = TestContext::new().await.unwrap();
    let account = ctx.create_account(Role::Manager).await.unwrap();

    let token = create_token(&Claims::new(&account.username), SECRET).unwrap();
    TokenRecord::issue(&ctx.db, account.id, &token)
        .await
        .unwrap();

    assert!(
        TokenRecord::verify_by_identity(&ctx.db, account.public_id, &token)
            .await
            .unwrap()
    );

    // Wrong identity, wrong token, unknown identity: all fail closed
    assert!(
        !TokenRecord::verify_by_identity(&ctx.db, account.public_id, "not-the-token")
            .await
            .unwrap()
    );
    assert!(
        !TokenRecord::verify_by_identity(&ctx.db, Uuid::new_v4(), &token)
            .await
            .unwrap()
    );

    ctx.cleanup_account(account.id).await.unwrap();
}

/// Deleting an account cascades to its token row.
#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_delete_cascades_token() {
    let ctx = TestContext::new().await.unwrap();
    let account = ctx.create_account(Role::Client).await.unwrap();

    let token = create_token(&Claims::new(&account.username), SECRET).unwrap();
    TokenRecord::issue(&ctx.db, account.id, &token)
        .await
        .unwrap();

    let public_id = Account::delete(&ctx.db, account.id).await.unwrap();
    assert_eq!(public_id, Some(account.public_id));

    assert!(
        !TokenRecord::verify_by_identity(&ctx.db, account.public_id, &token)
            .await
            .unwrap()
    );
}

/// Partial update touches only the supplied fields.
#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_partial_account_update() {
    let ctx = TestContext::new().await.unwrap();
    let account = ctx.create_account(Role::Client).await.unwrap();

    let updated = Account::update(
        &ctx.db,
        account.id,
        UpdateAccount {
            role: Some(Role::Manager),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .expect("account should exist");

    assert_eq!(updated.role, Role::Manager);
    assert_eq!(updated.username, account.username);
    assert_eq!(updated.first_name, account.first_name);
    assert_eq!(updated.email, account.email);

    ctx.cleanup_account(account.id).await.unwrap();
}
