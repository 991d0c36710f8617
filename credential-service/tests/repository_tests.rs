mod common;

use chrono::DateTime;
use chrono::Duration;
use chrono::DurationRound;
use chrono::Utc;
use common::TestDb;
use credential_service::credential::errors::CredentialError;
use credential_service::credential::models::Account;
use credential_service::credential::models::AccountId;
use credential_service::credential::models::AuthMethod;
use credential_service::credential::models::EmailAddress;
use credential_service::credential::models::NewAccount;
use credential_service::credential::models::PasswordCredential;
use credential_service::credential::models::RefreshCredential;
use credential_service::credential::models::RefreshTokenId;
use credential_service::credential::ports::AccountRepository;
use credential_service::credential::ports::RefreshTokenRepository;
use credential_service::domain::deadline::Deadline;
use credential_service::repositories::SqliteAccountRepository;
use credential_service::repositories::SqliteRefreshTokenRepository;
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    // Whole seconds so values survive the text round trip unchanged.
    Utc::now().duration_trunc(Duration::seconds(1)).unwrap()
}

fn refresh_credential(account_id: AccountId, at: DateTime<Utc>) -> RefreshCredential {
    RefreshCredential {
        token_id: RefreshTokenId::new(),
        account_id,
        token: format!("refresh-{}", Uuid::new_v4()),
        revoked: false,
        created_at: at,
        expires_at: at + Duration::days(7),
        last_used: at,
    }
}

fn new_account(email: &str) -> NewAccount {
    let at = now();
    let id = AccountId::new();

    NewAccount {
        account: Account {
            id,
            email: EmailAddress::new(email.to_string()).unwrap(),
            auth_method: AuthMethod::EmailPassword,
            is_email_verified: false,
            is_active: true,
            created_at: at,
            updated_at: at,
        },
        password: PasswordCredential {
            credential_id: Uuid::new_v4(),
            account_id: id,
            password_hash: vec![1; 32],
            password_salt: vec![2; 16],
            created_at: at,
            updated_at: at,
        },
        refresh_token: refresh_credential(id, at),
    }
}

async fn count(db: &TestDb, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(&db.pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_with_credentials_writes_all_rows() {
    let db = TestDb::new().await;
    let accounts = SqliteAccountRepository::new(db.pool.clone());
    let tokens = SqliteRefreshTokenRepository::new(db.pool.clone());

    let new = new_account("a@example.com");
    let token_id = new.refresh_token.token_id;
    let created = accounts.create_with_credentials(new.clone()).await.unwrap();

    assert_eq!(created, new.account);

    let found = accounts.find_by_email("a@example.com").await.unwrap().unwrap();
    assert_eq!(found.account, new.account);
    assert_eq!(found.password, Some(new.password));

    assert_eq!(
        tokens.find(&token_id).await.unwrap(),
        Some(new.refresh_token)
    );
    assert_eq!(accounts.find_by_id(&created.id).await.unwrap(), Some(created));
}

#[tokio::test]
async fn test_duplicate_email_leaves_nothing_behind() {
    let db = TestDb::new().await;
    let accounts = SqliteAccountRepository::new(db.pool.clone());

    accounts
        .create_with_credentials(new_account("a@example.com"))
        .await
        .unwrap();

    let result = accounts
        .create_with_credentials(new_account("a@example.com"))
        .await;

    assert!(matches!(result, Err(CredentialError::EmailAlreadyExists(_))));
    assert_eq!(count(&db, "accounts").await, 1);
    assert_eq!(count(&db, "password_credentials").await, 1);
    assert_eq!(count(&db, "refresh_tokens").await, 1);
}

#[tokio::test]
async fn test_refresh_insert_failure_rolls_back_signup() {
    let db = TestDb::new().await;
    let accounts = SqliteAccountRepository::new(db.pool.clone());

    let first = new_account("a@example.com");
    let mut second = new_account("b@example.com");
    second.refresh_token.token_id = first.refresh_token.token_id;

    accounts.create_with_credentials(first).await.unwrap();
    let result = accounts.create_with_credentials(second).await;

    assert!(matches!(result, Err(CredentialError::TokenIdConflict)));
    assert!(accounts.find_by_email("b@example.com").await.unwrap().is_none());
    assert_eq!(count(&db, "accounts").await, 1);
    assert_eq!(count(&db, "password_credentials").await, 1);
}

#[tokio::test]
async fn test_signup_cancelled_by_deadline_writes_nothing() {
    let db = TestDb::new().await;
    let accounts = SqliteAccountRepository::new(db.pool.clone());

    // Another writer holds the database lock past the deadline.
    let other_pool = db.second_pool().await;
    let mut locker = other_pool.acquire().await.unwrap();
    sqlx::query("BEGIN IMMEDIATE")
        .execute(&mut *locker)
        .await
        .unwrap();

    let result = Deadline::after(std::time::Duration::from_millis(200))
        .run(accounts.create_with_credentials(new_account("a@example.com")))
        .await;

    assert!(matches!(result, Err(CredentialError::DeadlineExceeded)));

    sqlx::query("ROLLBACK").execute(&mut *locker).await.unwrap();
    drop(locker);

    assert_eq!(count(&db, "accounts").await, 0);
    assert_eq!(count(&db, "password_credentials").await, 0);
    assert_eq!(count(&db, "refresh_tokens").await, 0);
    assert!(accounts.find_by_email("a@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_email_exists() {
    let db = TestDb::new().await;
    let accounts = SqliteAccountRepository::new(db.pool.clone());
    let email = EmailAddress::new("a@example.com".to_string()).unwrap();

    assert!(!accounts.email_exists(&email).await.unwrap());

    accounts
        .create_with_credentials(new_account("a@example.com"))
        .await
        .unwrap();

    assert!(accounts.email_exists(&email).await.unwrap());
}

#[tokio::test]
async fn test_store_duplicate_token_id_conflicts() {
    let db = TestDb::new().await;
    let accounts = SqliteAccountRepository::new(db.pool.clone());
    let tokens = SqliteRefreshTokenRepository::new(db.pool.clone());

    let new = new_account("a@example.com");
    let existing = new.refresh_token.clone();
    accounts.create_with_credentials(new).await.unwrap();

    let mut duplicate = refresh_credential(existing.account_id, now());
    duplicate.token_id = existing.token_id;

    assert!(matches!(
        tokens.store(duplicate).await,
        Err(CredentialError::TokenIdConflict)
    ));
}

#[tokio::test]
async fn test_unknown_token_id_is_not_found() {
    let db = TestDb::new().await;
    let tokens = SqliteRefreshTokenRepository::new(db.pool.clone());
    let id = RefreshTokenId::new();

    assert!(matches!(
        tokens.is_revoked(&id).await,
        Err(CredentialError::RefreshTokenNotFound)
    ));
    assert!(matches!(
        tokens.revoke(&id).await,
        Err(CredentialError::RefreshTokenNotFound)
    ));
    assert!(matches!(
        tokens.mark_last_used(&id, now()).await,
        Err(CredentialError::RefreshTokenNotFound)
    ));
    assert_eq!(tokens.find(&id).await.unwrap(), None);
}

#[tokio::test]
async fn test_revoke_and_mark_last_used() {
    let db = TestDb::new().await;
    let accounts = SqliteAccountRepository::new(db.pool.clone());
    let tokens = SqliteRefreshTokenRepository::new(db.pool.clone());

    let new = new_account("a@example.com");
    let id = new.refresh_token.token_id;
    accounts.create_with_credentials(new).await.unwrap();

    assert!(!tokens.is_revoked(&id).await.unwrap());

    let used_at = now() + Duration::minutes(5);
    tokens.mark_last_used(&id, used_at).await.unwrap();
    tokens.revoke(&id).await.unwrap();

    let stored = tokens.find(&id).await.unwrap().unwrap();
    assert!(stored.revoked);
    assert_eq!(stored.last_used, used_at);
    assert!(tokens.is_revoked(&id).await.unwrap());
}

#[tokio::test]
async fn test_revoke_all_for_account() {
    let db = TestDb::new().await;
    let accounts = SqliteAccountRepository::new(db.pool.clone());
    let tokens = SqliteRefreshTokenRepository::new(db.pool.clone());

    let new = new_account("a@example.com");
    let account_id = new.account.id;
    let first = new.refresh_token.token_id;
    accounts.create_with_credentials(new).await.unwrap();

    let second = refresh_credential(account_id, now());
    let second_id = second.token_id;
    tokens.store(second).await.unwrap();

    let other = new_account("b@example.com");
    let other_id = other.refresh_token.token_id;
    accounts.create_with_credentials(other).await.unwrap();

    assert_eq!(tokens.revoke_all_for_account(&account_id).await.unwrap(), 2);
    assert!(tokens.is_revoked(&first).await.unwrap());
    assert!(tokens.is_revoked(&second_id).await.unwrap());
    assert!(!tokens.is_revoked(&other_id).await.unwrap());

    // Already revoked rows are not counted again.
    assert_eq!(tokens.revoke_all_for_account(&account_id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_deleting_account_cascades() {
    let db = TestDb::new().await;
    let accounts = SqliteAccountRepository::new(db.pool.clone());
    let tokens = SqliteRefreshTokenRepository::new(db.pool.clone());

    let new = new_account("a@example.com");
    let account_id = new.account.id;
    accounts.create_with_credentials(new).await.unwrap();
    tokens
        .store(refresh_credential(account_id, now()))
        .await
        .unwrap();

    sqlx::query("DELETE FROM accounts WHERE id = ?")
        .bind(account_id.0)
        .execute(&db.pool)
        .await
        .unwrap();

    assert_eq!(count(&db, "password_credentials").await, 0);
    assert_eq!(count(&db, "refresh_tokens").await, 0);
}

#[tokio::test]
async fn test_refresh_token_requires_existing_account() {
    let db = TestDb::new().await;
    let tokens = SqliteRefreshTokenRepository::new(db.pool.clone());

    let result = tokens
        .store(refresh_credential(AccountId::new(), now()))
        .await;

    assert!(matches!(result, Err(CredentialError::DatabaseError(_))));
}

#[tokio::test]
async fn test_update_password() {
    let db = TestDb::new().await;
    let accounts = SqliteAccountRepository::new(db.pool.clone());

    let new = new_account("a@example.com");
    let account_id = new.account.id;
    accounts.create_with_credentials(new).await.unwrap();

    let changed_at = now() + Duration::hours(1);
    accounts
        .update_password(&account_id, &[9; 32], &[8; 16], changed_at)
        .await
        .unwrap();

    let password = accounts
        .find_by_email("a@example.com")
        .await
        .unwrap()
        .unwrap()
        .password
        .unwrap();
    assert_eq!(password.password_hash, vec![9; 32]);
    assert_eq!(password.password_salt, vec![8; 16]);
    assert_eq!(password.updated_at, changed_at);

    assert!(matches!(
        accounts
            .update_password(&AccountId::new(), &[9; 32], &[8; 16], changed_at)
            .await,
        Err(CredentialError::AccountNotFound)
    ));
}

#[tokio::test]
async fn test_deactivated_account_frees_email() {
    let db = TestDb::new().await;
    let accounts = SqliteAccountRepository::new(db.pool.clone());

    let new = new_account("a@example.com");
    let account_id = new.account.id;
    accounts.create_with_credentials(new).await.unwrap();

    accounts.set_active(&account_id, false, now()).await.unwrap();

    assert!(accounts.find_by_email("a@example.com").await.unwrap().is_none());
    let inactive = accounts.find_by_id(&account_id).await.unwrap().unwrap();
    assert!(!inactive.is_active);

    // Only active accounts hold the email.
    accounts
        .create_with_credentials(new_account("a@example.com"))
        .await
        .unwrap();

    assert!(matches!(
        accounts.set_active(&account_id, true, now()).await,
        Err(CredentialError::EmailAlreadyExists(_))
    ));
}
