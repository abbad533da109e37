mod common;

use chrono::Duration;

use pagecheck::auth::flow::{AuthFlow, ForgotInput, LoginInput, ResetInput, SignupInput};
use pagecheck::auth::store::CredentialStore;
use pagecheck::auth::tokens::TokenIssuer;
use pagecheck::auth::AuthError;
use pagecheck::rate_limit::LoginRateLimiter;

fn signup_input(identifier: &str, password: &str) -> SignupInput {
    SignupInput {
        identifier: identifier.to_string(),
        password: password.to_string(),
        confirm: password.to_string(),
    }
}

fn login_input(identifier: &str, password: &str) -> LoginInput {
    LoginInput {
        identifier: identifier.to_string(),
        password: password.to_string(),
    }
}

fn reset_input(token: &str, password: &str) -> ResetInput {
    ResetInput {
        token: token.to_string(),
        new_password: password.to_string(),
    }
}

// ── Credential store ────────────────────────────────────────────

#[tokio::test]
async fn signup_then_login_returns_same_user() {
    let (pool, db_path) = common::test_pool().await;
    let flow = AuthFlow::new(pool.clone());

    let created = flow.signup(signup_input("a@x.com", "Secret123")).await.unwrap();
    let logged_in = flow.login(login_input("a@x.com", "Secret123")).await.unwrap();
    assert_eq!(created.id, logged_in.id);

    let err = flow.login(login_input("a@x.com", "wrong")).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    pool.close().await;
    let _ = std::fs::remove_file(db_path);
}

#[tokio::test]
async fn duplicate_identifier_rejected_regardless_of_case() {
    let (pool, db_path) = common::test_pool().await;
    let flow = AuthFlow::new(pool.clone());

    flow.signup(signup_input("a@x.com", "Secret123")).await.unwrap();

    let err = flow
        .signup(signup_input("A@X.COM", "Completelydifferent9"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::DuplicateIdentifier));

    pool.close().await;
    let _ = std::fs::remove_file(db_path);
}

#[tokio::test]
async fn login_normalizes_identifier_case() {
    let (pool, db_path) = common::test_pool().await;
    let flow = AuthFlow::new(pool.clone());

    flow.signup(signup_input("A@X.com", "Secret123")).await.unwrap();
    let user = flow.login(login_input("a@x.COM", "Secret123")).await.unwrap();
    assert_eq!(user.identifier, "a@x.com");

    pool.close().await;
    let _ = std::fs::remove_file(db_path);
}

#[tokio::test]
async fn unknown_user_and_wrong_password_look_identical() {
    let (pool, db_path) = common::test_pool().await;
    let flow = AuthFlow::new(pool.clone());

    flow.signup(signup_input("a@x.com", "Secret123")).await.unwrap();

    let wrong_pw = flow.login(login_input("a@x.com", "wrongwrong")).await.unwrap_err();
    let no_user = flow.login(login_input("b@x.com", "Secret123")).await.unwrap_err();

    assert!(matches!(wrong_pw, AuthError::InvalidCredentials));
    assert!(matches!(no_user, AuthError::InvalidCredentials));
    assert_eq!(wrong_pw.to_string(), no_user.to_string());

    pool.close().await;
    let _ = std::fs::remove_file(db_path);
}

#[tokio::test]
async fn password_policy_enforced_on_signup_and_reset() {
    let (pool, db_path) = common::test_pool().await;
    let flow = AuthFlow::new(pool.clone());

    let err = flow.signup(signup_input("a@x.com", "short")).await.unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));

    let err = flow
        .signup(SignupInput {
            identifier: "a@x.com".to_string(),
            password: "Secret123".to_string(),
            confirm: "Secret124".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));

    let err = flow.reset_password(reset_input("whatever", "short")).await.unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));

    pool.close().await;
    let _ = std::fs::remove_file(db_path);
}

#[tokio::test]
async fn update_password_for_missing_user_is_not_found() {
    let (pool, db_path) = common::test_pool().await;
    let store = CredentialStore::new(pool.clone());

    let err = store.update_password(&pool, 9999, "Secret123").await.unwrap_err();
    assert!(matches!(err, AuthError::NotFound));

    pool.close().await;
    let _ = std::fs::remove_file(db_path);
}

// ── Token issuer ────────────────────────────────────────────────

#[tokio::test]
async fn token_consumed_exactly_once() {
    let (pool, db_path) = common::test_pool().await;
    let flow = AuthFlow::new(pool.clone());
    let issuer = TokenIssuer::new(pool.clone());

    let user = flow.signup(signup_input("a@x.com", "Secret123")).await.unwrap();
    let issued = issuer.issue(user.id).await.unwrap();

    let user_id = issuer.validate_and_consume(&issued.token).await.unwrap();
    assert_eq!(user_id, user.id);

    let err = issuer.validate_and_consume(&issued.token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenConsumed));

    pool.close().await;
    let _ = std::fs::remove_file(db_path);
}

#[tokio::test]
async fn newer_token_supersedes_older() {
    let (pool, db_path) = common::test_pool().await;
    let flow = AuthFlow::new(pool.clone());
    let issuer = TokenIssuer::new(pool.clone());

    let user = flow.signup(signup_input("a@x.com", "Secret123")).await.unwrap();
    let first = issuer.issue(user.id).await.unwrap();
    let second = issuer.issue(user.id).await.unwrap();

    let err = issuer.validate_and_consume(&first.token).await.unwrap_err();
    assert!(matches!(err, AuthError::NotFound));

    issuer.validate_and_consume(&second.token).await.unwrap();

    pool.close().await;
    let _ = std::fs::remove_file(db_path);
}

#[tokio::test]
async fn superseded_token_stays_invalid_after_newer_token_is_consumed() {
    let (pool, db_path) = common::test_pool().await;
    let flow = AuthFlow::new(pool.clone());
    let issuer = TokenIssuer::new(pool.clone());

    let user = flow.signup(signup_input("a@x.com", "Secret123")).await.unwrap();
    let first = issuer.issue(user.id).await.unwrap();
    let second = issuer.issue(user.id).await.unwrap();

    issuer.validate_and_consume(&second.token).await.unwrap();

    // Consuming the newer token must not bring the older one back to life
    let err = issuer.validate_and_consume(&first.token).await.unwrap_err();
    assert!(matches!(err, AuthError::NotFound));

    pool.close().await;
    let _ = std::fs::remove_file(db_path);
}

#[tokio::test]
async fn token_consumption_rolls_back_with_enclosing_transaction() {
    let (pool, db_path) = common::test_pool().await;
    let flow = AuthFlow::new(pool.clone());
    let issuer = TokenIssuer::new(pool.clone());

    let user = flow.signup(signup_input("a@x.com", "Secret123")).await.unwrap();
    let issued = issuer.issue(user.id).await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    issuer.consume_in_tx(&mut tx, &issued.token).await.unwrap();
    drop(tx);

    // The rollback undid the consumption, so the token is still spendable
    issuer.validate_and_consume(&issued.token).await.unwrap();

    pool.close().await;
    let _ = std::fs::remove_file(db_path);
}

#[test]
fn lapsed_rate_limit_entries_are_evicted() {
    let limiter = LoginRateLimiter::new();
    for _ in 0..5 {
        limiter.record_failure("a@x.com");
    }
    assert!(limiter.check("a@x.com").is_err());

    limiter.cleanup(std::time::Duration::ZERO);
    assert!(limiter.check("a@x.com").is_ok());
}

#[tokio::test]
async fn expired_token_rejected() {
    let (pool, db_path) = common::test_pool().await;
    let flow = AuthFlow::new(pool.clone());
    let issuer = TokenIssuer::with_ttl(pool.clone(), Duration::seconds(-1));

    let user = flow.signup(signup_input("a@x.com", "Secret123")).await.unwrap();
    let issued = issuer.issue(user.id).await.unwrap();

    let err = issuer.validate_and_consume(&issued.token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenExpired));

    pool.close().await;
    let _ = std::fs::remove_file(db_path);
}

#[tokio::test]
async fn unknown_token_rejected() {
    let (pool, db_path) = common::test_pool().await;
    let issuer = TokenIssuer::new(pool.clone());

    let err = issuer.validate_and_consume("deadbeef").await.unwrap_err();
    assert!(matches!(err, AuthError::NotFound));

    pool.close().await;
    let _ = std::fs::remove_file(db_path);
}

// ── Full flow ───────────────────────────────────────────────────

#[tokio::test]
async fn forgot_password_for_unknown_identifier_issues_nothing() {
    let (pool, db_path) = common::test_pool().await;
    let flow = AuthFlow::new(pool.clone());

    let issued = flow
        .forgot_password(ForgotInput {
            identifier: "nobody@x.com".to_string(),
        })
        .await
        .unwrap();
    assert!(issued.is_none());

    pool.close().await;
    let _ = std::fs::remove_file(db_path);
}

#[tokio::test]
async fn forgot_then_reset_scenario() {
    let (pool, db_path) = common::test_pool().await;
    let flow = AuthFlow::new(pool.clone());

    flow.signup(signup_input("a@x.com", "Secret123")).await.unwrap();

    let t1 = flow
        .forgot_password(ForgotInput {
            identifier: "a@x.com".to_string(),
        })
        .await
        .unwrap()
        .expect("token issued");
    let t2 = flow
        .forgot_password(ForgotInput {
            identifier: "a@x.com".to_string(),
        })
        .await
        .unwrap()
        .expect("token issued");

    // The first link went stale the moment the second was issued
    let err = flow
        .reset_password(reset_input(&t1.token, "NewSecret1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::NotFound));

    flow.reset_password(reset_input(&t2.token, "NewSecret1"))
        .await
        .unwrap();

    flow.login(login_input("a@x.com", "NewSecret1")).await.unwrap();
    let err = flow.login(login_input("a@x.com", "Secret123")).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    pool.close().await;
    let _ = std::fs::remove_file(db_path);
}
