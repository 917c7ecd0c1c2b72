/// Service-level tests for the auth flows, run against in-memory stores.
use crate::error::AuthError;
use crate::tests::fixtures::*;

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn register_returns_profile_and_verification_token() {
    let (service, users, tokens) = test_service();

    let (profile, token) = service
        .register(register_request(Some(TEST_EMAIL), None))
        .await
        .expect("registration should succeed");

    assert_eq!(profile.email.as_deref(), Some(TEST_EMAIL));
    assert!(!profile.email_verified);
    assert!(!token.is_empty());
    assert_eq!(tokens.entry_count(), 1);

    let stored = users.get(profile.id).expect("user persisted");
    let hash = stored.password_hash.expect("hash stored");
    assert_ne!(hash, TEST_PASSWORD);
}

#[tokio::test]
async fn register_duplicate_email_is_rejected() {
    let (service, _users, _tokens) = test_service();

    service
        .register(register_request(Some(TEST_EMAIL), None))
        .await
        .expect("first registration");

    let err = service
        .register(register_request(Some(TEST_EMAIL), Some(TEST_PHONE)))
        .await
        .expect_err("duplicate email");
    assert!(matches!(err, AuthError::AlreadyExists("email")));
}

#[tokio::test]
async fn register_duplicate_phone_is_rejected() {
    let (service, _users, _tokens) = test_service();

    service
        .register(register_request(None, Some(TEST_PHONE)))
        .await
        .expect("first registration");

    let err = service
        .register(register_request(Some("b@x.com"), Some(TEST_PHONE)))
        .await
        .expect_err("duplicate phone");
    assert!(matches!(err, AuthError::AlreadyExists("phone number")));
}

#[tokio::test]
async fn register_requires_email_or_phone() {
    let (service, _users, tokens) = test_service();

    let err = service
        .register(register_request(None, None))
        .await
        .expect_err("missing contact");
    assert!(matches!(err, AuthError::InvalidInput(_)));
    assert_eq!(tokens.entry_count(), 0);
}

#[tokio::test]
async fn register_requires_accepted_terms() {
    let (service, _users, _tokens) = test_service();

    let mut request = register_request(Some(TEST_EMAIL), None);
    request.accepted_terms = false;
    let err = service.register(request).await.expect_err("terms required");
    assert!(matches!(err, AuthError::InvalidInput(_)));
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn login_returns_token_pair_and_updates_last_login() {
    let (service, users, _tokens) = test_service();
    let (profile, _) = service
        .register(register_request(Some(TEST_EMAIL), None))
        .await
        .expect("register");

    let (user, pair) = service
        .authenticate(login_request(Some(TEST_EMAIL), None, TEST_PASSWORD))
        .await
        .expect("login should succeed");

    assert_eq!(user.id, profile.id);
    assert_eq!(pair.token_type, "bearer");
    assert!(!pair.access_token.is_empty());
    assert!(!pair.refresh_token.is_empty());
    assert_ne!(pair.access_token, pair.refresh_token);

    let stored = users.get(profile.id).expect("user");
    assert!(stored.last_login_at.is_some());
}

#[tokio::test]
async fn login_by_phone_works() {
    let (service, _users, _tokens) = test_service();
    service
        .register(register_request(None, Some(TEST_PHONE)))
        .await
        .expect("register");

    let result = service
        .authenticate(login_request(None, Some(TEST_PHONE), TEST_PASSWORD))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn login_wrong_password_and_unknown_user_are_indistinguishable() {
    let (service, _users, _tokens) = test_service();
    service
        .register(register_request(Some(TEST_EMAIL), None))
        .await
        .expect("register");

    let wrong_password = service
        .authenticate(login_request(Some(TEST_EMAIL), None, "secret2"))
        .await
        .expect_err("wrong password");
    let unknown_user = service
        .authenticate(login_request(Some("nobody@x.com"), None, TEST_PASSWORD))
        .await
        .expect_err("unknown user");

    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_user, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn login_soft_deleted_account_is_deactivated_not_invalid() {
    let (service, users, _tokens) = test_service();
    let (profile, _) = service
        .register(register_request(Some(TEST_EMAIL), None))
        .await
        .expect("register");
    users.soft_delete(profile.id);

    let err = service
        .authenticate(login_request(Some(TEST_EMAIL), None, TEST_PASSWORD))
        .await
        .expect_err("deactivated");
    assert!(matches!(err, AuthError::AccountDeactivated));
}

// ============================================================================
// Email verification
// ============================================================================

#[tokio::test]
async fn verify_email_consumes_token_once() {
    let (service, users, _tokens) = test_service();
    let (profile, token) = service
        .register(register_request(Some(TEST_EMAIL), None))
        .await
        .expect("register");

    service.verify_email(&token).await.expect("first use");
    assert!(users.get(profile.id).expect("user").email_verified);

    let err = service
        .verify_email(&token)
        .await
        .expect_err("second use of the same token");
    assert!(matches!(err, AuthError::InvalidOrExpiredToken));
}

#[tokio::test]
async fn verify_email_rejects_garbage_tokens() {
    let (service, _users, _tokens) = test_service();
    let err = service
        .verify_email("not.a.token")
        .await
        .expect_err("garbage token");
    assert!(matches!(err, AuthError::InvalidToken));
}

#[tokio::test]
async fn verify_email_rejects_expired_ledger_entries() {
    let (service, users, tokens) = test_service();
    let (profile, token) = service
        .register(register_request(Some(TEST_EMAIL), None))
        .await
        .expect("register");

    tokens.expire_all();

    let err = service
        .verify_email(&token)
        .await
        .expect_err("expired entry");
    assert!(matches!(err, AuthError::InvalidOrExpiredToken));
    assert!(!users.get(profile.id).expect("user").email_verified);
}

#[tokio::test]
async fn concurrent_consumption_succeeds_at_most_once() {
    let (service, _users, _tokens) = test_service();
    let (_profile, token) = service
        .register(register_request(Some(TEST_EMAIL), None))
        .await
        .expect("register");

    let (first, second) = tokio::join!(service.verify_email(&token), service.verify_email(&token));
    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one concurrent consumer may win");
}

// ============================================================================
// Password reset
// ============================================================================

#[tokio::test]
async fn reset_request_for_unknown_email_issues_nothing() {
    let (service, _users, tokens) = test_service();

    let result = service
        .request_password_reset("nobody@x.com")
        .await
        .expect("no error on unknown email");
    assert!(result.is_none());
    assert_eq!(tokens.entry_count(), 0);
}

#[tokio::test]
async fn reset_flow_replaces_the_password() {
    let (service, _users, tokens) = test_service();
    service
        .register(register_request(Some(TEST_EMAIL), None))
        .await
        .expect("register");

    let (profile, reset_token) = service
        .request_password_reset(TEST_EMAIL)
        .await
        .expect("request")
        .expect("known email yields a token");
    assert_eq!(profile.email.as_deref(), Some(TEST_EMAIL));
    assert_eq!(tokens.entry_count(), 2); // verification + reset

    service
        .reset_password(&reset_token, "newsecret")
        .await
        .expect("reset");

    let old = service
        .authenticate(login_request(Some(TEST_EMAIL), None, TEST_PASSWORD))
        .await
        .expect_err("old password");
    assert!(matches!(old, AuthError::InvalidCredentials));

    service
        .authenticate(login_request(Some(TEST_EMAIL), None, "newsecret"))
        .await
        .expect("new password");

    let replay = service
        .reset_password(&reset_token, "another1")
        .await
        .expect_err("reset token is single-use");
    assert!(matches!(replay, AuthError::InvalidOrExpiredToken));
}

#[tokio::test]
async fn reset_rejects_a_verification_token() {
    // Same encoder, but the ledger kind must match the operation.
    let (service, _users, _tokens) = test_service();
    let (_profile, verification_token) = service
        .register(register_request(Some(TEST_EMAIL), None))
        .await
        .expect("register");

    let err = service
        .reset_password(&verification_token, "newsecret")
        .await
        .expect_err("kind mismatch");
    assert!(matches!(err, AuthError::InvalidOrExpiredToken));
}

#[tokio::test]
async fn reset_rejects_short_passwords() {
    let (service, _users, _tokens) = test_service();
    let err = service
        .reset_password("irrelevant", "short")
        .await
        .expect_err("short password");
    assert!(matches!(err, AuthError::InvalidInput(_)));
}

// ============================================================================
// Refresh
// ============================================================================

#[tokio::test]
async fn refresh_tokens_are_replayable_until_expiry() {
    let (service, _users, _tokens) = test_service();
    service
        .register(register_request(Some(TEST_EMAIL), None))
        .await
        .expect("register");
    let (_user, pair) = service
        .authenticate(login_request(Some(TEST_EMAIL), None, TEST_PASSWORD))
        .await
        .expect("login");

    let first = service
        .refresh(&pair.refresh_token)
        .await
        .expect("first refresh");
    let second = service
        .refresh(&pair.refresh_token)
        .await
        .expect("second refresh with the same token");

    assert!(!first.access_token.is_empty());
    assert!(!second.access_token.is_empty());
    assert!(!first.refresh_token.is_empty());
    assert!(!second.refresh_token.is_empty());
}

#[tokio::test]
async fn refresh_rejects_access_tokens() {
    let (service, _users, _tokens) = test_service();
    service
        .register(register_request(Some(TEST_EMAIL), None))
        .await
        .expect("register");
    let (_user, pair) = service
        .authenticate(login_request(Some(TEST_EMAIL), None, TEST_PASSWORD))
        .await
        .expect("login");

    let err = service
        .refresh(&pair.access_token)
        .await
        .expect_err("wrong claim type");
    assert!(matches!(err, AuthError::InvalidToken));
}

#[tokio::test]
async fn refresh_for_a_deleted_user_fails() {
    let (service, users, _tokens) = test_service();
    let (profile, _) = service
        .register(register_request(Some(TEST_EMAIL), None))
        .await
        .expect("register");
    let (_user, pair) = service
        .authenticate(login_request(Some(TEST_EMAIL), None, TEST_PASSWORD))
        .await
        .expect("login");

    users.soft_delete(profile.id);

    let err = service
        .refresh(&pair.refresh_token)
        .await
        .expect_err("deleted subject");
    assert!(matches!(err, AuthError::UserNotFound));
}

// ============================================================================
// Current user
// ============================================================================

#[tokio::test]
async fn current_user_resolves_access_tokens() {
    let (service, users, _tokens) = test_service();
    let (profile, _) = service
        .register(register_request(Some(TEST_EMAIL), None))
        .await
        .expect("register");
    let (_user, pair) = service
        .authenticate(login_request(Some(TEST_EMAIL), None, TEST_PASSWORD))
        .await
        .expect("login");

    let resolved = service
        .current_user(&pair.access_token)
        .await
        .expect("valid access token");
    assert_eq!(resolved.id, profile.id);

    let err = service
        .current_user(&pair.refresh_token)
        .await
        .expect_err("refresh token is not an access token");
    assert!(matches!(err, AuthError::InvalidToken));

    users.soft_delete(profile.id);
    let err = service
        .current_user(&pair.access_token)
        .await
        .expect_err("deactivated account");
    assert!(matches!(err, AuthError::AccountDeactivated));
}
