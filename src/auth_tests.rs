#![allow(clippy::unwrap_used)]

use super::*;
use crate::models::category::DEFAULT_CATEGORIES;
use crate::store::SqliteStore;

fn store() -> SqliteStore {
    SqliteStore::open_in_memory().unwrap()
}

#[test]
fn test_register_then_login() {
    let mut store = store();
    let id = register(&mut store, "Asha", "asha@example.com", "s3cret").unwrap();
    let session = login(&mut store, "asha@example.com", "s3cret").unwrap();
    assert_eq!(session.owner(), &id);
    assert_eq!(session.user.name, "Asha");
    assert_eq!(session.user.email, "asha@example.com");
}

#[test]
fn test_email_normalised() {
    let mut store = store();
    register(&mut store, "Asha", "  Asha@Example.com ", "pw").unwrap();
    assert!(login(&mut store, "ASHA@example.COM", "pw").is_ok());
}

#[test]
fn test_password_not_stored_in_clear() {
    let mut store = store();
    register(&mut store, "Asha", "asha@example.com", "s3cret").unwrap();
    let record = store.find_user_by_email("asha@example.com").unwrap().unwrap();
    assert_ne!(record.password_hash, "s3cret");
    assert!(record.password_hash.starts_with("$argon2"));
}

#[test]
fn test_wrong_password_and_unknown_email_look_alike() {
    let mut store = store();
    register(&mut store, "Asha", "asha@example.com", "s3cret").unwrap();

    let wrong = login(&mut store, "asha@example.com", "nope").unwrap_err();
    let unknown = login(&mut store, "ghost@example.com", "s3cret").unwrap_err();
    assert!(matches!(wrong, AuthError::InvalidCredentials));
    assert!(matches!(unknown, AuthError::InvalidCredentials));
    assert_eq!(wrong.to_string(), unknown.to_string());
}

#[test]
fn test_duplicate_email_rejected() {
    let mut store = store();
    register(&mut store, "Asha", "asha@example.com", "a").unwrap();
    let err = register(&mut store, "Other", "ASHA@example.com", "b").unwrap_err();
    assert!(matches!(err, AuthError::EmailTaken));
}

#[test]
fn test_register_validates_input() {
    let mut store = store();
    assert!(matches!(
        register(&mut store, " ", "a@example.com", "pw").unwrap_err(),
        AuthError::Invalid(ValidationError::Empty("name"))
    ));
    assert!(matches!(
        register(&mut store, "A", "not-an-email", "pw").unwrap_err(),
        AuthError::Invalid(ValidationError::InvalidEmail(_))
    ));
    assert!(matches!(
        register(&mut store, "A", "a@example.com", "").unwrap_err(),
        AuthError::Invalid(ValidationError::Empty("password"))
    ));
}

#[test]
fn test_register_seeds_default_categories() {
    let mut store = store();
    let id = register(&mut store, "Asha", "asha@example.com", "pw").unwrap();
    assert_eq!(store.list_categories(&id).unwrap(), DEFAULT_CATEGORIES.to_vec());

    login(&mut store, "asha@example.com", "pw").unwrap();
    assert_eq!(store.list_categories(&id).unwrap().len(), DEFAULT_CATEGORIES.len());
}

#[test]
fn test_email_shape() {
    assert!(is_valid_email("a@b.co"));
    assert!(!is_valid_email("a@b"));
    assert!(!is_valid_email("a b@c.d"));
    assert!(!is_valid_email("@b.co"));
}
