//! Account registration and login.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::{StoreError, ValidationError};
use crate::models::{normalize_email, User, UserId};
use crate::store::Store;

#[derive(Debug, Error)]
pub(crate) enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("an account with this email already exists")]
    EmailTaken,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The logged-in user. Handlers receive it explicitly; dropping it logs out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Session {
    pub(crate) user: User,
}

impl Session {
    pub(crate) fn owner(&self) -> &UserId {
        &self.user.id
    }
}

fn is_valid_email(email: &str) -> bool {
    Regex::new(r"^[^@ \t\r\n]+@[^@ \t\r\n]+\.[^@ \t\r\n]+$")
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Create an account and seed its default categories.
pub(crate) fn register(
    store: &mut dyn Store,
    name: &str,
    email: &str,
    password: &str,
) -> Result<UserId, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Empty("name").into());
    }
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail(email).into());
    }
    if password.is_empty() {
        return Err(ValidationError::Empty("password").into());
    }
    if store.find_user_by_email(&email)?.is_some() {
        return Err(AuthError::EmailTaken);
    }

    let hash = hash_password(password)?;
    let id = match store.create_user(name, &email, &hash) {
        Ok(id) => id,
        Err(StoreError::ConstraintViolation(_)) => return Err(AuthError::EmailTaken),
        Err(e) => return Err(e.into()),
    };
    store.ensure_default_categories(&id)?;
    info!(user = %id, "registered new account");
    Ok(id)
}

/// Check credentials. Unknown email and wrong password look the same to the caller.
pub(crate) fn login(
    store: &mut dyn Store,
    email: &str,
    password: &str,
) -> Result<Session, AuthError> {
    let email = normalize_email(email);
    let Some(record) = store.find_user_by_email(&email)? else {
        warn!("login attempt for unknown email");
        return Err(AuthError::InvalidCredentials);
    };
    if !verify_password(password, &record.password_hash) {
        warn!(user = %record.user.id, "login failed: wrong password");
        return Err(AuthError::InvalidCredentials);
    }
    store.ensure_default_categories(&record.user.id)?;
    info!(user = %record.user.id, "logged in");
    Ok(Session { user: record.user })
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
