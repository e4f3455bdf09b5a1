//! Local accounts and the current-session pointer.
//!
//! This is a mock backend: passwords are stored as given, and the pointer is
//! trusted on every read without re-checking that its account still exists.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result, ValidationError};
use crate::storage::{keys, read_json, simulate, write_json, KvStore};

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// The logged-in account, without its password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl From<&Account> for CurrentUser {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            email: account.email.clone(),
            name: account.name.clone(),
        }
    }
}

/// Field checks shared by login and signup.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Full signup form check, including the repeated password.
pub fn validate_signup(
    email: &str,
    password: &str,
    confirm_password: &str,
    name: &str,
) -> Result<(), ValidationError> {
    validate_credentials(email, password)?;
    if name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Read the pointer. An unparseable pointer is removed and reads as logged
/// out.
pub(crate) fn load_current_user(store: &dyn KvStore) -> Result<Option<CurrentUser>> {
    let Some(raw) = store.get(keys::CURRENT_SESSION)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(user) => Ok(Some(user)),
        Err(e) => {
            tracing::warn!(error = %e, "malformed current-session pointer, logging out");
            store.remove(keys::CURRENT_SESSION)?;
            Ok(None)
        }
    }
}

#[derive(Clone)]
pub struct Accounts {
    store: Arc<dyn KvStore>,
    latency: Duration,
}

impl Accounts {
    pub fn new(store: Arc<dyn KvStore>, latency: Duration) -> Self {
        Self { store, latency }
    }

    fn accounts(&self) -> Result<Vec<Account>> {
        Ok(read_json(&*self.store, keys::ACCOUNTS)?.unwrap_or_default())
    }

    /// Create an account and log it in.
    ///
    /// # Errors
    /// `Validation` on bad fields, `DuplicateAccount` when the email (compared
    /// case-sensitively) is taken.
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> Result<CurrentUser> {
        validate_credentials(email, password)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName.into());
        }
        simulate(self.latency).await;

        let mut accounts = self.accounts()?;
        if accounts.iter().any(|a| a.email == email) {
            return Err(CoreError::DuplicateAccount {
                email: email.to_string(),
            });
        }

        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        let user = CurrentUser::from(&account);
        accounts.push(account);
        write_json(&*self.store, keys::ACCOUNTS, &accounts)?;
        write_json(&*self.store, keys::CURRENT_SESSION, &user)?;

        tracing::info!(user_id = %user.id, "account created");
        Ok(user)
    }

    /// # Errors
    /// `InvalidCredentials` on any mismatch, without saying which field.
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser> {
        validate_credentials(email, password)?;
        simulate(self.latency).await;

        let accounts = self.accounts()?;
        let account = accounts
            .iter()
            .find(|a| a.email == email && a.password == password)
            .ok_or(CoreError::InvalidCredentials)?;
        let user = CurrentUser::from(account);
        write_json(&*self.store, keys::CURRENT_SESSION, &user)?;

        tracing::info!(user_id = %user.id, "logged in");
        Ok(user)
    }

    pub fn logout(&self) -> Result<()> {
        self.store.remove(keys::CURRENT_SESSION)?;
        tracing::info!("logged out");
        Ok(())
    }

    pub fn current_user(&self) -> Result<Option<CurrentUser>> {
        load_current_user(&*self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn accounts() -> (Arc<MemoryStore>, Accounts) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), Accounts::new(store, Duration::ZERO))
    }

    #[tokio::test]
    async fn signup_then_duplicate_fails() {
        let (_, accounts) = accounts();
        let user = accounts.signup("a@b.com", "abcdef", "A").await.unwrap();
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.name, "A");
        assert_eq!(accounts.current_user().unwrap(), Some(user));

        let err = accounts.signup("a@b.com", "abcdef", "A").await.unwrap_err();
        assert!(matches!(err, CoreError::DuplicateAccount { .. }));
    }

    #[tokio::test]
    async fn email_uniqueness_is_case_sensitive() {
        let (_, accounts) = accounts();
        accounts.signup("a@b.com", "abcdef", "A").await.unwrap();
        assert!(accounts.signup("A@b.com", "abcdef", "A").await.is_ok());
    }

    #[tokio::test]
    async fn login_roundtrip_and_logout() {
        let (_, accounts) = accounts();
        let created = accounts.signup("me@x.io", "secret1", "  Me  ").await.unwrap();
        assert_eq!(created.name, "Me");
        accounts.logout().unwrap();
        assert!(accounts.current_user().unwrap().is_none());

        let user = accounts.login("me@x.io", "secret1").await.unwrap();
        assert_eq!(user, created);
        assert_eq!(accounts.current_user().unwrap(), Some(created));
    }

    #[tokio::test]
    async fn login_mismatch_is_ambiguous() {
        let (_, accounts) = accounts();
        accounts.signup("me@x.io", "secret1", "Me").await.unwrap();

        let wrong_pw = accounts.login("me@x.io", "secret2").await.unwrap_err();
        let wrong_email = accounts.login("you@x.io", "secret1").await.unwrap_err();
        assert_eq!(wrong_pw.to_string(), "Invalid email or password");
        assert_eq!(wrong_pw.to_string(), wrong_email.to_string());
    }

    #[tokio::test]
    async fn password_is_persisted_as_given() {
        let (store, accounts) = accounts();
        accounts.signup("me@x.io", "secret1", "Me").await.unwrap();
        let raw = store.get(keys::ACCOUNTS).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[0]["password"], "secret1");
        assert!(json[0]["createdAt"].is_string());
    }

    #[test]
    fn field_validation_order() {
        assert_eq!(
            validate_credentials("", "abcdef"),
            Err(ValidationError::MissingFields)
        );
        assert_eq!(
            validate_credentials("not-an-email", "abcdef"),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            validate_credentials("a@b.com", "abc"),
            Err(ValidationError::PasswordTooShort { min: 6 })
        );
        assert_eq!(
            validate_signup("a@b.com", "abcdef", "abcdef", "   "),
            Err(ValidationError::MissingName)
        );
        assert_eq!(
            validate_signup("a@b.com", "abcdef", "abcdeg", "A"),
            Err(ValidationError::PasswordMismatch)
        );
        assert!(validate_signup("a@b.com", "abcdef", "abcdef", "A").is_ok());
    }

    #[test]
    fn malformed_pointer_logs_out() {
        let (store, accounts) = accounts();
        store.set(keys::CURRENT_SESSION, "{\"id\":").unwrap();
        assert!(accounts.current_user().unwrap().is_none());
        assert!(store.get(keys::CURRENT_SESSION).unwrap().is_none());
    }

    #[test]
    fn pointer_is_trusted_without_an_account() {
        let (store, accounts) = accounts();
        store
            .set(
                keys::CURRENT_SESSION,
                r#"{"id":"ghost","email":"g@h.io","name":"Ghost"}"#,
            )
            .unwrap();
        let user = accounts.current_user().unwrap().unwrap();
        assert_eq!(user.id, "ghost");
    }
}
