//! Local user directory.
//!
//! There are no passwords or remote calls. `login` creates the user on first
//! use, `signup` refuses an email that is already registered, and `logout`
//! only forgets who is current. All state lives in the key-value store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{AccountError, Result};
use crate::stats::{GoalDefaults, UserStats};
use crate::storage::{keys, load_json, load_json_or_default, save_json, KvStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_new_user: bool,
}

impl User {
    fn new(email: &str, name: Option<&str>, now: DateTime<Utc>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or(email));
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: name.to_string(),
            created_at: now,
            is_new_user: true,
        }
    }
}

pub struct Accounts<S: KvStore> {
    store: S,
    goals: GoalDefaults,
}

impl<S: KvStore> Accounts<S> {
    /// `goals` seed the stats of users created through this directory.
    pub fn new(store: S, goals: GoalDefaults) -> Self {
        Self { store, goals }
    }

    pub fn users(&self) -> Result<Vec<User>> {
        load_json_or_default(&self.store, keys::USERS)
    }

    pub fn find(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim();
        Ok(self.users()?.into_iter().find(|u| u.email == email))
    }

    /// Log in as `email`, creating the user if needed.
    ///
    /// # Errors
    /// `EmptyEmail` for a blank email; storage errors otherwise.
    pub fn login(&mut self, email: &str) -> Result<User> {
        let email = normalized(email)?;
        let user = match self.find(email)? {
            Some(user) => user,
            None => self.register(email, None)?,
        };
        self.ensure_stats(&user.id)?;
        self.set_current(&user)?;
        info!(user_id = %user.id, "logged in");
        Ok(user)
    }

    /// Register a new user and log in as them.
    ///
    /// # Errors
    /// `AlreadyExists` if the email is taken, `EmptyEmail` for a blank email.
    pub fn signup(&mut self, email: &str, name: Option<&str>) -> Result<User> {
        let email = normalized(email)?;
        if self.find(email)?.is_some() {
            return Err(AccountError::AlreadyExists(email.to_string()).into());
        }
        let user = self.register(email, name)?;
        save_json(
            &mut self.store,
            &keys::stats(&user.id),
            &UserStats::initial(self.goals, Utc::now()),
        )?;
        self.set_current(&user)?;
        info!(user_id = %user.id, "signed up");
        Ok(user)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.store.remove(keys::CURRENT_USER)?;
        info!("logged out");
        Ok(())
    }

    /// The logged-in user, if any.
    pub fn current(&self) -> Result<Option<User>> {
        let Some(id) = load_json::<String>(&self.store, keys::CURRENT_USER)? else {
            return Ok(None);
        };
        Ok(self.users()?.into_iter().find(|u| u.id == id))
    }

    /// Like [`Accounts::current`], but a missing user is an error.
    ///
    /// # Errors
    /// `NotLoggedIn` when nobody is logged in.
    pub fn require_current(&self) -> Result<User> {
        self.current()?
            .ok_or_else(|| AccountError::NotLoggedIn.into())
    }

    /// Clear the new-user flag.
    pub fn mark_onboarded(&mut self, user_id: &str) -> Result<()> {
        let mut users = self.users()?;
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.is_new_user = false;
        }
        save_json(&mut self.store, keys::USERS, &users)
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn register(&mut self, email: &str, name: Option<&str>) -> Result<User> {
        let mut users = self.users()?;
        let user = User::new(email, name, Utc::now());
        users.push(user.clone());
        save_json(&mut self.store, keys::USERS, &users)?;
        Ok(user)
    }

    fn ensure_stats(&mut self, user_id: &str) -> Result<()> {
        let key = keys::stats(user_id);
        if self.store.get(&key)?.is_none() {
            save_json(&mut self.store, &key, &UserStats::initial(self.goals, Utc::now()))?;
        }
        Ok(())
    }

    fn set_current(&mut self, user: &User) -> Result<()> {
        save_json(&mut self.store, keys::CURRENT_USER, &user.id)
    }
}

fn normalized(email: &str) -> Result<&str> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AccountError::EmptyEmail.into());
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::storage::MemoryStore;

    fn accounts() -> Accounts<MemoryStore> {
        Accounts::new(MemoryStore::new(), GoalDefaults::default())
    }

    #[test]
    fn login_creates_user_once() {
        let mut accounts = accounts();
        let first = accounts.login("ada@example.com").unwrap();
        assert_eq!(first.name, "ada");
        assert!(first.is_new_user);
        let again = accounts.login("  ada@example.com ").unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(accounts.users().unwrap().len(), 1);
        assert_eq!(accounts.current().unwrap().unwrap().id, first.id);
    }

    #[test]
    fn login_initializes_stats() {
        let mut accounts = accounts();
        let user = accounts.login("ada@example.com").unwrap();
        let store = accounts.into_store();
        let stats: UserStats = load_json(&store, &keys::stats(&user.id)).unwrap().unwrap();
        assert_eq!(stats.weekly_goal(), 20.0);
        assert_eq!(stats.productivity_score(), 0);
    }

    #[test]
    fn signup_rejects_duplicates() {
        let mut accounts = accounts();
        let user = accounts.signup("grace@example.com", Some("Grace")).unwrap();
        assert_eq!(user.name, "Grace");
        let err = accounts.signup("grace@example.com", None).unwrap_err();
        assert!(matches!(err, CoreError::Account(AccountError::AlreadyExists(_))));
    }

    #[test]
    fn empty_email_is_rejected() {
        let mut accounts = accounts();
        assert!(matches!(
            accounts.login("   "),
            Err(CoreError::Account(AccountError::EmptyEmail))
        ));
    }

    #[test]
    fn logout_clears_current_only() {
        let mut accounts = accounts();
        accounts.login("ada@example.com").unwrap();
        accounts.logout().unwrap();
        assert!(accounts.current().unwrap().is_none());
        assert!(matches!(
            accounts.require_current(),
            Err(CoreError::Account(AccountError::NotLoggedIn))
        ));
        assert_eq!(accounts.users().unwrap().len(), 1);
    }

    #[test]
    fn mark_onboarded_clears_flag() {
        let mut accounts = accounts();
        let user = accounts.login("ada@example.com").unwrap();
        accounts.mark_onboarded(&user.id).unwrap();
        assert!(!accounts.current().unwrap().unwrap().is_new_user);
    }
}
