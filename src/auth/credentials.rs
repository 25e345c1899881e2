use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::models::user::{NewUser, Role, UserProfile};
use crate::store::{StoreError, UserRepository};

/// bcrypt work factor for stored password hashes.
pub const BCRYPT_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("email is already registered")]
    DuplicateEmail,
    #[error("user not found")]
    NotFound,
    #[error("password does not match")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CredentialError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => CredentialError::DuplicateEmail,
            other => CredentialError::Store(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Stores user accounts with salted bcrypt hashes and checks logins
/// against them.
#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserRepository>,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        CredentialStore { users }
    }

    pub async fn register(&self, registration: Registration) -> Result<UserProfile, CredentialError> {
        self.create(registration, Role::Customer).await
    }

    async fn create(
        &self,
        registration: Registration,
        role: Role,
    ) -> Result<UserProfile, CredentialError> {
        let email = normalize_email(&registration.email);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(CredentialError::DuplicateEmail);
        }

        let password_hash = hash_password(registration.password).await?;

        // insert still fails with DuplicateEmail if a concurrent registration won
        let user = self
            .users
            .insert(NewUser {
                name: registration.name.trim().to_string(),
                email,
                phone: registration.phone.trim().to_string(),
                password_hash,
                role,
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user.into())
    }

    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, CredentialError> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(CredentialError::NotFound)?;

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            return Err(CredentialError::InvalidCredentials);
        }

        Ok(user.into())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserProfile, CredentialError> {
        self.users
            .find_by_id(id)
            .await?
            .map(UserProfile::from)
            .ok_or(CredentialError::NotFound)
    }

    /// Creates the configured admin account unless the email is already
    /// taken. Returns whether an account was created.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<bool, CredentialError> {
        if let Some(existing) = self.users.find_by_email(&normalize_email(email)).await? {
            if existing.role != Role::Admin {
                tracing::warn!(
                    user_id = %existing.id,
                    role = %existing.role,
                    "admin bootstrap email belongs to a non-admin account"
                );
            }
            return Ok(false);
        }

        let registration = Registration {
            name: "Administrator".to_string(),
            email: email.to_string(),
            phone: String::new(),
            password: password.to_string(),
        };
        match self.create(registration, Role::Admin).await {
            Ok(_) => Ok(true),
            Err(CredentialError::DuplicateEmail) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn hash_password(password: String) -> Result<String, CredentialError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|err| CredentialError::Hashing(err.to_string()))?
        .map_err(|err| CredentialError::Hashing(err.to_string()))
}

async fn verify_password(password: String, hash: String) -> Result<bool, CredentialError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|err| CredentialError::Hashing(err.to_string()))?
        .map_err(|err| CredentialError::Hashing(err.to_string()))
}
