//! User account entity for identity management.
//!
//! A user is created once through registration, changes only through a
//! profile update, and disappears through explicit deletion. The role is fixed
//! at registration; no operation changes it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, Username};

use crate::Role;

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// User account snapshot.
///
/// # Invariants
/// - `username` is unique ignoring ASCII case.
/// - `role` is immutable after creation.
/// - `name` and `surname` are never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: Username,
    pub name: String,
    pub surname: String,
    pub role: Role,
    pub address: Option<String>,
    pub birthdate: Option<NaiveDate>,
}

impl User {
    /// Build the initial account state from a registration request.
    pub fn register(new: NewUser) -> DomainResult<Self> {
        let name = non_blank(new.name, "name")?;
        let surname = non_blank(new.surname, "surname")?;

        Ok(Self {
            username: new.username,
            name,
            surname,
            role: new.role,
            address: None,
            birthdate: None,
        })
    }
}

impl Entity for User {
    type Id = Username;
    type Patch = ProfileUpdate;
    type Filter = UserFilter;

    fn id(&self) -> &Self::Id {
        &self.username
    }

    fn apply_patch(&mut self, patch: &Self::Patch) {
        self.name = patch.name.clone();
        self.surname = patch.surname.clone();
        self.address = patch.address.clone();
        self.birthdate = patch.birthdate;
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        match filter {
            UserFilter::All => true,
            UserFilter::Role(role) => self.role == *role,
            UserFilter::NonAdmin => !self.role.is_admin(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

/// Registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: Username,
    pub name: String,
    pub surname: String,
    pub role: Role,
}

/// Profile update: replaces every editable field at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub surname: String,
    pub address: Option<String>,
    pub birthdate: Option<NaiveDate>,
}

impl ProfileUpdate {
    /// Normalize and validate the update against the current date.
    ///
    /// A birthdate after `today` is a `DateError`.
    pub fn validated(self, today: NaiveDate) -> DomainResult<Self> {
        let name = non_blank(self.name, "name")?;
        let surname = non_blank(self.surname, "surname")?;

        if let Some(birthdate) = self.birthdate {
            if birthdate > today {
                return Err(DomainError::date(format!(
                    "birthdate {birthdate} is after today ({today})"
                )));
            }
        }

        let address = self
            .address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        Ok(Self {
            name,
            surname,
            address,
            birthdate: self.birthdate,
        })
    }
}

/// Selection criteria for listing or bulk-deleting users.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UserFilter {
    All,
    Role(Role),
    /// Every account whose role is not Admin.
    NonAdmin,
}

fn non_blank(value: String, field: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
