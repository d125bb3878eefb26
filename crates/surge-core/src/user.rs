//! The `User` entity and its creation request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identity assigned by the store at insert time.
pub type UserId = i64;

/// Width of the `name` and `email` columns.
pub const MAX_FIELD_LEN: usize = 100;

/// A stored user. Immutable once the store has assigned `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller when creating a user.
///
/// # Examples
///
/// ```
/// use surge_core::NewUser;
///
/// let new = NewUser::new("  Ada ", "ada@example.com").validated().unwrap();
/// assert_eq!(new.name, "Ada");
///
/// assert!(NewUser::new("", "ada@example.com").validated().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Trims both fields and checks them against the column constraints.
    pub fn validated(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();

        check_field("name", &name)?;
        check_field("email", &email)?;

        if !email.contains('@') {
            return Err(Error::bad_input("email must contain '@'"));
        }

        Ok(Self { name, email })
    }
}

fn check_field(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::bad_input(format!("{field} cannot be empty")));
    }
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(Error::bad_input(format!(
            "{field} cannot be longer than {MAX_FIELD_LEN} characters"
        )));
    }
    Ok(())
}
