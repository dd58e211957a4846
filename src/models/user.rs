use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use uuid::Uuid;

use super::entity::{Entity, EntityKind};
use super::validate::{below, not_blank, ValidationError};

/// A platform account. Users are identified by email alone.
///
/// The password is never part of equality, `Debug`, `Display` or serialized
/// output.
#[derive(Clone, Serialize)]
pub struct User {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    #[serde(skip)]
    password: String,
}

impl User {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let mut user = Self {
            id: Uuid::new_v4(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password: String::new(),
        };
        user.set_first_name(first_name)?;
        user.set_last_name(last_name)?;
        user.set_email(email)?;
        user.set_password(password)?;
        Ok(user)
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn set_first_name(&mut self, first_name: impl Into<String>) -> Result<(), ValidationError> {
        let first_name = first_name.into();
        not_blank(&first_name, "firstName cannot be null or empty")?;
        below(&first_name, 128, "firstName cannot exceed 128 characters")?;
        self.first_name = first_name;
        Ok(())
    }

    pub fn set_last_name(&mut self, last_name: impl Into<String>) -> Result<(), ValidationError> {
        let last_name = last_name.into();
        not_blank(&last_name, "lastName cannot be null or empty")?;
        below(&last_name, 64, "lastName cannot exceed 64 characters")?;
        self.last_name = last_name;
        Ok(())
    }

    /// Length bounds only apply once the value looks like an address.
    pub fn set_email(&mut self, email: impl Into<String>) -> Result<(), ValidationError> {
        let email = email.into();
        not_blank(&email, "email cannot be null or empty")?;
        if email.contains('@') {
            let len = email.chars().count();
            if len >= 320 {
                return Err(ValidationError::TooLong("email cannot exceed 320 characters"));
            }
            if len <= 5 {
                return Err(ValidationError::TooShort(
                    "email cannot be shorter than 5 characters",
                ));
            }
        }
        self.email = email;
        Ok(())
    }

    pub fn set_password(&mut self, password: impl Into<String>) -> Result<(), ValidationError> {
        let password = password.into();
        not_blank(&password, "password cannot be null or empty")?;
        below(&password, 128, "password cannot exceed 128 characters")?;
        if password.chars().count() <= 6 {
            return Err(ValidationError::TooShort(
                "password cannot be shorter than 6 characters",
            ));
        }
        self.password = password;
        Ok(())
    }

    /// Compare a candidate (surrounding whitespace ignored) with the stored password.
    pub fn is_password_match(&self, candidate: &str) -> bool {
        self.password == candidate.trim()
    }

    /// Raw password, for storage adapters only.
    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.email == other.email
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.email.hash(state);
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} <{}>", self.first_name, self.last_name, self.email)
    }
}
