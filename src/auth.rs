use crate::model::{Role, User};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid name or PIN")]
    InvalidCredentials,
    #[error("sign in first")]
    NotAuthenticated,
    #[error("the {role} role cannot use this module")]
    Forbidden { role: &'static str },
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::NotAuthenticated => "not_authenticated",
            AuthError::Forbidden { .. } => "forbidden",
        }
    }
}

/// Minimum standing a request needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any signed-in account.
    Member,
    Management,
    Admin,
}

impl Role {
    pub fn grants(self, access: Access) -> bool {
        match access {
            Access::Member => true,
            Access::Management => matches!(self, Role::Admin | Role::Management),
            Access::Admin => self == Role::Admin,
        }
    }
}

/// First account whose name matches case-insensitively and whose PIN
/// matches exactly. Neither is trimmed. Which half was wrong is never
/// reported.
pub fn authenticate<'a>(users: &'a [User], name: &str, pin: &str) -> Result<&'a User, AuthError> {
    if name.is_empty() || pin.is_empty() {
        return Err(AuthError::InvalidCredentials);
    }
    let wanted = name.to_lowercase();
    users
        .iter()
        .find(|u| u.name.to_lowercase() == wanted && u.pin == pin)
        .ok_or(AuthError::InvalidCredentials)
}

pub fn authorize(session: Option<&User>, access: Access) -> Result<&User, AuthError> {
    let user = session.ok_or(AuthError::NotAuthenticated)?;
    if !user.role.grants(access) {
        return Err(AuthError::Forbidden {
            role: user.role.label(),
        });
    }
    Ok(user)
}
