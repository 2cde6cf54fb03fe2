//! Authentication state.
//!
//! A session is valid only when a token and a stored profile with an id and
//! an email are all present. Anything less is purged on startup.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use shopfront_core::{Email, UserId, UserRole};
use tracing::{debug, info};

use super::OpStatus;
use crate::api::{LoginRequest, LoginResponse, RegisterRequest};
use crate::persistence::{Persistence, keys};

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTER_FAILED: &str = "Registration failed";
pub const INVALID_LOGIN_RESPONSE: &str = "Invalid login response from server";
pub const INCOMPLETE_USER_DATA: &str = "Incomplete user data received from server";

/// The signed-in user, as stored under `userData`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
}

/// Partial profile update. Ignored unless it carries an id.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub id: Option<UserId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserState {
    pub profile: UserProfile,
    #[serde(skip)]
    pub token: Option<SecretString>,
    pub is_logged_in: bool,
    pub login: OpStatus,
    pub register: OpStatus,
}

impl UserState {
    /// Restore a session from persistence, or purge partial auth data.
    pub fn initialize_auth(&mut self, persistence: &Persistence) {
        let token = persistence.token();
        let stored = persistence.load::<UserProfile>(keys::USER_DATA);
        let role = persistence.load::<UserRole>(keys::ROLE);

        match (token, stored) {
            (Some(token), Some(profile)) if !profile.id.is_empty() && !profile.email.is_empty() => {
                debug!(user_id = %profile.id, "Restored stored session");
                self.profile = UserProfile {
                    role: if profile.role == UserRole::Customer {
                        role.unwrap_or_default()
                    } else {
                        profile.role
                    },
                    ..profile
                };
                self.token = Some(SecretString::from(token));
                self.is_logged_in = true;
                self.login.error = None;
                self.register.error = None;
            }
            _ => {
                debug!("No valid stored session");
                persistence.purge_auth();
                self.reset();
            }
        }
    }

    /// Validate a login response and, if it is complete, persist the session.
    ///
    /// # Errors
    ///
    /// Returns the message to record when the response lacks a token or the
    /// user's id, email or name.
    pub fn accept_login(
        &mut self,
        response: LoginResponse,
        persistence: &Persistence,
    ) -> Result<&UserProfile, &'static str> {
        let (Some(user), Some(token)) = (response.user, response.token.filter(|t| !t.is_empty()))
        else {
            return Err(INVALID_LOGIN_RESPONSE);
        };
        let (Some(id), Some(email), Some(name)) = (
            user.id.filter(|s| !s.is_empty()),
            user.email.filter(|s| !s.is_empty()),
            user.name.filter(|s| !s.is_empty()),
        ) else {
            return Err(INCOMPLETE_USER_DATA);
        };

        let profile = UserProfile {
            id: UserId::new(id),
            name,
            email,
            phone: user.phone.unwrap_or_default(),
            role: user.role.unwrap_or_default(),
        };
        persistence.save(keys::TOKEN, &token);
        persistence.save(keys::USER_DATA, &profile);
        persistence.save(keys::ROLE, &profile.role);

        info!(user_id = %profile.id, role = %profile.role, "Signed in");
        self.profile = profile;
        self.token = Some(SecretString::from(token));
        self.is_logged_in = true;
        self.login.succeed();
        Ok(&self.profile)
    }

    /// Sign out and purge stored auth.
    pub fn logout(&mut self, persistence: &Persistence) {
        persistence.purge_auth();
        self.reset();
    }

    /// Clear in-memory auth state (stored keys untouched).
    pub fn reset(&mut self) {
        self.profile = UserProfile::default();
        self.token = None;
        self.is_logged_in = false;
        self.login.error = None;
        self.register.error = None;
    }

    /// Merge `patch` into the profile. Persisted only while signed in.
    pub fn set_user(&mut self, patch: UserPatch, persistence: &Persistence) -> bool {
        let Some(id) = patch.id.filter(|id| !id.is_empty()) else {
            return false;
        };
        self.profile.id = id;
        if let Some(name) = patch.name.filter(|s| !s.is_empty()) {
            self.profile.name = name;
        }
        if let Some(email) = patch.email.filter(|s| !s.is_empty()) {
            self.profile.email = email;
        }
        if let Some(phone) = patch.phone.filter(|s| !s.is_empty()) {
            self.profile.phone = phone;
        }
        if let Some(role) = patch.role {
            self.profile.role = role;
        }
        let token = patch.token.filter(|s| !s.is_empty());
        if let Some(token) = &token {
            self.token = Some(SecretString::from(token.clone()));
        }

        if self.is_logged_in {
            persistence.save(keys::USER_DATA, &self.profile);
            persistence.save(keys::ROLE, &self.profile.role);
            if let Some(token) = &token {
                persistence.save(keys::TOKEN, token);
            }
        }
        true
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_logged_in && self.profile.role.is_staff()
    }

    /// The bearer token of the current session.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret())
    }
}

/// Check login input before sending it.
///
/// # Errors
///
/// Returns a message describing the first problem found.
pub fn validate_login(email: &str, password: &str) -> Result<LoginRequest, String> {
    let email = Email::parse(email.trim()).map_err(|e| e.to_string())?;
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    Ok(LoginRequest {
        email: email.into_inner(),
        password: password.to_string(),
    })
}

/// Check registration input before sending it.
///
/// # Errors
///
/// Returns a message describing the first problem found.
pub fn validate_registration(
    email: &str,
    password: &str,
    name: &str,
    phone: &str,
) -> Result<RegisterRequest, String> {
    let login = validate_login(email, password)?;
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }
    Ok(RegisterRequest {
        email: login.email,
        password: login.password,
        name: name.trim().to_string(),
        phone: phone.trim().to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::LoginUser;

    fn login_response(value: serde_json::Value) -> LoginResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_accept_login_persists_session() {
        let persistence = Persistence::in_memory();
        let mut user = UserState::default();
        let response = login_response(json!({
            "token": "tok",
            "user": { "id": 7, "name": "Ada", "email": "ada@example.com", "role": "ADMIN" }
        }));

        let profile = user.accept_login(response, &persistence).unwrap();
        assert_eq!(profile.id.as_str(), "7");
        assert!(user.is_logged_in);
        assert!(user.is_admin());
        assert_eq!(user.token(), Some("tok"));
        assert_eq!(persistence.token().as_deref(), Some("tok"));
        assert_eq!(persistence.load::<UserRole>(keys::ROLE), Some(UserRole::Admin));
    }

    #[test]
    fn test_accept_login_rejects_missing_token_or_fields() {
        let persistence = Persistence::in_memory();
        let mut user = UserState::default();

        let no_token = LoginResponse {
            user: Some(LoginUser::default()),
            token: None,
        };
        assert_eq!(user.accept_login(no_token, &persistence), Err(INVALID_LOGIN_RESPONSE));

        let no_name = login_response(json!({
            "token": "tok",
            "user": { "id": "u1", "email": "a@b.co" }
        }));
        assert_eq!(user.accept_login(no_name, &persistence), Err(INCOMPLETE_USER_DATA));
        assert!(!user.is_logged_in);
        assert!(persistence.token().is_none());
    }

    #[test]
    fn test_initialize_auth_purges_partial_session() {
        let persistence = Persistence::in_memory();
        persistence.save(keys::TOKEN, "tok");
        persistence.save(keys::ROLE, "CUSTOMER");
        persistence.save(keys::USER_DATA, &json!({ "id": "u1" }));

        let mut user = UserState::default();
        user.initialize_auth(&persistence);

        assert!(!user.is_logged_in);
        assert!(persistence.token().is_none());
        assert!(persistence.load_raw(keys::ROLE).is_none());
        assert!(persistence.load_raw(keys::USER_DATA).is_none());
    }

    #[test]
    fn test_initialize_auth_restores_role_from_role_key() {
        let persistence = Persistence::in_memory();
        persistence.save(keys::TOKEN, "tok");
        persistence.save(keys::ROLE, "ADMIN");
        persistence.save(keys::USER_DATA, &json!({ "id": "u1", "email": "a@b.co" }));

        let mut user = UserState::default();
        user.initialize_auth(&persistence);
        assert!(user.is_logged_in);
        assert_eq!(user.profile.role, UserRole::Admin);
    }

    #[test]
    fn test_set_user_requires_id_and_persists_only_when_logged_in() {
        let persistence = Persistence::in_memory();
        let mut user = UserState::default();

        assert!(!user.set_user(
            UserPatch {
                name: Some("Nobody".into()),
                ..UserPatch::default()
            },
            &persistence
        ));
        assert!(user.profile.name.is_empty());

        assert!(user.set_user(
            UserPatch {
                id: Some(UserId::new("u1")),
                name: Some("Ada".into()),
                ..UserPatch::default()
            },
            &persistence
        ));
        assert_eq!(user.profile.name, "Ada");
        assert!(persistence.load_raw(keys::USER_DATA).is_none());

        user.is_logged_in = true;
        user.set_user(
            UserPatch {
                id: Some(UserId::new("u1")),
                phone: Some("555".into()),
                ..UserPatch::default()
            },
            &persistence,
        );
        let stored: UserProfile = persistence.load(keys::USER_DATA).unwrap();
        assert_eq!(stored.phone, "555");
        assert_eq!(stored.name, "Ada");
    }

    #[test]
    fn test_validation() {
        assert!(validate_login("not-an-email", "pw").is_err());
        assert_eq!(
            validate_login("a@b.co", "").unwrap_err(),
            "Password is required"
        );
        assert_eq!(
            validate_registration("a@b.co", "pw", " ", "").unwrap_err(),
            "Name is required"
        );
        let request = validate_registration(" a@b.co ", "pw", "Ada", "555").unwrap();
        assert_eq!(request.email, "a@b.co");
    }
}
