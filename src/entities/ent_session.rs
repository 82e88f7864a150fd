// Authenticated identity as reported by the remote auth surface

use serde::{Deserialize, Serialize};

use crate::core::ProfileId;

/// Names captured at sign-up and carried on the auth user record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: ProfileId,
    pub email: String,
    #[serde(default)]
    pub metadata: UserMetadata,
}

/// Events pushed by the auth collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
}

/// Sign-up form retained between `sign_up` and code verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpForm {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub phone: Option<String>,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// What the auth surface needs to register an account.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub metadata: UserMetadata,
}

impl SignUpForm {
    pub fn to_request(&self) -> SignUpRequest {
        SignUpRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            metadata: UserMetadata {
                first_name: Some(self.first_name.trim().to_string()),
                last_name: Some(self.last_name.trim().to_string()),
            },
        }
    }
}
