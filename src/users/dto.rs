use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::repo::User;
use crate::auth::password::{meets_policy, MIN_PASSWORD_LEN};
use crate::error::{ApiResult, FieldErrors};

pub const MAX_FIELD_LEN: usize = 255;

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_email(errors: &mut FieldErrors, raw: &str) -> String {
    let email = normalize_email(raw);
    if email.is_empty() {
        errors.add("email", BLANK);
    } else if !is_valid_email(&email) {
        errors.add("email", "Enter a valid email address.");
    } else if email.chars().count() > MAX_FIELD_LEN {
        errors.add("email", too_long());
    }
    email
}

fn check_name(errors: &mut FieldErrors, raw: &str) -> String {
    let name = raw.trim().to_string();
    if name.is_empty() {
        errors.add("name", BLANK);
    } else if name.chars().count() > MAX_FIELD_LEN {
        errors.add("name", too_long());
    }
    name
}

fn check_password(errors: &mut FieldErrors, password: String) -> String {
    if password.is_empty() {
        errors.add("password", BLANK);
    } else if !meets_policy(&password) {
        errors.add(
            "password",
            format!("Ensure this field has at least {} characters.", MIN_PASSWORD_LEN),
        );
    }
    password
}

fn too_long() -> String {
    format!("Ensure this field has no more than {} characters.", MAX_FIELD_LEN)
}

fn required(errors: &mut FieldErrors, field: &str, value: Option<String>) -> String {
    value.unwrap_or_else(|| {
        errors.add(field, REQUIRED);
        String::new()
    })
}

/// Request body for `POST /users/create`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// A registration that passed validation; the password is still plain text.
#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl CreateUserRequest {
    pub fn validate(self) -> ApiResult<NewUser> {
        let mut errors = FieldErrors::new();

        let email = match self.email {
            Some(raw) => check_email(&mut errors, &raw),
            None => required(&mut errors, "email", None),
        };
        let name = match self.name {
            Some(raw) => check_name(&mut errors, &raw),
            None => required(&mut errors, "name", None),
        };
        let password = match self.password {
            Some(raw) => check_password(&mut errors, raw),
            None => required(&mut errors, "password", None),
        };

        errors.finish(NewUser {
            email,
            name,
            password,
        })
    }
}

/// Request body for `PATCH /users/me`; every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(self) -> ApiResult<ProfileUpdate> {
        let mut errors = FieldErrors::new();
        let update = ProfileUpdate {
            email: self.email.map(|raw| check_email(&mut errors, &raw)),
            name: self.name.map(|raw| check_name(&mut errors, &raw)),
            password: self.password.map(|raw| check_password(&mut errors, raw)),
        };
        errors.finish(update)
    }
}

/// Request body for `POST /users/token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl TokenRequest {
    pub fn validate(self) -> ApiResult<Credentials> {
        let mut errors = FieldErrors::new();

        let email = normalize_email(&required(&mut errors, "email", self.email));
        if email.is_empty() && !errors.contains("email") {
            errors.add("email", BLANK);
        }
        let password = required(&mut errors, "password", self.password);
        if password.is_empty() && !errors.contains("password") {
            errors.add("password", BLANK);
        }

        errors.finish(Credentials { email, password })
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Public view of a user: never includes the password hash.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UserResponse {
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            name: u.name,
            email: u.email,
        }
    }
}
