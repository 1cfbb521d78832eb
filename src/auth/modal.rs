//! The sign-in / sign-up modal every page shares.
//!
//! Validation here is presentational only: a login that passes it is handed to the
//! [`IdentityActor`] without any password ever being checked. The actor decides who is
//! signed in.

use crate::{
    auth::IdentityActor,
    crud::{CrudStore, create_record},
    data::{is_valid_email, student::StudentProfile},
    error::PortalResult,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const ACCOUNT_CREATION_FAILED: &str = "Failed to create account. Please try again.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalMode {
    #[default]
    Login,
    Signup,
}

impl ModalMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalField {
    Email,
    Password,
    ConfirmPassword,
    FullName,
}

#[derive(Debug, Clone)]
pub struct ModalFields {
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    pub full_name: String,
}

impl Default for ModalFields {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: SecretString::from(String::new()),
            confirm_password: SecretString::from(String::new()),
            full_name: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalErrors {
    pub email: Option<&'static str>,
    pub password: Option<&'static str>,
    pub confirm_password: Option<&'static str>,
    pub full_name: Option<&'static str>,
    pub general: Option<&'static str>,
}

impl ModalErrors {
    pub const fn get(&self, field: ModalField) -> Option<&'static str> {
        match field {
            ModalField::Email => self.email,
            ModalField::Password => self.password,
            ModalField::ConfirmPassword => self.confirm_password,
            ModalField::FullName => self.full_name,
        }
    }

    fn slot(&mut self, field: ModalField) -> &mut Option<&'static str> {
        match field {
            ModalField::Email => &mut self.email,
            ModalField::Password => &mut self.password,
            ModalField::ConfirmPassword => &mut self.confirm_password,
            ModalField::FullName => &mut self.full_name,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password.is_none()
            && self.confirm_password.is_none()
            && self.full_name.is_none()
            && self.general.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    ///validation failed, nothing was sent anywhere
    Invalid,
    ///signup couldn't provision the student profile, so the identity actor was never called
    ProfileCreationFailed,
    ///the modal closed and the identity actor was asked to log in
    HandedOff,
}

#[derive(Debug, Clone, Default)]
pub struct AuthModal {
    pub mode: ModalMode,
    pub open: bool,
    pub fields: ModalFields,
    pub errors: ModalErrors,
    pub loading: bool,
}

impl AuthModal {
    pub fn opened(mode: ModalMode) -> Self {
        Self {
            mode,
            open: true,
            ..Default::default()
        }
    }

    ///closing throws away everything typed, and the next open starts on login
    pub fn set_open(&mut self, open: bool) {
        if !open {
            self.reset();
            self.mode = ModalMode::Login;
        }
        self.open = open;
    }

    ///keeps whatever has been typed so far
    pub fn switch_mode(&mut self, mode: ModalMode) {
        self.mode = mode;
    }

    pub fn change_field(&mut self, field: ModalField, value: String) {
        match field {
            ModalField::Email => self.fields.email = value,
            ModalField::Password => self.fields.password = SecretString::from(value),
            ModalField::ConfirmPassword => {
                self.fields.confirm_password = SecretString::from(value);
            }
            ModalField::FullName => self.fields.full_name = value,
        }
        *self.errors.slot(field) = None;
    }

    pub fn validate(&mut self) -> bool {
        let mut errors = ModalErrors::default();
        //the stored email is the raw field, so it is checked untrimmed
        let email = self.fields.email.as_str();
        let password = self.fields.password.expose_secret();

        if email.is_empty() {
            errors.email = Some("Email is required");
        } else if !is_valid_email(email) {
            errors.email = Some("Please enter a valid email address");
        }

        match self.mode {
            ModalMode::Login => {
                if password.is_empty() {
                    errors.password = Some("Password is required");
                }
            }
            ModalMode::Signup => {
                if self.fields.full_name.trim().is_empty() {
                    errors.full_name = Some("Full name is required");
                }

                if password.is_empty() {
                    errors.password = Some("Password is required");
                } else if password.encode_utf16().count() < MIN_PASSWORD_LEN {
                    //counted in utf-16 units, like a browser's `String.length`
                    errors.password = Some("Password must be at least 6 characters");
                }

                let confirm_password = self.fields.confirm_password.expose_secret();
                if confirm_password.is_empty() {
                    errors.confirm_password = Some("Please confirm your password");
                } else if confirm_password != password {
                    errors.confirm_password = Some("Passwords do not match");
                }
            }
        }

        self.errors = errors;
        self.errors.is_empty()
    }

    fn reset(&mut self) {
        self.fields = ModalFields::default();
        self.errors = ModalErrors::default();
        self.loading = false;
    }

    ///Validates, provisions a student profile when signing up, then hands off to `identity`.
    ///
    ///`on_success` runs after the modal has closed and before `identity.login()`. An `Err`
    ///only ever comes from the identity actor itself.
    pub async fn submit<I, F>(
        &mut self,
        store: &dyn CrudStore,
        identity: &mut I,
        on_success: Option<F>,
    ) -> PortalResult<SubmitOutcome>
    where
        I: IdentityActor + ?Sized,
        F: FnOnce() + Send,
    {
        if !self.validate() {
            return Ok(SubmitOutcome::Invalid);
        }
        self.loading = true;

        if self.mode == ModalMode::Signup {
            let stub = StudentProfile::signup_stub(&self.fields.full_name, &self.fields.email);
            match create_record(store, &stub).await {
                Ok(created) => {
                    info!(
                        id = %created.id,
                        student_id = %created.student_id,
                        "Provisioned student profile on signup"
                    );
                }
                Err(e) => {
                    error!(?e, "Error creating student profile on signup");
                    self.errors.general = Some(ACCOUNT_CREATION_FAILED);
                    self.loading = false;
                    return Ok(SubmitOutcome::ProfileCreationFailed);
                }
            }
        }

        self.set_open(false);
        if let Some(on_success) = on_success {
            on_success();
        }
        identity.login().await?;

        Ok(SubmitOutcome::HandedOff)
    }

    ///`provider` is only logged, every provider goes through the same hand-off
    pub async fn oauth_login<I>(&mut self, provider: &str, identity: &mut I) -> PortalResult<()>
    where
        I: IdentityActor + ?Sized,
    {
        debug!(%provider, "OAuth hand-off requested");
        self.set_open(false);
        identity.login().await
    }
}

///What a page shows at the top of the modal. Pages differ in copy only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalCopy {
    pub title: &'static str,
    pub description: &'static str,
}

impl ModalCopy {
    pub const DEFAULT: Self = Self {
        title: "Welcome to PlaceRight",
        description: "Sign in to track placements and get AI-powered placement insights.",
    };
    pub const PROFILE: Self = Self {
        title: "Sign in to view your profile",
        description: "Your student profile, placements and documents in one place.",
    };
    pub const CAREERS: Self = Self {
        title: "Sign in to apply",
        description: "Create an account to apply for open roles and save postings.",
    };
    pub const RATINGS: Self = Self {
        title: "Sign in to leave a rating",
        description: "Tell other students how their placements went.",
    };

    pub fn for_context(context: Option<&str>) -> Self {
        match context {
            Some("profile") => Self::PROFILE,
            Some("careers") => Self::CAREERS,
            Some("ratings") => Self::RATINGS,
            _ => Self::DEFAULT,
        }
    }
}
