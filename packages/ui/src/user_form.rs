//! # Create-user form state
//!
//! [`CreateUserForm`] owns the values typed into the "Add User" drawer, the staged
//! avatar and the errors the drawer can show:
//!
//! - an **avatar error** (bad type or size), raised when a file is refused and
//!   cleared by the next accepted file;
//! - an **experience error** (value is not a number), raised on submit and
//!   cleared as soon as the field holds a number again or is emptied;
//! - a **submit error**, the store's answer to a rejected create, shown next to the
//!   submit button while every typed value is kept for correction.
//!
//! Submission is split like fetching in [`crate::user_list`]:
//! [`begin_submit`](CreateUserForm::begin_submit) builds the payload and sets the
//! `is_creating` guard, [`finish_submit`](CreateUserForm::finish_submit) takes the
//! store's answer.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use store::config::DEFAULT_MAX_AVATAR_BYTES;
use store::{AvatarFile, CreateUserPayload, Role, StoreError, UserRecord};
use thiserror::Error;
use tracing::debug;

/// Minimum password length the store accepts.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Editable text fields of the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Email,
    Password,
    Name,
    Role,
    Experience,
}

impl FormField {
    /// Values of this field must not be logged.
    pub fn is_secret(&self) -> bool {
        matches!(self, FormField::Password)
    }
}

/// Why an avatar was refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AvatarError {
    #[error("Please select an image file (JPEG, PNG, GIF, WebP, SVG)")]
    NotAnImage,
    #[error("File size must be less than {}", format_size(.limit))]
    TooLarge { limit: u64 },
}

/// Why the form could not be turned into a payload.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Experience must be a number")]
    InvalidExperience,
}

fn format_size(bytes: &u64) -> String {
    let bytes = *bytes;
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}

/// Guess a media type from a file name's extension.
///
/// The file picker reports names and bytes only; this is what
/// [`CreateUserForm::set_avatar_file`] validates against.
pub fn media_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "txt" | "md" => "text/plain",
        "csv" => "text/csv",
        _ => "application/octet-stream",
    }
}

/// Empty means "not given"; anything else must be a finite number.
fn parse_experience(raw: &str) -> Result<Option<f64>, FormError> {
    match raw.trim() {
        "" => Ok(None),
        raw => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(value)),
            _ => Err(FormError::InvalidExperience),
        },
    }
}

/// An accepted avatar together with its preview URL.
///
/// The preview is a `data:` URL over the staged bytes, so it lives and dies with
/// this value.
#[derive(Clone, Debug, PartialEq)]
pub struct StagedAvatar {
    file: AvatarFile,
    preview_url: String,
}

impl StagedAvatar {
    fn new(file: AvatarFile) -> Self {
        let preview_url = format!(
            "data:{};base64,{}",
            file.media_type,
            STANDARD.encode(&file.bytes)
        );
        Self { file, preview_url }
    }

    pub fn file(&self) -> &AvatarFile {
        &self.file
    }

    pub fn preview_url(&self) -> &str {
        &self.preview_url
    }
}

/// The pending create form.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateUserForm {
    email: String,
    password: String,
    name: String,
    role: Role,
    experience: String,
    avatar: Option<StagedAvatar>,
    avatar_error: Option<String>,
    experience_error: Option<String>,
    submit_error: Option<StoreError>,
    is_creating: bool,
    max_avatar_bytes: u64,
}

impl Default for CreateUserForm {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AVATAR_BYTES)
    }
}

impl CreateUserForm {
    /// An empty form accepting avatars up to `max_avatar_bytes`.
    pub fn new(max_avatar_bytes: u64) -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            name: String::new(),
            role: Role::Player,
            experience: String::new(),
            avatar: None,
            avatar_error: None,
            experience_error: None,
            submit_error: None,
            is_creating: false,
            max_avatar_bytes,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn experience(&self) -> &str {
        &self.experience
    }

    pub fn avatar(&self) -> Option<&StagedAvatar> {
        self.avatar.as_ref()
    }

    pub fn avatar_error(&self) -> Option<&str> {
        self.avatar_error.as_deref()
    }

    pub fn experience_error(&self) -> Option<&str> {
        self.experience_error.as_deref()
    }

    pub fn submit_error(&self) -> Option<&StoreError> {
        self.submit_error.as_ref()
    }

    pub fn is_creating(&self) -> bool {
        self.is_creating
    }

    /// Merge one field value. Nothing else changes.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Email => self.email = value,
            FormField::Password => self.password = value,
            FormField::Name => self.name = value,
            FormField::Role => self.role = Role::parse(&value),
            FormField::Experience => {
                if self.experience_error.is_some() && parse_experience(&value).is_ok() {
                    self.experience_error = None;
                }
                self.experience = value;
            }
        }
    }

    /// Stage `file` as the avatar, replacing any earlier one.
    ///
    /// A refused file leaves the currently staged avatar in place.
    pub fn set_avatar_file(&mut self, file: AvatarFile) -> Result<(), AvatarError> {
        if let Err(err) = self.screen_avatar(&file.media_type, file.size()) {
            debug!(file = %file.file_name, "avatar refused: {err}");
            self.reject_avatar(err.clone());
            return Err(err);
        }
        self.avatar = Some(StagedAvatar::new(file));
        self.avatar_error = None;
        Ok(())
    }

    /// Check a candidate avatar's type and size without its contents, so an
    /// unsuitable file can be refused before it is read.
    pub fn screen_avatar(&self, media_type: &str, size: u64) -> Result<(), AvatarError> {
        if !media_type.starts_with("image/") {
            Err(AvatarError::NotAnImage)
        } else if size > self.max_avatar_bytes {
            Err(AvatarError::TooLarge {
                limit: self.max_avatar_bytes,
            })
        } else {
            Ok(())
        }
    }

    /// Record a refused avatar. Whatever was staged before stays staged.
    pub fn reject_avatar(&mut self, err: AvatarError) {
        self.avatar_error = Some(err.to_string());
    }

    /// Drop the staged avatar.
    pub fn clear_avatar(&mut self) {
        self.avatar = None;
    }

    /// Email present and password long enough; mirrors the drawer's input constraints.
    pub fn is_submittable(&self) -> bool {
        !self.email.trim().is_empty() && self.password.chars().count() >= MIN_PASSWORD_LEN
    }

    /// Map the form onto the store's create payload.
    ///
    /// `experience` is only included when the field is non-empty, and then as a
    /// float; `emailVisibility` is always `true`.
    pub fn build_submission_payload(&self) -> Result<CreateUserPayload, FormError> {
        let experience = parse_experience(&self.experience)?;
        Ok(CreateUserPayload {
            email: self.email.clone(),
            password: self.password.clone(),
            password_confirm: self.password.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
            email_visibility: true,
            experience,
            avatar: self.avatar.as_ref().map(|a| a.file.clone()),
        })
    }

    /// Start a submission. `None` when one is already in flight or the form
    /// cannot be turned into a payload (the reason is in `experience_error`).
    pub fn begin_submit(&mut self) -> Option<CreateUserPayload> {
        if self.is_creating {
            debug!("submit ignored, create already in flight");
            return None;
        }
        match self.build_submission_payload() {
            Ok(payload) => {
                self.is_creating = true;
                self.avatar_error = None;
                self.experience_error = None;
                self.submit_error = None;
                Some(payload)
            }
            Err(err) => {
                self.experience_error = Some(err.to_string());
                None
            }
        }
    }

    /// Take the store's answer. On success the form is reset and the created
    /// record returned; on failure the error is kept and every value stays.
    pub fn finish_submit(&mut self, result: Result<UserRecord, StoreError>) -> Option<UserRecord> {
        self.is_creating = false;
        match result {
            Ok(user) => {
                self.reset();
                Some(user)
            }
            Err(err) => {
                self.submit_error = Some(err);
                None
            }
        }
    }

    /// Back to empty values, `player` role, no avatar, no errors.
    pub fn reset(&mut self) {
        *self = Self::new(self.max_avatar_bytes);
    }
}
