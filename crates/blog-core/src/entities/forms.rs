//! Client-side forms: post drafts, signup, and profile edits
//!
//! Forms validate locally with `validator` before anything is sent to the backend.

use std::borrow::Cow;

use validator::{Validate, ValidationError};

use crate::entities::User;
use crate::error::{DomainError, FieldErrors};

/// Content types accepted for profile pictures
pub const PICTURE_CONTENT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")));
    }
    Ok(())
}

/// A file selected for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Check size and type limits for a profile picture
    pub fn check_picture(&self, max_bytes: usize) -> Result<(), DomainError> {
        let mut errors = FieldErrors::new();
        if self.bytes.len() > max_bytes {
            errors.add(
                "profilePicture",
                format!("File is too large. Max {max_bytes} bytes allowed."),
            );
        }
        if !PICTURE_CONTENT_TYPES.contains(&self.content_type.to_ascii_lowercase().as_str()) {
            errors.add(
                "profilePicture",
                "Invalid file type. Only JPG, PNG, GIF, WEBP allowed.",
            );
        }
        errors.into_result()
    }
}

/// Where a post's image comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageSource {
    /// No image
    #[default]
    None,
    /// Keep or set an image by URL
    Url(String),
    /// Upload a new file
    Upload(ImageUpload),
}

/// Data submitted when creating or editing a post
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct PostDraft {
    #[validate(custom(function = "not_blank", message = "Title is required"))]
    pub title: String,

    #[validate(custom(function = "not_blank", message = "Content is required"))]
    pub content: String,

    pub image: ImageSource,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            image: ImageSource::None,
        }
    }

    pub fn with_image(mut self, image: ImageSource) -> Self {
        self.image = image;
        self
    }

    /// Validate and convert failures into the domain error type
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate().map_err(DomainError::from)
    }
}

/// Login credentials as entered by the user
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Invalid email format."))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Validate and convert failures into the domain error type
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate().map_err(DomainError::from)
    }
}

/// Signup form as entered by the user
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct SignupForm {
    #[validate(
        custom(function = "not_blank", message = "First Name is required."),
        length(min = 3, message = "First Name must be at least 3 characters.")
    )]
    pub first_name: String,

    #[validate(
        custom(function = "not_blank", message = "Last Name is required."),
        length(min = 3, message = "Last Name must be at least 3 characters.")
    )]
    pub last_name: String,

    #[validate(email(message = "Invalid email format."))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub confirm_password: String,
}

impl SignupForm {
    /// Username sent to the backend: "first last"
    pub fn username(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Validate and convert failures into the domain error type
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate().map_err(DomainError::from)
    }
}

/// Fields of the caller's own profile that changed
#[derive(Debug, Clone, PartialEq, Eq, Default, Validate)]
pub struct ProfileChanges {
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email format."))]
    pub email: Option<String>,
}

impl ProfileChanges {
    /// Keep only non-empty values that differ from `current`
    pub fn diff(current: &User, username: Option<&str>, email: Option<&str>) -> Self {
        let username = username
            .map(str::trim)
            .filter(|name| !name.is_empty() && *name != current.username)
            .map(String::from);
        let email = email
            .map(str::trim)
            .filter(|email| !email.is_empty() && Some(*email) != current.email.as_deref())
            .map(String::from);
        Self { username, email }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none()
    }
}
