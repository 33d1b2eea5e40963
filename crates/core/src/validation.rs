//! Per-field form validation.
//!
//! Each form has a field enum whose `check` maps a raw input value to an
//! error message (`None` when valid). Front ends call `check` on every
//! change for live feedback and the form's `validate` on submit; a form with
//! any message never reaches the network.
//!
//! The only cross-field rule is "all required fields present", which falls
//! out of running every field check at submit time.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::types::Gender;

// =============================================================================
// Patterns
// =============================================================================

static REGISTER_EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,6}$").expect("Invalid regex")
});

static PROFILE_EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

static INDIAN_MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+91\d{10}$").expect("Invalid regex"));

static TEN_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10}$").expect("Invalid regex"));

static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5,6}$").expect("Invalid regex"));

/// Prefix every mobile number field starts with.
pub const MOBILE_PREFIX: &str = "+91";

// =============================================================================
// Rule primitives
// =============================================================================

/// Fails with `message` when `value` is blank after trimming.
#[must_use]
pub fn required(value: &str, message: &str) -> Option<String> {
    value.trim().is_empty().then(|| message.to_owned())
}

/// Fails when `value` has fewer than `min` characters.
#[must_use]
pub fn min_chars(value: &str, min: usize, message: &str) -> Option<String> {
    (value.chars().count() < min).then(|| message.to_owned())
}

/// Fails when `value` has more than `max` characters.
#[must_use]
pub fn max_chars(value: &str, max: usize, message: &str) -> Option<String> {
    (value.chars().count() > max).then(|| message.to_owned())
}

/// Fails unless `value` parses as a decimal strictly greater than zero.
#[must_use]
pub fn positive_number(value: &str, message: &str) -> Option<String> {
    let ok = Decimal::from_str(value.trim()).is_ok_and(|n| n > Decimal::ZERO);
    (!ok).then(|| message.to_owned())
}

/// Fails unless the whole of `value` matches `pattern`.
#[must_use]
pub fn matches(pattern: &Regex, value: &str, message: &str) -> Option<String> {
    (!pattern.is_match(value)).then(|| message.to_owned())
}

/// Evaluate rules in order and keep the first failure.
fn first_failure<const N: usize>(rules: [&dyn Fn() -> Option<String>; N]) -> Option<String> {
    rules.iter().find_map(|rule| rule())
}

// =============================================================================
// FieldErrors
// =============================================================================

/// Messages for every failing field, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(&'static str, String)>);

impl FieldErrors {
    /// No errors.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Record `message` for `field` if present.
    pub fn record(&mut self, field: &'static str, message: Option<String>) {
        if let Some(message) = message {
            self.0.push((field, message));
        }
    }

    /// Whether every field passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }

    /// Iterate `(field, message)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the collected errors when at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

// =============================================================================
// Registration
// =============================================================================

/// Fields of the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterField {
    Name,
    Email,
    Mobile,
    Password,
    Gender,
}

impl RegisterField {
    /// Form key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Mobile => "mobile",
            Self::Password => "password",
            Self::Gender => "gender",
        }
    }

    /// Validate a single value.
    #[must_use]
    pub fn check(self, value: &str) -> Option<String> {
        match self {
            Self::Name => first_failure([
                &|| required(value, "Name is required."),
                &|| {
                    value
                        .chars()
                        .any(|c| c.is_ascii_digit())
                        .then(|| "Name cannot contain numbers.".to_owned())
                },
            ]),
            Self::Email => first_failure([
                &|| required(value, "Email is required."),
                &|| matches(&REGISTER_EMAIL_RE, value, "Enter a valid email address."),
            ]),
            Self::Mobile => first_failure([
                &|| required(value, "Mobile number is required."),
                &|| {
                    matches(
                        &INDIAN_MOBILE_RE,
                        value,
                        "Mobile number must be in the format +911234567890.",
                    )
                },
            ]),
            Self::Password => first_failure([
                &|| required(value, "Password is required."),
                &|| min_chars(value, 6, "Password must be at least 6 characters."),
            ]),
            Self::Gender => Gender::from_str(value)
                .err()
                .map(|_| "Please select a gender.".to_owned()),
        }
    }
}

/// Registration form input.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
    pub gender: String,
}

impl RegistrationForm {
    /// Empty form with the mobile prefix pre-filled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mobile: MOBILE_PREFIX.to_owned(),
            ..Self::default()
        }
    }

    /// Replace the mobile value unless the edit would drop the `+91` prefix.
    ///
    /// Returns whether the edit was applied.
    pub fn set_mobile(&mut self, value: &str) -> bool {
        if !value.starts_with(MOBILE_PREFIX) {
            return false;
        }
        value.clone_into(&mut self.mobile);
        true
    }

    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns the messages of all failing fields.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for (field, value) in [
            (RegisterField::Name, &self.name),
            (RegisterField::Email, &self.email),
            (RegisterField::Mobile, &self.mobile),
            (RegisterField::Password, &self.password),
            (RegisterField::Gender, &self.gender),
        ] {
            errors.record(field.key(), field.check(value));
        }
        errors.into_result()
    }
}

// =============================================================================
// Login
// =============================================================================

/// Validate login credentials; both fields are simply required.
///
/// # Errors
///
/// Returns the messages of all failing fields.
pub fn validate_login(email: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.record("email", required(email, "Email is required."));
    errors.record("password", required(password, "Password is required."));
    errors.into_result()
}

// =============================================================================
// Profile
// =============================================================================

/// Fields of the profile editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    Email,
    Phone,
}

impl ProfileField {
    /// Form key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }

    /// Validate a single value.
    #[must_use]
    pub fn check(self, value: &str) -> Option<String> {
        match self {
            Self::Name => first_failure([
                &|| required(value, "Name is required"),
                &|| {
                    value
                        .chars()
                        .all(|c| c.is_ascii_digit())
                        .then(|| "Name cannot contain only digits".to_owned())
                },
            ]),
            Self::Phone => matches(
                &INDIAN_MOBILE_RE,
                value,
                "Phone number should be in the format +91XXXXXXXXXX",
            ),
            Self::Email => matches(
                &PROFILE_EMAIL_RE,
                value,
                "Please enter a valid email address",
            ),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// Fields of the admin product form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Name,
    Description,
    Price,
    Category,
    Brand,
}

impl ProductField {
    /// Form key, matching the multipart field name.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "product_name",
            Self::Description => "product_description",
            Self::Price => "product_price",
            Self::Category => "product_category",
            Self::Brand => "product_brand",
        }
    }

    /// Validate a single value.
    #[must_use]
    pub fn check(self, value: &str) -> Option<String> {
        match self {
            Self::Name => required(value, "Product name is required."),
            Self::Description => required(value, "Product description is required."),
            Self::Price => positive_number(value, "Please enter a valid price."),
            Self::Category => required(value, "Please select a category."),
            Self::Brand => required(value, "Product brand is required."),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// Fields of the admin category form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Name,
    Description,
}

impl CategoryField {
    /// Form key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "category_name",
            Self::Description => "category_description",
        }
    }

    /// Validate a single value.
    #[must_use]
    pub fn check(self, value: &str) -> Option<String> {
        let trimmed = value.trim();
        match self {
            Self::Name => first_failure([
                &|| required(trimmed, "Category name is required"),
                &|| min_chars(trimmed, 3, "Category name must be at least 3 characters"),
                &|| max_chars(trimmed, 50, "Category name cannot exceed 50 characters"),
            ]),
            Self::Description => first_failure([
                &|| required(trimmed, "Category description is required"),
                &|| min_chars(trimmed, 5, "Description must be at least 5 characters"),
                &|| max_chars(trimmed, 200, "Description cannot exceed 200 characters"),
            ]),
        }
    }
}

/// Validate a category name and description together.
///
/// # Errors
///
/// Returns the messages of all failing fields.
pub fn validate_category(name: &str, description: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.record(CategoryField::Name.key(), CategoryField::Name.check(name));
    errors.record(
        CategoryField::Description.key(),
        CategoryField::Description.check(description),
    );
    errors.into_result()
}

// =============================================================================
// Delivery address
// =============================================================================

/// Fields of the checkout address form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    Street,
    City,
    State,
    PostalCode,
}

impl AddressField {
    /// Form key, matching the order payload.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Street => "street",
            Self::City => "city",
            Self::State => "state",
            Self::PostalCode => "postalCode",
        }
    }

    /// Validate a single value.
    #[must_use]
    pub fn check(self, value: &str) -> Option<String> {
        const MISSING: &str = "Please fill in all address fields.";
        match self {
            Self::Street | Self::City | Self::State => required(value, MISSING),
            Self::PostalCode => first_failure([
                &|| required(value, MISSING),
                &|| matches(&POSTAL_CODE_RE, value, "Please enter a valid postal code."),
            ]),
        }
    }
}

// =============================================================================
// Admin user edit
// =============================================================================

/// Fields an admin may change on a user account. Email is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserEditField {
    Name,
    Mobile,
    Gender,
}

impl UserEditField {
    /// Form key, matching the update payload.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "user_name",
            Self::Mobile => "user_mobile",
            Self::Gender => "user_gender",
        }
    }

    /// Validate a single value.
    #[must_use]
    pub fn check(self, value: &str) -> Option<String> {
        const MISSING: &str = "All fields are required!";
        match self {
            Self::Name | Self::Gender => required(value, MISSING),
            Self::Mobile => first_failure([
                &|| required(value, MISSING),
                &|| matches(&TEN_DIGITS_RE, value, "Mobile number must be exactly 10 digits."),
            ]),
        }
    }
}
