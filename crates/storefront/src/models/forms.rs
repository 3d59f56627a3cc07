//! Checkout form validation.
//!
//! The order placement pipeline depends only on this module's output
//! contract: either clean data or a map of field name to message.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use hk_leather_core::PaymentMethod;

const MAX_NAME: usize = 50;
const MAX_CONTACT_NAME: usize = 100;
const MAX_EMAIL: usize = 255;
const MAX_ADDRESS: usize = 500;
const MAX_CITY: usize = 100;
const MAX_NOTES: usize = 1000;
const MAX_MESSAGE: usize = 1000;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex")
});

/// Pakistani mobile numbers, with or without the country prefix.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(\+92|0)?[0-9]{10,11}$").expect("phone regex")
});

/// Field-level validation errors: field name mapped to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        // First error per field wins, matching per-field display.
        self.0.entry(field).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
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

/// Raw checkout form input as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub payment_method: String,
}

/// Validated, trimmed checkout data.
#[derive(Debug, Clone)]
pub struct ValidCheckout {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
}

impl ValidCheckout {
    /// Full name for the shipping profile.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl CheckoutForm {
    /// Validate and normalize the form.
    ///
    /// # Errors
    ///
    /// Returns one message per invalid field.
    pub fn validate(self) -> Result<ValidCheckout, FieldErrors> {
        let mut errors = FieldErrors::default();

        let first_name = required_text(&mut errors, "first_name", &self.first_name, MAX_NAME);
        let last_name = required_text(&mut errors, "last_name", &self.last_name, MAX_NAME);

        let email = required_email(&mut errors, &self.email);

        let phone: String = self.phone.chars().filter(|c| !c.is_whitespace()).collect();
        if phone.is_empty() {
            errors.push("phone", "Phone number is required");
        } else if !PHONE_RE.is_match(&phone) {
            errors.push("phone", "Please enter a valid phone number");
        }

        let address = required_text(&mut errors, "address", &self.address, MAX_ADDRESS);
        let city = required_text(&mut errors, "city", &self.city, MAX_CITY);

        let postal_code = self
            .postal_code
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        if notes.as_ref().is_some_and(|n| n.len() > MAX_NOTES) {
            errors.push("notes", format!("Notes must be less than {MAX_NOTES} characters"));
        }

        let payment_method = match self.payment_method.parse::<PaymentMethod>() {
            Ok(method) => Some(method),
            Err(_) => {
                errors.push("payment_method", "Please choose a payment method");
                None
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        // All fields validated above; defaults below are unreachable.
        Ok(ValidCheckout {
            first_name,
            last_name,
            email,
            phone,
            address,
            city,
            postal_code,
            notes,
            payment_method: payment_method.unwrap_or(PaymentMethod::CashOnDelivery),
        })
    }
}

/// Raw contact form input as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Validated, trimmed contact message.
#[derive(Debug, Clone)]
pub struct ValidContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

impl ContactForm {
    /// Validate and normalize the form.
    ///
    /// The phone number is optional here, unlike checkout, but must be a
    /// valid Pakistani mobile number when present.
    ///
    /// # Errors
    ///
    /// Returns one message per invalid field.
    pub fn validate(self) -> Result<ValidContact, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = required_text(&mut errors, "name", &self.name, MAX_CONTACT_NAME);
        let email = required_email(&mut errors, &self.email);

        let phone = self
            .phone
            .as_deref()
            .map(|p| p.chars().filter(|c| !c.is_whitespace()).collect::<String>())
            .filter(|p| !p.is_empty());
        if phone.as_ref().is_some_and(|p| !PHONE_RE.is_match(p)) {
            errors.push("phone", "Please enter a valid phone number");
        }

        let message = required_text(&mut errors, "message", &self.message, MAX_MESSAGE);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidContact {
            name,
            email,
            phone,
            message,
        })
    }
}

fn required_email(errors: &mut FieldErrors, value: &str) -> String {
    let email = value.trim().to_owned();
    if email.is_empty() {
        errors.push("email", "Email is required");
    } else if email.len() > MAX_EMAIL {
        errors.push("email", format!("Email must be less than {MAX_EMAIL} characters"));
    } else if !EMAIL_RE.is_match(&email) {
        errors.push("email", "Please enter a valid email address");
    }
    email
}

fn required_text(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    max: usize,
) -> String {
    let trimmed = value.trim().to_owned();
    if trimmed.is_empty() {
        errors.push(field, format!("{} is required", label(field)));
    } else if trimmed.len() > max {
        errors.push(
            field,
            format!("{} must be less than {max} characters", label(field)),
        );
    }
    trimmed
}

const fn label(field: &'static str) -> &'static str {
    match field.as_bytes() {
        b"first_name" => "First name",
        b"last_name" => "Last name",
        b"address" => "Address",
        b"city" => "City",
        b"name" => "Name",
        b"message" => "Message",
        _ => "Field",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            first_name: "Ayesha".to_owned(),
            last_name: "Khan".to_owned(),
            email: "ayesha@example.com".to_owned(),
            phone: "+92 300 1234567".to_owned(),
            address: "12 Mall Road".to_owned(),
            city: "Lahore".to_owned(),
            postal_code: Some("54000".to_owned()),
            notes: None,
            payment_method: "cod".to_owned(),
        }
    }

    #[test]
    fn accepts_a_complete_form() {
        let valid = valid_form().validate().unwrap();
        assert_eq!(valid.full_name(), "Ayesha Khan");
        assert_eq!(valid.phone, "+923001234567");
        assert_eq!(valid.payment_method, PaymentMethod::CashOnDelivery);
    }

    #[test]
    fn reports_every_missing_required_field() {
        let form = CheckoutForm {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            postal_code: None,
            notes: None,
            payment_method: String::new(),
        };
        let errors = form.validate().unwrap_err();
        for field in [
            "first_name",
            "last_name",
            "email",
            "phone",
            "address",
            "city",
            "payment_method",
        ] {
            assert!(errors.get(field).is_some(), "missing error for {field}");
        }
    }

    #[test]
    fn rejects_malformed_email_and_phone() {
        let mut form = valid_form();
        form.email = "not-an-email".to_owned();
        form.phone = "12345".to_owned();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Please enter a valid email address"));
        assert_eq!(errors.get("phone"), Some("Please enter a valid phone number"));
    }

    #[test]
    fn phone_ignores_internal_whitespace() {
        let mut form = valid_form();
        form.phone = "0300 123 4567".to_owned();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_payment_method() {
        let mut form = valid_form();
        form.payment_method = "crypto".to_owned();
        let errors = form.validate().unwrap_err();
        assert!(errors.get("payment_method").is_some());
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let mut form = valid_form();
        form.postal_code = Some("   ".to_owned());
        form.notes = Some(String::new());
        let valid = form.validate().unwrap();
        assert!(valid.postal_code.is_none());
        assert!(valid.notes.is_none());
    }

    #[test]
    fn overlong_notes_are_rejected() {
        let mut form = valid_form();
        form.notes = Some("x".repeat(1001));
        let errors = form.validate().unwrap_err();
        assert!(errors.get("notes").is_some());
    }

    fn valid_contact() -> ContactForm {
        ContactForm {
            name: "Ayesha Khan".to_owned(),
            email: "ayesha@example.com".to_owned(),
            phone: None,
            message: "Do you ship to Karachi?".to_owned(),
        }
    }

    #[test]
    fn accepts_a_contact_message_without_a_phone() {
        let valid = valid_contact().validate().unwrap();
        assert_eq!(valid.name, "Ayesha Khan");
        assert!(valid.phone.is_none());
    }

    #[test]
    fn contact_requires_name_email_and_message() {
        let form = ContactForm {
            name: String::new(),
            email: String::new(),
            phone: None,
            message: "  ".to_owned(),
        };
        let errors = form.validate().unwrap_err();
        for field in ["name", "email", "message"] {
            assert!(errors.get(field).is_some(), "missing error for {field}");
        }
    }

    #[test]
    fn contact_phone_is_validated_only_when_present() {
        let mut form = valid_contact();
        form.phone = Some("0300 123 4567".to_owned());
        let valid = form.validate().unwrap();
        assert_eq!(valid.phone.as_deref(), Some("03001234567"));

        let mut form = valid_contact();
        form.phone = Some("12345".to_owned());
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("phone"), Some("Please enter a valid phone number"));

        // Blank phone counts as absent, not invalid.
        let mut form = valid_contact();
        form.phone = Some("   ".to_owned());
        assert!(form.validate().unwrap().phone.is_none());
    }

    #[test]
    fn overlong_contact_fields_are_rejected() {
        let mut form = valid_contact();
        form.name = "x".repeat(101);
        form.message = "x".repeat(1001);
        let errors = form.validate().unwrap_err();
        assert!(errors.get("name").is_some());
        assert!(errors.get("message").is_some());
    }
}
