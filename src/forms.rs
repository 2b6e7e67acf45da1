//! Form payloads and their validation rules.
//!
//! Every field is deserialized as a plain string so that malformed input can
//! be echoed back to the user alongside the error messages.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::models::{Item, ItemInput};

const REQUIRED: &str = "This field is required.";
const USERNAME_LENGTH: &str = "Field must be between 4 and 150 characters long.";
const PASSWORD_LENGTH: &str = "Field must be at least 4 characters long.";
const PASSWORD_MISMATCH: &str = "Field must be equal to password.";
const NOT_AN_INTEGER: &str = "Not a valid integer value.";
const NOT_A_FLOAT: &str = "Not a valid float value.";

/// Validation messages keyed by field name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: &str) {
        self.0.entry(field).or_default().push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Vec<String> {
        self.0.get(field).cloned().unwrap_or_default()
    }
}

/// A single input as the templates see it: the value to re-display and the
/// messages to show beneath it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldView {
    pub value: String,
    pub errors: Vec<String>,
}

impl FieldView {
    fn new(value: &str, errors: &FormErrors, field: &str) -> Self {
        Self {
            value: value.to_string(),
            errors: errors.get(field),
        }
    }
}

fn require(errors: &mut FormErrors, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, REQUIRED);
        return false;
    }
    true
}

fn validate_username(errors: &mut FormErrors, value: &str) {
    if require(errors, "username", value) {
        let len = value.chars().count();
        if !(4..=150).contains(&len) {
            errors.add("username", USERNAME_LENGTH);
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub csrf_token: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        validate_username(&mut errors, &self.username);
        require(&mut errors, "password", &self.password);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Password fields are never echoed back.
    pub fn view(&self, errors: &FormErrors) -> LoginFormView {
        LoginFormView {
            username: FieldView::new(&self.username, errors, "username"),
            password: FieldView::new("", errors, "password"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoginFormView {
    pub username: FieldView,
    pub password: FieldView,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub csrf_token: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        validate_username(&mut errors, &self.username);

        if require(&mut errors, "password", &self.password)
            && self.password.chars().count() < 4
        {
            errors.add("password", PASSWORD_LENGTH);
        }

        if require(&mut errors, "confirm_password", &self.confirm_password)
            && self.confirm_password != self.password
        {
            errors.add("confirm_password", PASSWORD_MISMATCH);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn view(&self, errors: &FormErrors) -> RegisterFormView {
        RegisterFormView {
            username: FieldView::new(&self.username, errors, "username"),
            password: FieldView::new("", errors, "password"),
            confirm_password: FieldView::new("", errors, "confirm_password"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RegisterFormView {
    pub username: FieldView,
    pub password: FieldView,
    pub confirm_password: FieldView,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub csrf_token: String,
}

impl ItemForm {
    /// Pre-fills the form from a stored item for editing.
    pub fn from_item(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity.to_string(),
            price: item.price_text(),
            csrf_token: String::new(),
        }
    }

    pub fn validate(&self) -> Result<ItemInput, FormErrors> {
        let mut errors = FormErrors::default();

        let name = self.name.trim();
        require(&mut errors, "name", name);

        let mut quantity = None;
        if require(&mut errors, "quantity", &self.quantity) {
            match self.quantity.trim().parse::<i64>() {
                Ok(value) => quantity = Some(value),
                Err(_) => errors.add("quantity", NOT_AN_INTEGER),
            }
        }

        let mut price = None;
        if require(&mut errors, "price", &self.price) {
            match self.price.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => price = Some(value),
                _ => errors.add("price", NOT_A_FLOAT),
            }
        }

        match (quantity, price) {
            (Some(quantity), Some(price)) if errors.is_empty() => Ok(ItemInput {
                name: name.to_string(),
                quantity,
                price,
            }),
            _ => Err(errors),
        }
    }

    pub fn view(&self, errors: &FormErrors) -> ItemFormView {
        ItemFormView {
            name: FieldView::new(&self.name, errors, "name"),
            quantity: FieldView::new(&self.quantity, errors, "quantity"),
            price: FieldView::new(&self.price, errors, "price"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ItemFormView {
    pub name: FieldView,
    pub quantity: FieldView,
    pub price: FieldView,
}

/// Body of the delete button's form.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CsrfForm {
    #[serde(default)]
    pub csrf_token: String,
}
