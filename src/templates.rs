use askama::Template;

use crate::{
    forms::{ItemFormView, LoginFormView, RegisterFormView},
    models::{CurrentUser, Flash, Item},
};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub current_user: Option<CurrentUser>,
    pub flashes: Vec<Flash>,
    pub csrf_token: String,
    pub items: Vec<Item>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub current_user: Option<CurrentUser>,
    pub flashes: Vec<Flash>,
    pub csrf_token: String,
    pub error: Option<String>,
    pub form: LoginFormView,
}

impl LoginTemplate {
    pub fn new(
        flashes: Vec<Flash>,
        csrf_token: String,
        error: Option<String>,
        form: LoginFormView,
    ) -> Self {
        Self {
            current_user: None,
            flashes,
            csrf_token,
            error,
            form,
        }
    }
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<CurrentUser>,
    pub flashes: Vec<Flash>,
    pub csrf_token: String,
    pub error: Option<String>,
    pub form: RegisterFormView,
}

impl RegisterTemplate {
    pub fn new(
        flashes: Vec<Flash>,
        csrf_token: String,
        error: Option<String>,
        form: RegisterFormView,
    ) -> Self {
        Self {
            current_user: None,
            flashes,
            csrf_token,
            error,
            form,
        }
    }
}

/// Shared by the add and edit pages; `action` is the verb shown in the
/// heading and `form_action` the URL the form posts to.
#[derive(Template)]
#[template(path = "item_form.html")]
pub struct ItemFormTemplate {
    pub current_user: Option<CurrentUser>,
    pub flashes: Vec<Flash>,
    pub csrf_token: String,
    pub action: &'static str,
    pub form_action: String,
    pub form: ItemFormView,
}
