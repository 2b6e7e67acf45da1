use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    auth::AuthService,
    database::ItemRepository,
    error::{AppError, AuthError},
    export::{items_to_csv, CSV_FILENAME},
    forms::{CsrfForm, FormErrors, ItemForm, ItemFormView, LoginForm, RegisterForm},
    models::{CurrentUser, FlashLevel},
    session::{AuthenticatedUser, SessionExt},
    templates::{IndexTemplate, ItemFormTemplate, LoginTemplate, RegisterTemplate},
};

// Application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub items: ItemRepository,
}

// Query parameters for the login and register pages
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// Authentication route handlers
pub async fn login_page(
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    if session.current_user().await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    render_login(&session, query.error, &LoginForm::default(), &FormErrors::default()).await
}

pub async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if session.current_user().await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    session.verify_csrf_token(&form.csrf_token).await?;

    if let Err(errors) = form.validate() {
        return render_login(&session, None, &form, &errors).await;
    }

    match state.auth_service.login(&form.username, &form.password).await {
        Ok(user) => {
            session.login(&user).await?;
            session
                .flash(FlashLevel::Success, "Logged in successfully! 👍")
                .await?;
            tracing::info!("User {} logged in", user.username);
            Ok(Redirect::to("/").into_response())
        }
        Err(AppError::Auth(AuthError::InvalidCredentials)) => {
            tracing::warn!("Failed login attempt for {}", form.username);
            session
                .flash(FlashLevel::Danger, "Invalid username or password. ⚠️")
                .await?;
            render_login(&session, None, &form, &FormErrors::default()).await
        }
        Err(e) => Err(e),
    }
}

pub async fn logout_handler(session: Session) -> Result<impl IntoResponse, AppError> {
    session.logout().await?;
    session
        .flash(FlashLevel::Info, "You have been logged out. 👋")
        .await?;

    tracing::info!("User logged out successfully");
    Ok(Redirect::to("/login"))
}

pub async fn register_page(
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    if session.current_user().await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    render_register(
        &session,
        query.error,
        &RegisterForm::default(),
        &FormErrors::default(),
    )
    .await
}

pub async fn register_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if session.current_user().await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    session.verify_csrf_token(&form.csrf_token).await?;

    if let Err(errors) = form.validate() {
        return render_register(&session, None, &form, &errors).await;
    }

    match state
        .auth_service
        .register(&form.username, &form.password)
        .await
    {
        Ok(_) => {
            session
                .flash(
                    FlashLevel::Success,
                    "Registration successful! Please log in. 😄",
                )
                .await?;
            Ok(Redirect::to("/login").into_response())
        }
        Err(AppError::Auth(AuthError::DuplicateUsername)) => {
            session
                .flash(FlashLevel::Danger, "Username already exists. 🚫")
                .await?;
            Ok(Redirect::to("/register").into_response())
        }
        Err(e) => Err(e),
    }
}

// Protected route handlers
pub async fn index_handler(
    AuthenticatedUser(user): AuthenticatedUser,
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let items = state.items.list().await?;

    let template = IndexTemplate {
        current_user: Some(user),
        flashes: session.take_flashes().await?,
        csrf_token: session.csrf_token().await?,
        items,
    };

    Ok(Html(template.render()?))
}

pub async fn add_item_page(
    AuthenticatedUser(user): AuthenticatedUser,
    session: Session,
) -> Result<Response, AppError> {
    let form = ItemForm::default().view(&FormErrors::default());
    render_item_form(&session, user, "Add", "/item/add".to_string(), form).await
}

pub async fn add_item_submit(
    AuthenticatedUser(user): AuthenticatedUser,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ItemForm>,
) -> Result<Response, AppError> {
    session.verify_csrf_token(&form.csrf_token).await?;

    match form.validate() {
        Ok(input) => {
            let item = state.items.create(&input).await?;
            tracing::info!("Item {} ({}) added by {}", item.id, item.name, user.username);
            session
                .flash(FlashLevel::Success, "Item added successfully! 🎉")
                .await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(errors) => {
            let view = form.view(&errors);
            render_item_form(&session, user, "Add", "/item/add".to_string(), view).await
        }
    }
}

pub async fn edit_item_page(
    AuthenticatedUser(user): AuthenticatedUser,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_item_id(&id)?;
    let item = state.items.find(id).await?.ok_or(AppError::NotFound)?;

    let view = ItemForm::from_item(&item).view(&FormErrors::default());
    render_item_form(&session, user, "Edit", edit_path(id), view).await
}

pub async fn edit_item_submit(
    AuthenticatedUser(user): AuthenticatedUser,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ItemForm>,
) -> Result<Response, AppError> {
    let id = parse_item_id(&id)?;
    state.items.find(id).await?.ok_or(AppError::NotFound)?;
    session.verify_csrf_token(&form.csrf_token).await?;

    match form.validate() {
        Ok(input) => {
            state.items.update(id, &input).await?;
            tracing::info!("Item {} updated by {}", id, user.username);
            session
                .flash(FlashLevel::Success, "Item updated successfully! ✏️")
                .await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(errors) => {
            let view = form.view(&errors);
            render_item_form(&session, user, "Edit", edit_path(id), view).await
        }
    }
}

pub async fn delete_item_handler(
    AuthenticatedUser(user): AuthenticatedUser,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<CsrfForm>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_item_id(&id)?;
    session.verify_csrf_token(&form.csrf_token).await?;

    state.items.delete(id).await?;
    tracing::info!("Item {} deleted by {}", id, user.username);
    session
        .flash(FlashLevel::Success, "Item deleted successfully. 🗑️")
        .await?;

    Ok(Redirect::to("/"))
}

pub async fn export_handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let items = state.items.list().await?;
    let csv = items_to_csv(&items);

    tracing::info!("Exported {} items", items.len());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", CSV_FILENAME),
            ),
        ],
        csv,
    ))
}

/// Item ids that do not parse are treated like ids that do not exist.
fn parse_item_id(raw: &str) -> Result<i64, AppError> {
    raw.parse().map_err(|_| AppError::NotFound)
}

fn edit_path(id: i64) -> String {
    format!("/item/edit/{}", id)
}

async fn render_login(
    session: &Session,
    error: Option<String>,
    form: &LoginForm,
    errors: &FormErrors,
) -> Result<Response, AppError> {
    let template = LoginTemplate::new(
        session.take_flashes().await?,
        session.csrf_token().await?,
        error,
        form.view(errors),
    );
    Ok(Html(template.render()?).into_response())
}

async fn render_register(
    session: &Session,
    error: Option<String>,
    form: &RegisterForm,
    errors: &FormErrors,
) -> Result<Response, AppError> {
    let template = RegisterTemplate::new(
        session.take_flashes().await?,
        session.csrf_token().await?,
        error,
        form.view(errors),
    );
    Ok(Html(template.render()?).into_response())
}

async fn render_item_form(
    session: &Session,
    user: CurrentUser,
    action: &'static str,
    form_action: String,
    form: ItemFormView,
) -> Result<Response, AppError> {
    let template = ItemFormTemplate {
        current_user: Some(user),
        flashes: session.take_flashes().await?,
        csrf_token: session.csrf_token().await?,
        action,
        form_action,
        form,
    };
    Ok(Html(template.render()?).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_id() {
        assert_eq!(parse_item_id("42").unwrap(), 42);
        assert!(matches!(parse_item_id("abc"), Err(AppError::NotFound)));
        assert!(matches!(parse_item_id(""), Err(AppError::NotFound)));
    }

    #[test]
    fn test_edit_path() {
        assert_eq!(edit_path(7), "/item/edit/7");
    }
}
