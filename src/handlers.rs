use crate::{
    AppState,
    auth::{self, Identity, Principal},
    authz,
    error::ApiError,
    models::{
        CreateNewsRequest, LoginForm, NewUser, NewsArticle, RegisterUserRequest, Role, RoleName,
        TokenResponse, UpdateNewsRequest, UpdateUserRequest, UserResponse, UserSummary,
    },
    repository::PublishOutcome,
    workflow,
};
use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;

// --- Identity & Catalog ---

/// login
///
/// [Public Route] Exchanges a login/password form for a bearer token.
/// A banned account is refused even with correct credentials.
#[utoipa::path(
    post,
    path = "/token",
    request_body = LoginForm,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Bad credentials"),
        (status = 403, description = "Account banned")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .repo
        .find_user_by_login(&form.username)
        .await
        .map_err(ApiError::from)?
        .filter(|u| u.password == form.password)
        .ok_or_else(|| ApiError::Unauthenticated("incorrect login or password".to_string()))?;

    if user.in_ban {
        return Err(ApiError::Forbidden("your account is banned".to_string()));
    }

    let roles: Vec<RoleName> = user.roles.iter().map(|r| r.name).collect();
    let access_token = auth::issue_token(&user.login, &roles, &state.config.jwt_secret)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// list_roles
///
/// [Public Route] The seeded role catalog.
#[utoipa::path(
    get,
    path = "/roles",
    responses((status = 200, description = "Role catalog", body = [Role]))
)]
pub async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>, ApiError> {
    Ok(Json(state.repo.list_roles().await?))
}

// --- User Registry ---

/// register_user
///
/// [Public Route] Creates a new account. A taken login is a conflict and
/// performs no write; role ids missing from the catalog are silently
/// dropped, so an empty role set is a legal outcome.
#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Registered", body = UserResponse),
        (status = 409, description = "Login already taken")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    if state
        .repo
        .find_user_by_login(&payload.login)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("login already taken".to_string()));
    }

    let roles = state.repo.find_roles_by_ids(&payload.role_ids).await?;
    let user = state
        .repo
        .insert_user(
            NewUser {
                login: payload.login,
                fio: payload.fio,
                phone: payload.phone,
                email: payload.email,
                password: payload.password,
                in_ban: payload.in_ban.unwrap_or(false),
                created: Utc::now(),
            },
            roles,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// list_users
///
/// [Authenticated Route] Admins receive full records; moderators a reduced
/// projection without login, email or phone; everyone else is refused.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 403, description = "Insufficient role")
    )
)]
pub async fn list_users(
    ident: Identity,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    authz::can_list_users(&ident)?;
    let users = state.repo.list_users().await?;
    if ident.roles.contains(RoleName::Admin) {
        let full: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
        Ok(Json(full).into_response())
    } else {
        let reduced: Vec<UserSummary> = users.into_iter().map(UserSummary::from).collect();
        Ok(Json(reduced).into_response())
    }
}

/// update_user
///
/// [Authenticated Route] Partial update. Contributors may edit their own
/// profile, admin/moderator anyone's; role assignments and the ban flag
/// only an admin. All gates run before any write.
#[utoipa::path(
    patch,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = UserResponse),
        (status = 403, description = "Insufficient role or not owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_user(
    ident: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    authz::can_edit_user(
        &ident,
        user_id,
        payload.role_ids.is_some(),
        payload.in_ban.is_some(),
    )?;

    let mut user = state
        .repo
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    let roles = match payload.role_ids {
        Some(ids) => {
            let resolved = state.repo.find_roles_by_ids(&ids).await?;
            if resolved.is_empty() && !ids.is_empty() {
                return Err(ApiError::Validation(
                    "one or more of the given roles were not found".to_string(),
                ));
            }
            Some(resolved)
        }
        None => None,
    };

    if let Some(fio) = payload.fio {
        user.fio = fio;
    }
    if let Some(phone) = payload.phone {
        user.phone = phone;
    }
    if let Some(email) = payload.email {
        user.email = email;
    }
    if let Some(password) = payload.password {
        user.password = password;
    }
    if let Some(in_ban) = payload.in_ban {
        user.in_ban = in_ban;
    }

    let user = state.repo.update_user(&user, roles).await?;
    Ok(Json(user.into()))
}

/// set_user_ban
///
/// [Admin Route] Flips the ban flag. Admins cannot target themselves here;
/// setting the flag to its current value is a no-op returning the record.
#[utoipa::path(
    patch,
    path = "/users/{id}/ban",
    params(("id" = i64, Path, description = "User ID")),
    request_body = bool,
    responses(
        (status = 200, description = "Updated", body = UserResponse),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Self-ban refused")
    )
)]
pub async fn set_user_ban(
    ident: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(in_ban): Json<bool>,
) -> Result<Json<UserResponse>, ApiError> {
    authz::can_set_ban(&ident, user_id)?;

    let mut user = state
        .repo
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    if user.in_ban == in_ban {
        return Ok(Json(user.into()));
    }
    user.in_ban = in_ban;
    let user = state.repo.update_user(&user, None).await?;
    Ok(Json(user.into()))
}

/// delete_user
///
/// [Admin Route] Hard delete. Role links cascade; authored articles are
/// orphaned on purpose.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Insufficient role"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_user(
    ident: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authz::can_delete_user(&ident)?;
    if state.repo.delete_user(user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("user not found".to_string()))
    }
}

// --- News Workflow ---

/// create_news
///
/// [Authenticated Route] Creates an article. Whatever status the payload
/// carries, the article starts life as a Draft owned by the caller.
#[utoipa::path(
    post,
    path = "/news",
    request_body = CreateNewsRequest,
    responses(
        (status = 201, description = "Created", body = NewsArticle),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Insufficient role")
    )
)]
pub async fn create_news(
    ident: Identity,
    State(state): State<AppState>,
    Json(payload): Json<CreateNewsRequest>,
) -> Result<(StatusCode, Json<NewsArticle>), ApiError> {
    authz::can_create_news(&ident)?;
    let draft = workflow::prepare_draft(payload)?;
    let article = state
        .repo
        .insert_article(draft, ident.user_id, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(article)))
}

/// list_news
///
/// [Public Route] Published articles for everyone; admins and moderators
/// see all; an author additionally sees their own unpublished articles.
#[utoipa::path(
    get,
    path = "/news",
    responses((status = 200, description = "Visible articles", body = [NewsArticle]))
)]
pub async fn list_news(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<Vec<NewsArticle>>, ApiError> {
    let scope = authz::list_scope(&principal);
    Ok(Json(state.repo.list_articles(scope).await?))
}

/// get_news
///
/// [Public Route] Single article by id. Unpublished articles are visible
/// only to admin/moderator or the creator. Each visible read bumps the view
/// counter by one -- repeated calls by the same caller each count.
#[utoipa::path(
    get,
    path = "/news/{id}",
    params(("id" = i64, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Found", body = NewsArticle),
        (status = 403, description = "Not visible"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_news(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NewsArticle>, ApiError> {
    let mut article = state
        .repo
        .find_article_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("news article not found".to_string()))?;

    authz::can_view_news(&principal, &article)?;

    state.repo.increment_views(id).await?;
    article.views += 1;
    Ok(Json(article))
}

/// update_news
///
/// [Authenticated Route] Partial update. Moderators and admins may edit any
/// article, an author only their own; any status change -- including a
/// direct edit into Published -- requires admin or moderator.
#[utoipa::path(
    patch,
    path = "/news/{id}",
    params(("id" = i64, Path, description = "Article ID")),
    request_body = UpdateNewsRequest,
    responses(
        (status = 200, description = "Updated", body = NewsArticle),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Insufficient role or not owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_news(
    ident: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateNewsRequest>,
) -> Result<Json<NewsArticle>, ApiError> {
    let mut article = state
        .repo
        .find_article_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("news article not found".to_string()))?;

    authz::can_edit_news(&ident, &article)?;
    workflow::apply_update(
        &mut article,
        payload,
        authz::is_elevated(&ident),
        Utc::now(),
    )?;

    let article = state.repo.save_article(&article).await?;
    Ok(Json(article))
}

/// publish_news
///
/// [Authenticated Route] The dedicated publish transition, admin/moderator
/// only. Publishing twice is a conflict; the guard is a single conditional
/// store update, so concurrent publishes cannot both succeed.
#[utoipa::path(
    post,
    path = "/news/{id}/publish",
    params(("id" = i64, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Published", body = NewsArticle),
        (status = 403, description = "Insufficient role"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Already published")
    )
)]
pub async fn publish_news(
    ident: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NewsArticle>, ApiError> {
    authz::can_publish_news(&ident)?;
    match state.repo.publish_article(id, Utc::now()).await? {
        PublishOutcome::Published(article) => Ok(Json(article)),
        PublishOutcome::AlreadyPublished => {
            Err(ApiError::Conflict("article is already published".to_string()))
        }
        PublishOutcome::NotFound => Err(ApiError::NotFound("news article not found".to_string())),
    }
}

/// delete_news
///
/// [Authenticated Route] Removes an article; admin/moderator only.
#[utoipa::path(
    delete,
    path = "/news/{id}",
    params(("id" = i64, Path, description = "Article ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Insufficient role"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_news(
    ident: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authz::can_delete_news(&ident)?;
    if state.repo.delete_article(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("news article not found".to_string()))
    }
}
