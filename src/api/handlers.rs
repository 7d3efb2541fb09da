use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    auth::{AuthSession, Credentials, SignUpRequest},
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        AuditLogEntry, ContentItem, FeatureFlagSet, MetadataDetails, MetadataTitle,
        ProfileUpdate, TrailerMatch, UserProfile,
    },
    services::{
        catalog::{SectionPage, SECTION_COUNT},
        title_search, FavouritesSync, Landing, NewPost, SessionState,
    },
};

use super::{extract::CurrentUser, AppState};

// Request/Response types

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub state: SessionState,
    pub landing: Landing,
    pub shows_vip_tab: bool,
    pub can_post: bool,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub featured: Vec<ContentItem>,
    pub general: Vec<ContentItem>,
}

#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    pub featured: Vec<ContentItem>,
    pub sections: Vec<SectionPage>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub revealed: usize,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub content_id: String,
    pub favourite: bool,
}

#[derive(Debug, Deserialize)]
pub struct GenresRequest {
    pub genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct TrailerQuery {
    pub title: String,
    pub platform: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PremiumRequest {
    pub premium: bool,
}

#[derive(Debug, Deserialize)]
pub struct FlagRequest {
    pub enabled: bool,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Creates an account and its profile
pub async fn sign_up(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SignUpRequest>,
) -> AppResult<(StatusCode, Json<AuthSession>)> {
    let session = state.auth.sign_up(request).await?;
    let is_admin = state.is_admin_email(&session.user.email);

    // Undo the account so the same email can sign up again
    if let Err(e) = state.profiles().register(&session.user, is_admin).await {
        tracing::error!(
            request_id = %request_id,
            user_id = %session.user.id,
            error = %e,
            "Profile creation failed, removing account"
        );
        if let Err(undo) = state.auth.delete_account(&session.user).await {
            tracing::error!(
                request_id = %request_id,
                user_id = %session.user.id,
                error = %undo,
                "Failed to remove account after incomplete sign-up"
            );
        }
        return Err(e);
    }

    tracing::info!(
        request_id = %request_id,
        user_id = %session.user.id,
        is_admin,
        "Sign-up completed"
    );
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> AppResult<Json<AuthSession>> {
    Ok(Json(state.auth.sign_in(credentials).await?))
}

pub async fn sign_out(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<StatusCode> {
    state.auth.sign_out(&current.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Resolved session state for the caller
pub async fn session(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<SessionResponse>> {
    let session = state.session_gate().resolve(Some(&current.user)).await?;
    Ok(Json(SessionResponse {
        landing: session.landing(),
        shows_vip_tab: session.shows_vip_tab(),
        can_post: session.can_post(),
        state: session,
    }))
}

pub async fn catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        featured: state.catalog.featured().into_iter().cloned().collect(),
        general: state.catalog.general().into_iter().cloned().collect(),
    })
}

/// Featured carousel plus the first page of each genre section
pub async fn discover(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    current: CurrentUser,
) -> AppResult<Json<DiscoverResponse>> {
    let profile = state.profiles().get_profile(&current.user.id).await?;

    let sections = (0..SECTION_COUNT)
        .map(|index| state.catalog.section_page(&profile.preferred_genres, index, 0))
        .collect::<AppResult<Vec<_>>>()?;

    tracing::info!(
        request_id = %request_id,
        user_id = %current.user.id,
        preferred = profile.preferred_genres.len(),
        fallbacks = sections.iter().filter(|s| s.fallback).count(),
        "Discover sections built"
    );

    Ok(Json(DiscoverResponse {
        featured: state.catalog.featured().into_iter().cloned().collect(),
        sections,
    }))
}

/// One more page of a discover section
pub async fn discover_section(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(index): Path<usize>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<SectionPage>> {
    let profile = state.profiles().get_profile(&current.user.id).await?;
    let page = state
        .catalog
        .section_page(&profile.preferred_genres, index, page.revealed)?;
    Ok(Json(page))
}

pub async fn list_favourites(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<Vec<ContentItem>>> {
    let favourites =
        FavouritesSync::load(current.user.id, state.stores.favourites.clone()).await?;
    Ok(Json(favourites.into_items()))
}

/// Flips favourite membership for a catalog title or community post
pub async fn toggle_favourite(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    current: CurrentUser,
    Path(content_id): Path<String>,
) -> AppResult<Json<ToggleResponse>> {
    let item = match state.catalog.find(&content_id) {
        Some(item) => item.clone(),
        None => state
            .stores
            .community
            .list_posts()
            .await?
            .into_iter()
            .find(|p| p.id == content_id)
            .ok_or_else(|| AppError::NotFound(format!("Content {} not found", content_id)))?,
    };

    let mut favourites =
        FavouritesSync::load(current.user.id.clone(), state.stores.favourites.clone()).await?;
    let favourite = favourites.toggle(&item).await?;

    tracing::info!(
        request_id = %request_id,
        user_id = %current.user.id,
        content_id = %content_id,
        favourite,
        "Favourite toggled"
    );
    Ok(Json(ToggleResponse {
        content_id,
        favourite,
    }))
}

pub async fn remove_favourite(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(content_id): Path<String>,
) -> AppResult<StatusCode> {
    let mut favourites =
        FavouritesSync::load(current.user.id, state.stores.favourites.clone()).await?;
    favourites.remove(&content_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(state.profiles().get_profile(&current.user.id).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(
        state
            .profiles()
            .update_profile(&current.user.id, &update)
            .await?,
    ))
}

pub async fn set_genres(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<GenresRequest>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(
        state
            .profiles()
            .set_preferred_genres(&current.user.id, &request.genres)
            .await?,
    ))
}

pub async fn enable_vip(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(state.profiles().enable_vip(&current.user.id).await?))
}

pub async fn disable_vip(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(state.profiles().disable_vip(&current.user.id).await?))
}

/// Raw image body; any format the decoder understands
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    current: CurrentUser,
    body: Bytes,
) -> AppResult<Json<UserProfile>> {
    tracing::info!(
        request_id = %request_id,
        user_id = %current.user.id,
        size = body.len(),
        "Avatar upload"
    );
    Ok(Json(
        state
            .profiles()
            .upload_avatar(&current.user.id, body.to_vec())
            .await?,
    ))
}

pub async fn remove_photo(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(state.profiles().remove_avatar(&current.user.id).await?))
}

pub async fn search_titles(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    _current: CurrentUser,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<MetadataTitle>>> {
    tracing::info!(
        request_id = %request_id,
        query = %params.q,
        provider = state.metadata.name(),
        "Searching titles"
    );
    let titles = title_search::search_titles(state.metadata.as_ref(), &params.q).await?;
    Ok(Json(titles))
}

pub async fn title_details(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(imdb_id): Path<String>,
) -> AppResult<Json<MetadataDetails>> {
    Ok(Json(
        title_search::title_details(state.metadata.as_ref(), &imdb_id).await?,
    ))
}

pub async fn trailer(
    State(state): State<AppState>,
    _current: CurrentUser,
    Query(params): Query<TrailerQuery>,
) -> AppResult<Json<TrailerMatch>> {
    let trailer = title_search::find_trailer(
        state.videos.as_ref(),
        &params.title,
        params.platform.as_deref(),
    )
    .await?;
    Ok(Json(trailer))
}

pub async fn list_posts(
    State(state): State<AppState>,
    _current: CurrentUser,
) -> AppResult<Json<Vec<ContentItem>>> {
    Ok(Json(state.community().list_posts().await?))
}

pub async fn create_post(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(post): Json<NewPost>,
) -> AppResult<(StatusCode, Json<ContentItem>)> {
    let item = state.community().create_post(&current.user, post).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Looks a user up by email (audited)
pub async fn admin_search_user(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    current: CurrentUser,
    Query(params): Query<UserSearchQuery>,
) -> AppResult<Json<UserProfile>> {
    let admin = state.admin();
    let actor = admin.authorize(&current.user).await?;

    tracing::info!(request_id = %request_id, admin_id = %actor.id(), "Admin user search");
    Ok(Json(admin.search_user(&actor, &params.email).await?))
}

/// Grants or revokes premium (audited)
pub async fn admin_set_premium(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    current: CurrentUser,
    Path(user_id): Path<String>,
    Json(request): Json<PremiumRequest>,
) -> AppResult<Json<UserProfile>> {
    let admin = state.admin();
    let actor = admin.authorize(&current.user).await?;

    tracing::info!(
        request_id = %request_id,
        admin_id = %actor.id(),
        target_user_id = %user_id,
        premium = request.premium,
        "Admin premium change"
    );
    Ok(Json(
        admin
            .set_premium(&actor, &user_id, request.premium)
            .await?,
    ))
}

pub async fn admin_flags(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<FeatureFlagSet>> {
    let admin = state.admin();
    let actor = admin.authorize(&current.user).await?;
    Ok(Json(admin.feature_flags(&actor).await?))
}

/// Sets one feature flag (audited)
pub async fn admin_set_flag(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    current: CurrentUser,
    Path(name): Path<String>,
    Json(request): Json<FlagRequest>,
) -> AppResult<Json<FeatureFlagSet>> {
    let admin = state.admin();
    let actor = admin.authorize(&current.user).await?;

    tracing::info!(
        request_id = %request_id,
        admin_id = %actor.id(),
        flag = %name,
        enabled = request.enabled,
        "Admin feature flag change"
    );
    Ok(Json(
        admin
            .set_feature_flag(&actor, &name, request.enabled)
            .await?,
    ))
}

/// Most recent audit entries, newest first
pub async fn admin_audit(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<Vec<AuditLogEntry>>> {
    let admin = state.admin();
    let actor = admin.authorize(&current.user).await?;
    Ok(Json(admin.recent_activity(&actor).await?))
}
