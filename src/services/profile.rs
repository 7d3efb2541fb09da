use std::sync::Arc;

use chrono::Utc;

use crate::{
    auth::AuthUser,
    db::ProfileStore,
    error::{AppError, AppResult},
    models::{user::normalize_genres, ProfilePatch, ProfileUpdate, UserProfile},
    storage::{self, ObjectStorage},
};

/// Profile edits, VIP membership, genre preferences and avatars.
///
/// Every mutation is a single merge-write; the returned profile is what the
/// store holds afterwards.
#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileStore>,
    media: Arc<dyn ObjectStorage>,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileStore>, media: Arc<dyn ObjectStorage>) -> Self {
        Self { profiles, media }
    }

    /// Creates the profile for a new account
    pub async fn register(&self, user: &AuthUser, is_admin: bool) -> AppResult<UserProfile> {
        let profile = self
            .profiles
            .merge_profile(
                &user.id,
                ProfilePatch {
                    email: Some(user.email.clone()),
                    is_admin: is_admin.then_some(true),
                    ..Default::default()
                },
            )
            .await?;

        if is_admin {
            tracing::info!(user_id = %user.id, "Registered administrator account");
        }
        Ok(profile)
    }

    /// The stored profile, or an empty one if nothing was written yet
    pub async fn get_profile(&self, user_id: &str) -> AppResult<UserProfile> {
        Ok(self
            .profiles
            .get_profile(user_id)
            .await?
            .unwrap_or_else(|| UserProfile::new(user_id)))
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> AppResult<UserProfile> {
        let (name, age) = update.validate()?;
        self.profiles
            .merge_profile(
                user_id,
                ProfilePatch {
                    name: Some(name),
                    age: Some(age),
                    ..Default::default()
                },
            )
            .await
    }

    pub async fn enable_vip(&self, user_id: &str) -> AppResult<UserProfile> {
        self.set_vip(user_id, true).await
    }

    pub async fn disable_vip(&self, user_id: &str) -> AppResult<UserProfile> {
        self.set_vip(user_id, false).await
    }

    async fn set_vip(&self, user_id: &str, premium: bool) -> AppResult<UserProfile> {
        let profile = self
            .profiles
            .merge_profile(
                user_id,
                ProfilePatch {
                    premium: Some(premium),
                    ..Default::default()
                },
            )
            .await?;
        tracing::info!(user_id = %user_id, premium, "VIP membership changed");
        Ok(profile)
    }

    pub async fn set_preferred_genres(
        &self,
        user_id: &str,
        genres: &[String],
    ) -> AppResult<UserProfile> {
        self.profiles
            .merge_profile(
                user_id,
                ProfilePatch {
                    preferred_genres: Some(normalize_genres(genres)),
                    ..Default::default()
                },
            )
            .await
    }

    /// Resizes, stores and links a new avatar
    pub async fn upload_avatar(&self, user_id: &str, bytes: Vec<u8>) -> AppResult<UserProfile> {
        if bytes.is_empty() {
            return Err(AppError::InvalidInput("Empty image upload".to_string()));
        }

        let jpeg = tokio::task::spawn_blocking(move || storage::resize_avatar(&bytes))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;

        let key = format!(
            "profile_pictures/{}/avatar_{}.jpg",
            user_id,
            Utc::now().timestamp_millis()
        );
        let url = self
            .media
            .put_object(&key, jpeg, storage::JPEG_CONTENT_TYPE)
            .await?;

        self.profiles
            .merge_profile(
                user_id,
                ProfilePatch {
                    photo_url: Some(Some(url.clone())),
                    add_photo: Some(url),
                    ..Default::default()
                },
            )
            .await
    }

    /// Unlinks the current avatar; upload history is kept
    pub async fn remove_avatar(&self, user_id: &str) -> AppResult<UserProfile> {
        self.profiles
            .merge_profile(
                user_id,
                ProfilePatch {
                    photo_url: Some(None),
                    ..Default::default()
                },
            )
            .await
    }
}
