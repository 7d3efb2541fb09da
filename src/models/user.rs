use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const MIN_AGE: u32 = 1;
const MAX_AGE: u32 = 120;

/// Per-user profile document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UserProfile {
    /// Auth subject
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub premium: bool,
    /// Ordered, first entries weigh more
    #[serde(default)]
    pub preferred_genres: Vec<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update merged into a profile document.
///
/// `None` leaves a field untouched. `photo_url` distinguishes "leave as is"
/// (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub age: Option<u32>,
    pub premium: Option<bool>,
    pub preferred_genres: Option<Vec<String>>,
    pub photo_url: Option<Option<String>>,
    pub add_photo: Option<String>,
    pub is_admin: Option<bool>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Applies a merge-write
    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(email) = patch.email {
            self.email = Some(email.trim().to_lowercase());
        }
        if let Some(name) = patch.name {
            self.name = Some(name);
        }
        if let Some(age) = patch.age {
            self.age = Some(age);
        }
        if let Some(premium) = patch.premium {
            self.premium = premium;
        }
        if let Some(genres) = patch.preferred_genres {
            self.preferred_genres = genres;
        }
        if let Some(photo_url) = patch.photo_url {
            self.photo_url = photo_url;
        }
        if let Some(photo) = patch.add_photo {
            if !self.photos.contains(&photo) {
                self.photos.push(photo);
            }
        }
        if let Some(is_admin) = patch.is_admin {
            self.is_admin = is_admin;
        }
        self.updated_at = Some(Utc::now());
    }
}

/// Profile edit form as submitted by the client
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    /// Free-text age field
    pub age: String,
}

impl ProfileUpdate {
    /// Returns the trimmed name and parsed age
    pub fn validate(&self) -> AppResult<(String, u32)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("Name is required".to_string()));
        }

        let age = self
            .age
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
            .ok_or_else(|| {
                AppError::InvalidInput(format!("Enter age between {}-{}", MIN_AGE, MAX_AGE))
            })?;

        Ok((name.to_string(), age))
    }
}

/// Normalizes a genre selection: trims, drops blanks and repeats, keeps order
pub fn normalize_genres(genres: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(genres.len());
    for genre in genres {
        let genre = genre.trim();
        if genre.is_empty() {
            continue;
        }
        if !normalized.iter().any(|g| g.eq_ignore_ascii_case(genre)) {
            normalized.push(genre.to_string());
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(name: &str, age: &str) -> ProfileUpdate {
        ProfileUpdate {
            name: name.to_string(),
            age: age.to_string(),
        }
    }

    #[test]
    fn test_apply_merges_only_present_fields() {
        let mut profile = UserProfile::new("uid-1");
        profile.name = Some("Mina".to_string());
        profile.apply(ProfilePatch {
            premium: Some(true),
            ..Default::default()
        });

        assert!(profile.premium);
        assert_eq!(profile.name.as_deref(), Some("Mina"));
        assert!(profile.updated_at.is_some());
    }

    #[test]
    fn test_apply_clears_photo_but_keeps_history() {
        let mut profile = UserProfile::new("uid-1");
        profile.apply(ProfilePatch {
            photo_url: Some(Some("/media/a.jpg".to_string())),
            add_photo: Some("/media/a.jpg".to_string()),
            ..Default::default()
        });
        profile.apply(ProfilePatch {
            add_photo: Some("/media/a.jpg".to_string()),
            ..Default::default()
        });
        assert_eq!(profile.photos.len(), 1);

        profile.apply(ProfilePatch {
            photo_url: Some(None),
            ..Default::default()
        });
        assert_eq!(profile.photo_url, None);
        assert_eq!(profile.photos, vec!["/media/a.jpg"]);
    }

    #[test]
    fn test_apply_lowercases_email() {
        let mut profile = UserProfile::new("uid-1");
        profile.apply(ProfilePatch {
            email: Some(" Mina@Example.COM ".to_string()),
            ..Default::default()
        });
        assert_eq!(profile.email.as_deref(), Some("mina@example.com"));
    }

    #[test]
    fn test_validate_profile_update() {
        assert_eq!(
            update("  Mina ", "29").validate().unwrap(),
            ("Mina".to_string(), 29)
        );
        assert!(update("   ", "29").validate().is_err());
        assert!(update("Mina", "0").validate().is_err());
        assert!(update("Mina", "121").validate().is_err());
        assert!(update("Mina", "twenty").validate().is_err());
        assert!(update("Mina", "").validate().is_err());
        assert_eq!(update("Mina", "120").validate().unwrap().1, 120);
    }

    #[test]
    fn test_normalize_genres() {
        let input = vec![
            " Romance ".to_string(),
            "".to_string(),
            "Thriller".to_string(),
            "romance".to_string(),
            "Fantasy".to_string(),
        ];
        assert_eq!(
            normalize_genres(&input),
            vec!["Romance", "Thriller", "Fantasy"]
        );
    }

    #[test]
    fn test_profile_deserializes_sparse_document() {
        let profile: UserProfile = serde_json::from_str(r#"{"id": "uid-9"}"#).unwrap();
        assert_eq!(profile.id, "uid-9");
        assert!(!profile.premium);
        assert!(profile.preferred_genres.is_empty());
    }
}
