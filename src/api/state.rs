use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    auth::AuthProvider,
    db::Stores,
    services::{
        providers::{MetadataProvider, VideoSearchProvider},
        AdminService, Catalog, CommunityService, ProfileService, SessionGate,
    },
    storage::ObjectStorage,
};

/// Directory served under a URL prefix
#[derive(Debug, Clone)]
pub struct MediaMount {
    pub url_prefix: String,
    pub root: PathBuf,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub auth: Arc<dyn AuthProvider>,
    pub metadata: Arc<dyn MetadataProvider>,
    pub videos: Arc<dyn VideoSearchProvider>,
    pub media: Arc<dyn ObjectStorage>,
    pub catalog: Arc<Catalog>,
    /// Lower-cased; accounts signing up with these become administrators
    pub admin_emails: Arc<Vec<String>>,
    pub media_mount: Option<MediaMount>,
}

impl AppState {
    pub fn new(
        stores: Stores,
        auth: Arc<dyn AuthProvider>,
        metadata: Arc<dyn MetadataProvider>,
        videos: Arc<dyn VideoSearchProvider>,
        media: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            stores,
            auth,
            metadata,
            videos,
            media,
            catalog: Arc::new(Catalog::sample()),
            admin_emails: Arc::new(Vec::new()),
            media_mount: None,
        }
    }

    pub fn with_admin_emails(mut self, admin_emails: Vec<String>) -> Self {
        self.admin_emails = Arc::new(
            admin_emails
                .into_iter()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        );
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    pub fn with_media_mount(mut self, mount: MediaMount) -> Self {
        self.media_mount = Some(mount);
        self
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|e| *e == email)
    }

    pub fn profiles(&self) -> ProfileService {
        ProfileService::new(self.stores.profiles.clone(), self.media.clone())
    }

    pub fn admin(&self) -> AdminService {
        AdminService::from_stores(&self.stores)
    }

    pub fn community(&self) -> CommunityService {
        CommunityService::new(self.stores.profiles.clone(), self.stores.community.clone())
    }

    pub fn session_gate(&self) -> SessionGate {
        SessionGate::new(self.stores.profiles.clone())
    }
}
