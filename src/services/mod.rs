pub mod admin;
pub mod catalog;
pub mod community;
pub mod favourites;
pub mod profile;
pub mod providers;
pub mod session;
pub mod title_search;

pub use admin::{AdminActor, AdminPanelFeed, AdminPanelView, AdminService};
pub use catalog::{Catalog, DiscoverSection, SectionPager};
pub use community::{CommunityService, NewPost};
pub use favourites::FavouritesSync;
pub use profile::ProfileService;
pub use session::{Landing, SessionGate, SessionHandle, SessionState};
