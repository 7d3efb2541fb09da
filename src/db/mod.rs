pub mod memory;
pub mod postgres;
pub mod redis;
pub mod store;
pub mod subscription;

pub use memory::MemoryStore;
pub use postgres::{create_pool, run_migrations, ListenerHandle, PgStore};
pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use store::{
    AccountStore, AppConfigStore, AuditLogStore, CommunityPostStore, FavouriteStore,
    ProfileStore, Stores,
};
pub use subscription::Subscription;

#[cfg(test)]
pub use store::{
    MockAccountStore, MockAppConfigStore, MockAuditLogStore, MockCommunityPostStore,
    MockFavouriteStore, MockProfileStore,
};
