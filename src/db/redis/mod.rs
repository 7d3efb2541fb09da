pub mod cache;

mod macros;

pub use cache::{
    create_redis_client, Cache, CacheKey, CacheWriterHandle, DETAILS_TTL_SECS, SEARCH_TTL_SECS,
};
