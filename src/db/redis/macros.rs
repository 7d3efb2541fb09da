/// Read-through caching around a provider call.
///
/// Returns the cached value for `$key` when present; otherwise awaits
/// `$block`, queues the result for a background write with `$ttl` seconds
/// and returns it. Errors from the block propagate and are never cached.
///
/// ```rust,ignore
/// let titles = cached!(cache, CacheKey::MetadataSearch(query.clone()), SEARCH_TTL_SECS, async move {
///     self.fetch_search(&query).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        if let Some(hit) = $cache.get_from_cache(&key).await? {
            tracing::debug!(key = %key, "Cache hit");
            Ok(hit)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
