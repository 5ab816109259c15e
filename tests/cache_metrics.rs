use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use folio::cache::{CacheAside, CacheKey, CacheStore};

mod support;

use support::{FlakyStore, page_service, portfolio};

const TTL: Duration = Duration::from_secs(60);

fn producer() -> std::future::Ready<Result<u32, String>> {
    std::future::ready(Ok(7))
}

#[tokio::test]
async fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let store = Arc::new(FlakyStore::new());
    let cache = CacheAside::new(store.clone(), TTL);
    let key = CacheKey::new("folio:metrics").expect("key");

    // miss, then hit
    cache.get_with_cache(&key, producer, TTL).await.expect("miss");
    cache.get_with_cache(&key, producer, TTL).await.expect("hit");

    // undecodable entry
    store
        .set("folio:metrics", "{".to_string(), TTL)
        .await
        .expect("seed");
    cache
        .get_with_cache(&key, producer, TTL)
        .await
        .expect("decode fallback");

    // failed write, then failed read
    let other = CacheKey::new("folio:other").expect("key");
    store.fail_writes(true);
    cache
        .get_with_cache(&other, producer, TTL)
        .await
        .expect("write fallback");
    store.fail_reads(true);
    cache
        .get_with_cache(&other, producer, TTL)
        .await
        .expect("read fallback");

    // page fallback
    let page = page_service(
        Arc::new(portfolio().failing("bio")),
        CacheAside::disabled(),
    );
    assert!(page.page_data().await.is_empty());

    let counters: HashMap<String, u64> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter_map(|(composite_key, _, _, value)| match value {
            DebugValue::Counter(count) => Some((composite_key.key().name().to_string(), count)),
            _ => None,
        })
        .fold(HashMap::new(), |mut acc, (name, count)| {
            *acc.entry(name).or_default() += count;
            acc
        });

    assert_eq!(counters.get("folio_cache_miss_total"), Some(&2));
    assert_eq!(counters.get("folio_cache_hit_total"), Some(&1));
    assert_eq!(counters.get("folio_cache_read_error_total"), Some(&2));
    assert_eq!(counters.get("folio_cache_write_error_total"), Some(&1));
    assert_eq!(counters.get("folio_page_data_fallback_total"), Some(&1));
}
