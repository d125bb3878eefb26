//! Cache-aside behavior of `UserRepository` against in-memory backends.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{StalledCache, StalledStore, harness, harness_with, unreachable_redis};
use surge_store::surge_core::{NewUser, User};
use surge_store::{
    CacheKey, CacheLayer, MemoryCache, MemoryStore, Origin, RepositoryConfig, UserRepository,
    UserStore,
};

#[tokio::test]
async fn test_create_then_read_flow() {
    let h = harness();

    let empty = h.repository.list_users().await.unwrap();
    assert_eq!(empty.body(), b"[]");

    let ada = h
        .repository
        .create_user(NewUser::new("Ada", "ada@example.com"))
        .await
        .unwrap();
    assert_eq!(ada.id, 1);

    let users: Vec<User> = h.repository.list_users().await.unwrap().decode().unwrap();
    assert_eq!(users, vec![ada.clone()]);

    let first = h.repository.find_user(ada.id).await.unwrap();
    let second = h.repository.find_user(ada.id).await.unwrap();
    assert_eq!(first.origin(), Origin::Store);
    assert_eq!(second.origin(), Origin::Cache);
    assert_eq!(second.decode::<User>().unwrap(), ada);
}

#[tokio::test]
async fn test_cached_reads_skip_the_store() {
    let h = harness();
    h.repository
        .create_user(NewUser::new("Ada", "ada@example.com"))
        .await
        .unwrap();

    for _ in 0..5 {
        h.repository.list_users().await.unwrap();
        h.repository.find_user(1).await.unwrap();
    }

    // Una lectura de store por clave
    assert_eq!(h.store.read_count(), 2);
    assert_eq!(h.repository.metrics().hits(), 8);
    assert_eq!(h.repository.metrics().misses(), 2);
}

#[tokio::test]
async fn test_writes_behind_the_repository_stay_hidden_until_expiry() {
    let h = harness_with(RepositoryConfig {
        cache_ttl: Duration::from_millis(100),
        ..RepositoryConfig::default()
    });

    h.repository.list_users().await.unwrap();
    h.store
        .insert(&NewUser::new("Ada", "ada@example.com"))
        .await
        .unwrap();

    let stale = h.repository.list_users().await.unwrap();
    assert_eq!(stale.body(), b"[]");

    tokio::time::sleep(Duration::from_millis(200)).await;

    let fresh: Vec<User> = h.repository.list_users().await.unwrap().decode().unwrap();
    assert_eq!(fresh.len(), 1);
}

#[tokio::test]
async fn test_create_leaves_user_entries_alone() {
    let h = harness();
    h.repository
        .create_user(NewUser::new("Ada", "ada@example.com"))
        .await
        .unwrap();
    h.repository.find_user(1).await.unwrap();

    h.repository
        .create_user(NewUser::new("Bob", "bob@example.com"))
        .await
        .unwrap();

    assert!(h.cache.get(&CacheKey::User(1)).await.unwrap().is_some());
    assert_eq!(
        h.repository.find_user(1).await.unwrap().origin(),
        Origin::Cache
    );
}

#[tokio::test]
async fn test_duplicate_email_is_conflict_and_keeps_collection() {
    let h = harness();
    h.repository
        .create_user(NewUser::new("Ada", "ada@example.com"))
        .await
        .unwrap();
    let before = h.repository.list_users().await.unwrap();

    let err = h
        .repository
        .create_user(NewUser::new("Imposter", "ada@example.com"))
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    let after = h.repository.list_users().await.unwrap();
    assert_eq!(after.origin(), Origin::Cache);
    assert_eq!(after.body(), before.body());
}

#[tokio::test]
async fn test_input_is_trimmed_before_insert() {
    let h = harness();

    let user = h
        .repository
        .create_user(NewUser::new("  Ada  ", " ada@example.com "))
        .await
        .unwrap();

    assert_eq!(user.name, "Ada");
    assert_eq!(user.email, "ada@example.com");
}

#[tokio::test]
async fn test_store_outage_surfaces_even_with_warm_cache_for_other_keys() {
    let h = harness();
    h.repository
        .create_user(NewUser::new("Ada", "ada@example.com"))
        .await
        .unwrap();
    h.repository.find_user(1).await.unwrap();

    h.store.set_available(false);

    // La entrada cacheada sigue sirviendo
    assert_eq!(
        h.repository.find_user(1).await.unwrap().origin(),
        Origin::Cache
    );
    assert!(
        h.repository
            .find_user(2)
            .await
            .unwrap_err()
            .is_store_unavailable()
    );
    assert!(
        h.repository
            .list_users()
            .await
            .unwrap_err()
            .is_store_unavailable()
    );
}

#[tokio::test]
async fn test_unreachable_redis_degrades_to_store() {
    let store = Arc::new(MemoryStore::new());
    let repository = UserRepository::new(
        store.clone(),
        unreachable_redis(),
        RepositoryConfig::default(),
    );

    let ada = repository
        .create_user(NewUser::new("Ada", "ada@example.com"))
        .await
        .unwrap();

    let first = repository.find_user(ada.id).await.unwrap();
    let second = repository.find_user(ada.id).await.unwrap();
    let users: Vec<User> = repository.list_users().await.unwrap().decode().unwrap();

    assert_eq!(first.origin(), Origin::Store);
    assert_eq!(second.origin(), Origin::Store);
    assert_eq!(first.body(), second.body());
    assert_eq!(users, vec![ada]);
    assert_eq!(store.read_count(), 3);
    assert!(repository.metrics().degraded() >= 3);
}

#[tokio::test]
async fn test_stalled_cache_is_bounded_by_timeout() {
    let store = Arc::new(MemoryStore::new());
    let repository = UserRepository::new(
        store.clone(),
        Arc::new(StalledCache),
        RepositoryConfig {
            cache_timeout: Duration::from_millis(20),
            ..RepositoryConfig::default()
        },
    );

    let user = tokio::time::timeout(
        Duration::from_secs(2),
        repository.create_user(NewUser::new("Ada", "ada@example.com")),
    )
    .await
    .expect("create should not hang on the cache")
    .unwrap();

    let fetched = tokio::time::timeout(Duration::from_secs(2), repository.find_user(user.id))
        .await
        .expect("read should not hang on the cache")
        .unwrap();

    assert_eq!(fetched.origin(), Origin::Store);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_stalled_store_surfaces_store_unavailable() {
    let cache = Arc::new(MemoryCache::default());
    let repository = UserRepository::new(
        Arc::new(StalledStore),
        cache.clone(),
        RepositoryConfig {
            store_timeout: Duration::from_millis(20),
            ..RepositoryConfig::default()
        },
    );
    let bound = Duration::from_secs(2);

    cache
        .set(&CacheKey::Collection, b"[]", Duration::from_secs(60))
        .await
        .unwrap();

    let err = tokio::time::timeout(
        bound,
        repository.create_user(NewUser::new("Ada", "ada@example.com")),
    )
    .await
    .expect("create should give up on the store")
    .unwrap_err();
    assert!(err.is_store_unavailable());
    assert_eq!(
        cache.get(&CacheKey::Collection).await.unwrap().as_deref(),
        Some(&b"[]"[..])
    );

    let err = tokio::time::timeout(bound, repository.find_user(1))
        .await
        .expect("find should give up on the store")
        .unwrap_err();
    assert!(err.is_store_unavailable());
    assert!(cache.get(&CacheKey::User(1)).await.unwrap().is_none());

    cache.delete(&CacheKey::Collection).await.unwrap();
    let err = tokio::time::timeout(bound, repository.list_users())
        .await
        .expect("list should give up on the store")
        .unwrap_err();
    assert!(err.is_store_unavailable());
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_ids() {
    let h = harness();
    let repository = Arc::new(h.repository);

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let repository = Arc::clone(&repository);
            tokio::spawn(async move {
                repository
                    .create_user(NewUser::new(
                        format!("user-{i}"),
                        format!("user-{i}@example.com"),
                    ))
                    .await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), 20);
    let users: Vec<User> = repository.list_users().await.unwrap().decode().unwrap();
    assert_eq!(users.len(), 20);
}
