use std::time::{Duration, Instant};

use scorecast_terminal::team_cache::{CACHE_TTL, TeamCache};
use scorecast_terminal::team_search::Team;

fn team(id: u32, name: &str) -> Team {
    Team {
        id,
        name: name.to_string(),
        logo: "⚪".to_string(),
        country: "🇪🇸 Spain".to_string(),
    }
}

#[test]
fn fresh_entry_is_returned_until_ttl() {
    let mut cache = TeamCache::new();
    let t0 = Instant::now();

    cache.put("real", vec![team(1, "Real Madrid")], t0);

    let just_before = t0 + CACHE_TTL - Duration::from_secs(1);
    let hit = cache.get("real", just_before).expect("entry still fresh");
    assert_eq!(hit.len(), 1);
    assert_eq!(hit[0].name, "Real Madrid");

    assert!(cache.get("real", t0 + CACHE_TTL).is_none());
}

#[test]
fn expired_entry_is_removed_on_read() {
    let mut cache = TeamCache::new();
    let t0 = Instant::now();

    cache.put("liv", vec![team(4, "Liverpool")], t0);
    assert_eq!(cache.len(), 1);

    assert!(cache.get("liv", t0 + CACHE_TTL).is_none());
    assert!(cache.is_empty());
}

#[test]
fn empty_result_vectors_are_cached_too() {
    let mut cache = TeamCache::new();
    let t0 = Instant::now();

    cache.put("zzz", Vec::new(), t0);
    let hit = cache.get("zzz", t0 + Duration::from_secs(60));
    assert!(hit.is_some_and(|teams| teams.is_empty()));
}

// A put over a still-fresh key keeps the earlier deadline, so the later
// write is evicted on the earlier write's schedule.
#[test]
fn reinsert_does_not_extend_pending_eviction() {
    let mut cache = TeamCache::new();
    let t0 = Instant::now();

    cache.put("bar", vec![team(2, "Barcelona")], t0);

    let t1 = t0 + Duration::from_secs(20 * 60);
    cache.put("bar", vec![team(11, "Barcelona SC")], t1);

    // The replacement value is served while the first deadline holds.
    let hit = cache
        .get("bar", t1 + Duration::from_secs(60))
        .expect("replacement visible");
    assert_eq!(hit[0].name, "Barcelona SC");

    // Only 10 minutes into the second write's life, the first write's
    // deadline evicts it.
    assert!(cache.get("bar", t0 + CACHE_TTL).is_none());
}

#[test]
fn reinsert_after_expiry_gets_a_fresh_deadline() {
    let mut cache = TeamCache::new();
    let t0 = Instant::now();

    cache.put("psg", vec![team(6, "PSG")], t0);
    let t1 = t0 + CACHE_TTL + Duration::from_secs(1);
    cache.put("psg", vec![team(6, "PSG")], t1);

    assert!(
        cache
            .get("psg", t1 + CACHE_TTL - Duration::from_secs(1))
            .is_some()
    );
}

#[test]
fn sweep_drops_only_expired_entries() {
    let mut cache = TeamCache::new();
    let t0 = Instant::now();

    cache.put("old", vec![team(1, "Real Madrid")], t0);
    let t1 = t0 + Duration::from_secs(25 * 60);
    cache.put("new", vec![team(2, "Barcelona")], t1);

    cache.sweep(t0 + CACHE_TTL);
    assert_eq!(cache.len(), 1);
    assert!(cache.get("new", t0 + CACHE_TTL).is_some());
}
