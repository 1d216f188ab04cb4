use praxis_core::dashboard::DashboardStats;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

pub(crate) const STATS_CACHE_TTL: Duration = Duration::from_secs(60);

/// One dashboard computation per (teacher, window, course filter).
pub(crate) type StatsKey = (Uuid, u16, Option<i32>);

struct Entry {
    stored_at: Instant,
    stats: DashboardStats,
}

/// Short-lived dashboard cache. Entries expire after the TTL; concurrent
/// population races are benign and the last writer wins.
#[derive(Clone)]
pub(crate) struct StatsCache {
    ttl: Duration,
    inner: Arc<RwLock<HashMap<StatsKey, Entry>>>,
}

impl StatsCache {
    pub(crate) fn new() -> Self {
        Self::with_ttl(STATS_CACHE_TTL)
    }

    pub(crate) fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub(crate) async fn get(&self, key: &StatsKey) -> Option<DashboardStats> {
        let entries = self.inner.read().await;
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.stats.clone())
    }

    pub(crate) async fn put(&self, key: StatsKey, stats: DashboardStats) {
        let mut entries = self.inner.write().await;
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        entries.insert(
            key,
            Entry {
                stored_at: Instant::now(),
                stats,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> DashboardStats {
        DashboardStats {
            active_courses: 1,
            unique_students: 0,
            upcoming_labs: 0,
            lab_grades_done: 0,
            lab_grades_null: 0,
            fa_submitted: 0,
            fa_graded: 0,
            fa_avg: None,
            overdue_ungraded: 0,
            no_attendance_sessions: 0,
            per_course: Vec::new(),
            attendance_trend: [0; 4],
        }
    }

    #[tokio::test]
    async fn entries_are_keyed_by_filters() {
        let cache = StatsCache::new();
        let user = Uuid::new_v4();
        cache.put((user, 7, None), stats()).await;

        assert!(cache.get(&(user, 7, None)).await.is_some());
        assert!(cache.get(&(user, 3, None)).await.is_none());
        assert!(cache.get(&(user, 7, Some(1))).await.is_none());
        assert!(cache.get(&(Uuid::new_v4(), 7, None)).await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_not_served() {
        let cache = StatsCache::with_ttl(Duration::ZERO);
        let key = (Uuid::new_v4(), 7, None);
        cache.put(key, stats()).await;

        assert!(cache.get(&key).await.is_none());
    }
}
