use {
    crate::{state::TweetStore, window::WindowDuration},
    serde::Serialize,
    std::collections::HashMap,
};

/// Retweet count of one original within the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopKEntry {
    pub original_id: String,
    pub count: usize,
}

/// Rank originals by live retweet events.
///
/// Evicts expired records first, then rescans the store. Ties keep the
/// order in which each original was first referenced during the scan.
pub fn top_k(store: &mut TweetStore, k: usize, now: i64, window: WindowDuration) -> Vec<TopKEntry> {
    store.evict_expired(now, window);

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut discovered: Vec<&str> = Vec::new();

    for record in store.iter() {
        let Some(target) = record.retweet_of_id.as_deref().filter(|id| !id.is_empty()) else {
            continue;
        };
        let count = counts.entry(target).or_insert_with(|| {
            discovered.push(target);
            0
        });
        *count += 1;
    }

    let mut ranked: Vec<TopKEntry> = discovered
        .into_iter()
        .map(|id| TopKEntry {
            original_id: id.to_string(),
            count: counts[id],
        })
        .collect();

    // Stable: equal counts stay in discovery order
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(k);
    ranked
}

/// One rendered line of the ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub original_id: String,
    pub count: usize,
    pub snippet: String,
}

/// Ranking plus the context a renderer needs, captured at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboard {
    pub generated_at: i64,
    pub window_minutes: u64,
    pub live_records: usize,
    pub live_retweets: usize,
    pub rows: Vec<LeaderboardRow>,
}

impl Leaderboard {
    /// Run `top_k` and resolve snippets in one pass over the store.
    pub fn build(store: &mut TweetStore, k: usize, now: i64, window: WindowDuration) -> Self {
        let entries = top_k(store, k, now, window);

        let rows = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| LeaderboardRow {
                rank: i + 1,
                snippet: store.snippet(&entry.original_id).unwrap_or_default(),
                original_id: entry.original_id,
                count: entry.count,
            })
            .collect();

        Self {
            generated_at: now,
            window_minutes: window.minutes(),
            live_records: store.len(),
            live_retweets: store.retweet_count(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TweetRecord;

    const NOW: i64 = 1_704_067_230;

    fn window(minutes: u64) -> WindowDuration {
        WindowDuration::from_minutes(minutes).unwrap()
    }

    fn store() -> TweetStore {
        TweetStore::new_with_timestamp_fn(Box::new(|| NOW))
    }

    fn add_retweets(store: &mut TweetStore, target: &str, count: usize, created_at: i64) {
        for i in 0..count {
            store.upsert(TweetRecord {
                id: format!("rt-{}-{}", target, i),
                text_snippet: String::new(),
                created_at,
                retweet_of_id: Some(target.to_string()),
            });
        }
        store.upsert(TweetRecord {
            id: target.to_string(),
            text_snippet: format!("text of {}", target),
            created_at,
            retweet_of_id: None,
        });
    }

    fn pairs(entries: &[TopKEntry]) -> Vec<(&str, usize)> {
        entries.iter().map(|e| (e.original_id.as_str(), e.count)).collect()
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let mut store = store();
        add_retweets(&mut store, "A", 5, NOW);
        add_retweets(&mut store, "B", 5, NOW);
        add_retweets(&mut store, "C", 3, NOW);

        let top = top_k(&mut store, 2, NOW, window(5));
        assert_eq!(pairs(&top), vec![("A", 5), ("B", 5)]);
    }

    #[test]
    fn test_higher_count_wins_over_discovery() {
        let mut store = store();
        add_retweets(&mut store, "C", 3, NOW);
        add_retweets(&mut store, "A", 5, NOW);

        let top = top_k(&mut store, 10, NOW, window(5));
        assert_eq!(pairs(&top), vec![("A", 5), ("C", 3)]);
    }

    #[test]
    fn test_fewer_than_k_returns_all() {
        let mut store = store();
        add_retweets(&mut store, "A", 1, NOW);

        assert_eq!(top_k(&mut store, 10, NOW, window(5)).len(), 1);
        assert!(top_k(&mut store, 0, NOW, window(5)).is_empty());
    }

    #[test]
    fn test_window_excludes_expired_retweets() {
        let mut store = store();
        add_retweets(&mut store, "stale", 2, NOW - 6 * 60);
        add_retweets(&mut store, "fresh", 1, NOW - 4 * 60);

        let top = top_k(&mut store, 10, NOW, window(5));
        assert_eq!(pairs(&top), vec![("fresh", 1)]);
        assert!(store.get("stale").is_none());
        assert!(store.get("rt-stale-0").is_none());
    }

    #[test]
    fn test_originals_alone_are_not_ranked() {
        let mut store = store();
        store.upsert(TweetRecord {
            id: "lonely".to_string(),
            text_snippet: "no retweets".to_string(),
            created_at: NOW,
            retweet_of_id: None,
        });

        assert!(top_k(&mut store, 10, NOW, window(5)).is_empty());
    }

    #[test]
    fn test_leaderboard_rows() {
        let mut store = store();
        add_retweets(&mut store, "A", 2, NOW);
        add_retweets(&mut store, "B", 1, NOW);

        let board = Leaderboard::build(&mut store, 10, NOW, window(5));
        assert_eq!(board.rows.len(), 2);
        assert_eq!(board.rows[0].rank, 1);
        assert_eq!(board.rows[0].snippet, "text of A");
        assert_eq!(board.rows[1].original_id, "B");
        assert_eq!(board.live_records, 5);
        assert_eq!(board.live_retweets, 3);
        assert_eq!(board.window_minutes, 5);
    }
}
