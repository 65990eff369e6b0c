use {
    crate::{decoder::ValidatedTweet, window::WindowDuration},
    std::collections::{BTreeMap, HashMap},
};

/// Characters of tweet text kept for display
pub const SNIPPET_CHARS: usize = 40;

/// Latest known state of one tweet id
#[derive(Debug, Clone, PartialEq)]
pub struct TweetRecord {
    pub id: String,
    pub text_snippet: String,
    /// Unix seconds. For an original this is when its latest retweet was
    /// stored, so it stays live while it keeps being retweeted.
    pub created_at: i64,
    /// Set when this record is a retweet event
    pub retweet_of_id: Option<String>,
}

impl TweetRecord {
    pub fn is_retweet(&self) -> bool {
        self.retweet_of_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Both records of one validated retweet would share an id
#[derive(Debug, Clone, PartialEq)]
pub struct StoreInvariantViolation {
    pub id: String,
}

impl std::fmt::Display for StoreInvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Retweet {} references itself as original", self.id)
    }
}

impl std::error::Error for StoreInvariantViolation {}

#[derive(Debug)]
struct Slot {
    seq: u64,
    record: TweetRecord,
}

/// In-memory store of every tweet id seen within the window
///
/// Iteration follows first-insertion order of ids; overwriting an id keeps
/// its position. Eviction is lazy (see `evict_expired`).
pub struct TweetStore {
    records: HashMap<String, Slot>,
    /// seq -> id, ordered by first insertion
    order: BTreeMap<u64, String>,
    next_seq: u64,
    /// Timestamp function (for testing with mock time)
    now_fn: Box<dyn Fn() -> i64 + Send + Sync>,
}

impl TweetStore {
    pub fn new() -> Self {
        Self::new_with_timestamp_fn(Box::new(crate::current_timestamp))
    }

    /// Store whose "now" for bootstrapped originals comes from `now_fn`
    pub fn new_with_timestamp_fn(now_fn: Box<dyn Fn() -> i64 + Send + Sync>) -> Self {
        Self {
            records: HashMap::new(),
            order: BTreeMap::new(),
            next_seq: 0,
            now_fn,
        }
    }

    /// Insert or overwrite (last write wins, no field merge).
    pub fn upsert(&mut self, record: TweetRecord) {
        match self.records.get_mut(&record.id) {
            Some(slot) => slot.record = record,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.order.insert(seq, record.id.clone());
                self.records.insert(record.id.clone(), Slot { seq, record });
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&TweetRecord> {
        self.records.get(id).map(|slot| &slot.record)
    }

    /// Remove every record that is no longer live in `window`.
    ///
    /// Returns the evicted ids in store order.
    pub fn evict_expired(&mut self, now: i64, window: WindowDuration) -> Vec<String> {
        let expired: Vec<(u64, String)> = self
            .order
            .iter()
            .filter(|(_, id)| {
                self.records
                    .get(id.as_str())
                    .is_some_and(|slot| !window.is_live(slot.record.created_at, now))
            })
            .map(|(seq, id)| (*seq, id.clone()))
            .collect();

        for (seq, id) in &expired {
            self.order.remove(seq);
            self.records.remove(id);
        }

        if !expired.is_empty() {
            log::debug!("Evicted {} expired records ({} remain)", expired.len(), self.records.len());
        }

        expired.into_iter().map(|(_, id)| id).collect()
    }

    /// Store a retweet event and its referenced original.
    ///
    /// Both records are built before either is written, so the pair is
    /// stored together or not at all.
    pub fn add_validated_tweet(&mut self, tweet: ValidatedTweet) -> Result<(), StoreInvariantViolation> {
        if tweet.id == tweet.target.id {
            return Err(StoreInvariantViolation { id: tweet.id });
        }

        let now = (self.now_fn)();

        let retweet = TweetRecord {
            id: tweet.id,
            text_snippet: String::new(),
            created_at: tweet.created_at,
            retweet_of_id: Some(tweet.target.id.clone()),
        };
        let original = TweetRecord {
            id: tweet.target.id,
            text_snippet: truncate_snippet(&tweet.target.text),
            created_at: now,
            retweet_of_id: None,
        };

        self.upsert(retweet);
        self.upsert(original);
        Ok(())
    }

    /// Live records in store order
    pub fn iter(&self) -> impl Iterator<Item = &TweetRecord> + '_ {
        self.order
            .values()
            .filter_map(|id| self.records.get(id.as_str()).map(|slot| &slot.record))
    }

    /// Display text for an id: first `SNIPPET_CHARS` characters, newlines removed
    pub fn snippet(&self, id: &str) -> Option<String> {
        self.get(id)
            .map(|record| record.text_snippet.chars().filter(|c| *c != '\n' && *c != '\r').collect())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of stored retweet events
    pub fn retweet_count(&self) -> usize {
        self.records.values().filter(|slot| slot.record.is_retweet()).count()
    }

    pub fn now(&self) -> i64 {
        (self.now_fn)()
    }
}

impl Default for TweetStore {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate_snippet(text: &str) -> String {
    text.chars().take(SNIPPET_CHARS).collect()
}
