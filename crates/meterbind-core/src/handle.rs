//! Metric identity: name, kind, and ordered tag set.
//!
//! Identity is `(name, tags)` only: two handles with the same name and tags
//! are the same metric even if their kinds differ, and the registry must not
//! accept both. Tags are kept sorted by key so equality and hashing are
//! deterministic regardless of insertion order.

use std::fmt;

/// What a published metric measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Monotonically increasing value, read live from the resource's counter.
    Counter,
    /// Point-in-time value, read live at scrape time.
    Gauge,
    /// Accumulated call count plus total duration.
    Timer,
    /// Gauge whose value carries a time unit.
    TimeGauge,
}

impl MetricKind {
    /// String form used in rendered output.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Timer => "timer",
            MetricKind::TimeGauge => "time_gauge",
        }
    }
}

/// Ordered set of (key, value) label pairs.
///
/// Construction sorts by key and de-duplicates (last write wins), so two tag
/// sets built in different orders compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TagSet {
    pairs: Vec<(String, String)>,
}

impl TagSet {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Build from any iterator of pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut set = Self::new();
        for (k, v) in pairs {
            set.insert(k.into(), v.into());
        }
        set
    }

    /// Insert one pair, replacing any existing value for the same key.
    pub fn insert(&mut self, key: String, value: String) {
        match self.pairs.binary_search_by(|(k, _)| k.as_str().cmp(&key)) {
            Ok(i) => self.pairs[i].1 = value,
            Err(i) => self.pairs.insert(i, (key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|i| self.pairs[i].1.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.pairs.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

/// Opaque handle identifying one published metric.
///
/// Immutable once created. `Eq`/`Hash`/`Ord` cover `(name, tags)` only; the
/// kind is descriptive metadata and excluded from identity.
#[derive(Debug, Clone)]
pub struct MetricHandle {
    name: String,
    kind: MetricKind,
    tags: TagSet,
}

impl MetricHandle {
    pub fn new(name: impl Into<String>, kind: MetricKind) -> Self {
        Self {
            name: name.into(),
            kind,
            tags: TagSet::new(),
        }
    }

    pub fn counter(name: impl Into<String>) -> Self {
        Self::new(name, MetricKind::Counter)
    }

    pub fn gauge(name: impl Into<String>) -> Self {
        Self::new(name, MetricKind::Gauge)
    }

    pub fn timer(name: impl Into<String>) -> Self {
        Self::new(name, MetricKind::Timer)
    }

    pub fn time_gauge(name: impl Into<String>) -> Self {
        Self::new(name, MetricKind::TimeGauge)
    }

    /// Add one tag (builder style).
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Merge a whole tag set (builder style). Existing keys are overwritten.
    pub fn with_tags(mut self, tags: &TagSet) -> Self {
        for (k, v) in tags.iter() {
            self.tags.insert(k.to_string(), v.to_string());
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }
}

impl PartialEq for MetricHandle {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.tags == other.tags
    }
}

impl Eq for MetricHandle {}

impl std::hash::Hash for MetricHandle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.tags.hash(state);
    }
}

impl PartialOrd for MetricHandle {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MetricHandle {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.tags.pairs.cmp(&other.tags.pairs))
    }
}

impl fmt::Display for MetricHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tags.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}{{{}}}", self.name, self.tags)
        }
    }
}
