//! Stopword policy for location-text features.
//!
//! Besides a generic English list, the domain list covers filler words
//! that dominate free-text profile locations without carrying any
//! regional signal. Region codes get special treatment: a two-letter
//! token that is a recognized region code is always kept, even when the
//! same token appears in the generic list ("in", "or", "me" are both
//! stopwords and state codes). To avoid accidental double suppression,
//! region codes are subtracted from the stopword set when the policy is
//! built, not checked at query time.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Generic English stop words.
const GENERIC_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "me", "my", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with", "you", "your",
];

/// Domain filler words common in free-text profile locations.
const DOMAIN_STOP_WORDS: &[&str] = &[
    "city", "town", "state", "county", "area", "near", "between", "downtown", "uptown", "north",
    "south", "east", "west", "home", "house", "world", "earth", "everywhere", "somewhere",
    "nowhere", "planet", "moon", "internet", "online", "born", "raised", "living", "live", "via",
    "from",
];

/// Recognized region codes: US state codes plus common country markers.
const REGION_CODES: &[&str] = &[
    "al", "ak", "az", "ar", "ca", "co", "ct", "dc", "de", "fl", "ga", "hi", "ia", "id", "il",
    "in", "ks", "ky", "la", "ma", "md", "me", "mi", "mn", "mo", "ms", "mt", "nc", "nd", "ne",
    "nh", "nj", "nm", "nv", "ny", "oh", "ok", "or", "pa", "ri", "sc", "sd", "tn", "tx", "ut",
    "va", "vt", "wa", "wi", "wv", "wy", "uk", "us", "usa",
];

static DEFAULT_POLICY: LazyLock<StopwordPolicy> = LazyLock::new(StopwordPolicy::new);

/// Decides which location-text tokens survive into the feature
/// vocabulary.
#[derive(Debug, Clone)]
pub struct StopwordPolicy {
    stop_words: HashSet<&'static str>,
    region_codes: HashSet<&'static str>,
}

impl StopwordPolicy {
    /// Build the default policy: generic + domain stopwords, with region
    /// codes removed from the combined set.
    pub fn new() -> Self {
        let region_codes: HashSet<&'static str> = REGION_CODES.iter().copied().collect();
        let stop_words = GENERIC_STOP_WORDS
            .iter()
            .chain(DOMAIN_STOP_WORDS)
            .copied()
            .filter(|w| !region_codes.contains(w))
            .collect();

        StopwordPolicy {
            stop_words,
            region_codes,
        }
    }

    /// The process-wide default policy, built once.
    pub fn default_policy() -> &'static StopwordPolicy {
        &DEFAULT_POLICY
    }

    /// Whether a token survives into the vocabulary.
    ///
    /// Single-character tokens are dropped; two-character tokens are
    /// dropped unless they are recognized region codes; everything else
    /// is kept unless it is a stopword.
    pub fn keep(&self, token: &str) -> bool {
        if self.region_codes.contains(token) {
            return true;
        }

        match token.chars().count() {
            0 | 1 | 2 => false,
            _ => !self.stop_words.contains(token),
        }
    }

    /// Whether a token is a recognized region code.
    pub fn is_region_code(&self, token: &str) -> bool {
        self.region_codes.contains(token)
    }
}

impl Default for StopwordPolicy {
    fn default() -> Self {
        StopwordPolicy::new()
    }
}
