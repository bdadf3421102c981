//! Keyword tier matching for rendered transcript lines.

use scanroll_core::KeywordTier;
use std::collections::BTreeMap;

/// Case-insensitive matcher over a feed's ordered keyword tiers.
#[derive(Debug, Clone, Default)]
pub struct KeywordMatcher {
    tiers: Vec<(String, Vec<String>)>,
}

impl KeywordMatcher {
    pub fn new(tiers: &[KeywordTier]) -> Self {
        let tiers = tiers
            .iter()
            .map(|t| (t.name.clone(), t.keywords.iter().map(|k| k.to_lowercase()).collect()))
            .collect();
        Self { tiers }
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Names of every tier with at least one keyword in `text`, in tier order.
    fn matching_tiers<'a>(&'a self, text: &str) -> impl Iterator<Item = &'a str> + 'a {
        let lower = text.to_lowercase();
        self.tiers
            .iter()
            .filter(move |(_, words)| words.iter().any(|w| lower.contains(w.as_str())))
            .map(|(name, _)| name.as_str())
    }

    /// Per-tier count of texts that contain any of the tier's keywords.
    ///
    /// Every configured tier appears in the result, including those with no hits.
    pub fn count_hits<'t>(&self, texts: impl IntoIterator<Item = &'t str>) -> BTreeMap<String, usize> {
        let mut hits: BTreeMap<String, usize> = self.tiers.iter().map(|(name, _)| (name.clone(), 0)).collect();
        for text in texts {
            for name in self.matching_tiers(text) {
                if let Some(count) = hits.get_mut(name) {
                    *count += 1;
                }
            }
        }
        hits
    }
}
