use serde::{Deserialize, Serialize};

use super::similarity::ratio;
use super::MatchError;
use crate::pipeline::roster::{RosterEntry, RosterIndex};

/// Confidence a candidate must strictly exceed to be accepted.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), MatchError> {
        if (0.0..=1.0).contains(&self.threshold) {
            Ok(())
        } else {
            Err(MatchError::InvalidThreshold(self.threshold))
        }
    }
}

/// Outcome of scoring one candidate against the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: bool,
    /// Accepted roster name; `None` unless `matched`.
    pub roster_name: Option<String>,
    /// Best similarity found, accepted or not.
    pub confidence: f64,
    /// Closest roster name even when rejected.
    pub nearest_name: Option<String>,
    /// Accepted entry with its client. Only filled by
    /// [`FuzzyMatcher::evaluate_roster`].
    pub roster_entry: Option<RosterEntry>,
}

impl MatchResult {
    fn unmatched() -> Self {
        Self {
            matched: false,
            roster_name: None,
            confidence: 0.0,
            nearest_name: None,
            roster_entry: None,
        }
    }
}

/// Picks the roster name most similar to a candidate.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    threshold: f64,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl FuzzyMatcher {
    pub fn new(config: &MatchConfig) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self {
            threshold: config.threshold,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score `candidate` against every name. The strictly highest ratio
    /// wins; on exact ties the earlier name is kept.
    pub fn evaluate(&self, candidate: &str, roster_names: &[String]) -> MatchResult {
        match best_scoring(candidate, roster_names.iter().map(String::as_str)) {
            Some((i, confidence)) => self.result(&roster_names[i], confidence),
            None => MatchResult::unmatched(),
        }
    }

    /// Same scoring as [`evaluate`](Self::evaluate), over the roster's
    /// entries, so an accepted match carries its client.
    pub fn evaluate_roster(&self, candidate: &str, roster: &RosterIndex) -> MatchResult {
        let entries = roster.entries();
        let names = entries.iter().map(|e| e.canonical_name.as_str());

        match best_scoring(candidate, names) {
            Some((i, confidence)) => {
                let entry = &entries[i];
                let mut result = self.result(&entry.canonical_name, confidence);
                if result.matched {
                    result.roster_entry = Some(entry.clone());
                }
                result
            }
            None => MatchResult::unmatched(),
        }
    }

    fn result(&self, name: &str, confidence: f64) -> MatchResult {
        let matched = confidence > self.threshold;
        MatchResult {
            matched,
            roster_name: matched.then(|| name.to_string()),
            confidence,
            nearest_name: Some(name.to_string()),
            roster_entry: None,
        }
    }

    /// The accepted roster name, if any.
    pub fn best_match(&self, candidate: &str, roster_names: &[String]) -> Option<String> {
        self.evaluate(candidate, roster_names).roster_name
    }
}

/// Position and score of the highest-scoring name; the first wins ties.
fn best_scoring<'a>(
    candidate: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, name) in names.into_iter().enumerate() {
        let score = ratio(candidate, name);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((i, score));
        }
    }
    best
}
