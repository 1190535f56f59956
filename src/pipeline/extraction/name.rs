use std::sync::LazyLock;

use regex::Regex;

use super::types::{Candidate, NameExtractor};
use super::ExtractionError;

pub const DEFAULT_PHRASE: &str = "Certifica-se que";

/// Words that end the name on Portuguese certificates
/// ("natural de ...", "nascido(a) em ...").
pub const DEFAULT_TRAILING_MARKERS: &[&str] = &["natural", "nascido", "nascida", "nascido(a)"];

static DEFAULT_PHRASE_RE: LazyLock<Regex> =
    LazyLock::new(|| phrase_regex(DEFAULT_PHRASE).expect("valid regex"));

/// Leading run of words separated by horizontal whitespace. A word is
/// letters (accents and combining marks included), may join parts with a
/// hyphen or apostrophe ("Ana-Rita", "D'Almeida") and may end in a gender
/// suffix such as "(a)".
static NAME_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[\p{L}\p{M}]+(?:['\x{2019}-][\p{L}\p{M}]+)*(?:\(\p{L}{1,2}\))?[ \t\x{00A0}]*)+",
    )
    .expect("valid regex")
});

/// Extracts the text that follows an anchor phrase, up to the first
/// character that cannot be part of a name or a trailing marker word.
#[derive(Debug, Clone)]
pub struct PhraseNameExtractor {
    phrase: String,
    pattern: Regex,
    trailing_markers: Vec<String>,
}

impl PhraseNameExtractor {
    pub fn new(phrase: &str, trailing_markers: &[String]) -> Result<Self, ExtractionError> {
        if phrase.trim().is_empty() {
            return Err(ExtractionError::InvalidPattern(
                "anchor phrase is empty".into(),
            ));
        }
        let pattern =
            phrase_regex(phrase).map_err(|e| ExtractionError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            phrase: phrase.trim().to_string(),
            pattern,
            trailing_markers: normalize_markers(trailing_markers.iter().map(String::as_str)),
        })
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Run the extractor and keep the raw page text alongside the name.
    pub fn candidate(&self, page_text: &str) -> Option<Candidate> {
        self.extract(page_text).map(|extracted_name| Candidate {
            raw_text: page_text.to_string(),
            extracted_name,
        })
    }

    /// Words with a gender suffix ("o(a) formando(a) ...") introduce the
    /// name and are skipped; once the name has started one ends it.
    fn clean(&self, line: &str) -> Option<String> {
        let line = line.trim_start_matches(|c: char| c.is_whitespace() || c == ':');
        let prefix = NAME_PREFIX_RE.find(line)?.as_str();

        let mut words: Vec<&str> = Vec::new();
        for word in prefix.split_whitespace() {
            let (base, gendered) = match word.split_once('(') {
                Some((base, _)) => (base, true),
                None => (word, false),
            };
            if self.is_marker(base) {
                break;
            }
            if gendered {
                if words.is_empty() {
                    continue;
                }
                break;
            }
            words.push(word);
        }

        if words.is_empty() {
            None
        } else {
            Some(words.join(" "))
        }
    }

    fn is_marker(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        self.trailing_markers.iter().any(|m| *m == word)
    }
}

impl Default for PhraseNameExtractor {
    /// The "Certifica-se que ..." template.
    fn default() -> Self {
        Self {
            phrase: DEFAULT_PHRASE.to_string(),
            pattern: DEFAULT_PHRASE_RE.clone(),
            trailing_markers: normalize_markers(DEFAULT_TRAILING_MARKERS.iter().copied()),
        }
    }
}

impl NameExtractor for PhraseNameExtractor {
    fn extract(&self, page_text: &str) -> Option<String> {
        let found = self.pattern.find(page_text)?;
        let rest = &page_text[found.end()..];

        let (same_line, following) = match rest.split_once('\n') {
            Some((line, tail)) => (line, tail),
            None => (rest, ""),
        };

        // Text extraction often breaks the line right after the phrase.
        if same_line.trim().is_empty() {
            let next = following.lines().find(|l| !l.trim().is_empty())?;
            return self.clean(next);
        }

        self.clean(same_line)
    }
}

/// Tries each strategy in order and returns the first name found.
#[derive(Default)]
pub struct FirstMatchExtractor {
    strategies: Vec<Box<dyn NameExtractor>>,
}

impl FirstMatchExtractor {
    pub fn new(strategies: Vec<Box<dyn NameExtractor>>) -> Self {
        Self { strategies }
    }

    pub fn push(&mut self, strategy: Box<dyn NameExtractor>) {
        self.strategies.push(strategy);
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl NameExtractor for FirstMatchExtractor {
    fn extract(&self, page_text: &str) -> Option<String> {
        self.strategies.iter().find_map(|s| s.extract(page_text))
    }
}

/// Case-insensitive regex for a phrase whose words may be separated by any
/// run of whitespace.
fn phrase_regex(phrase: &str) -> Result<Regex, regex::Error> {
    let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
    Regex::new(&format!("(?i){}", words.join(r"\s+")))
}

/// Markers are compared word by word, so a marker like "nascido(a)" is
/// reduced to its letters.
fn normalize_markers<'a>(markers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for marker in markers {
        let word: String = marker
            .chars()
            .take_while(|c| c.is_alphabetic())
            .collect::<String>()
            .to_lowercase();
        if !word.is_empty() && !out.contains(&word) {
            out.push(word);
        }
    }
    out
}
