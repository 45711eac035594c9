//! Clinical term recognition with negation detection.
//!
//! [`ClinicalTextClassifier`] is the seam for a future NLP back end. The
//! shipped [`KeywordClassifier`] matches lexicon terms on word boundaries,
//! splits text into clauses, and treats a term as negated when a negation cue
//! ("denies", "no", "negative for") precedes it closely in the same clause.
//! Negation carries across a comma only through a list closed by "or", "nor"
//! or "and" ("negative for nausea, vomiting or diarrhea").

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::sanitize::normalize_term;
use crate::config::{ConfigError, TriageConfig};
use crate::models::FindingKind;

/// Sentence punctuation and words that end a negation scope.
static CLAUSE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[.;!?\n]|\b(?:but|however|although|though|except|reports|complains\s+of|presents\s+with|endorses)\b",
    )
    .expect("Invalid clause boundary regex")
});

/// Cues that turn a following symptom into past medical history. Group 1
/// catches the present-illness header, which is not a history cue.
static HISTORY_CUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(history\s+of\s+present\s+illness|hpi)|history\s+of|hx\s+of|h/o|pmh|past\s+medical\s+history|known)\b",
    )
    .expect("Invalid history cue regex")
});

/// Text allowed between two items of one negated list.
static LIST_GAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\s,/]*(?:(?:or|nor|and)[\s,]+)?$").expect("Invalid list gap regex")
});

static LIST_CONNECTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:or|nor|and)\b").expect("Invalid list connector regex")
});

/// Words allowed between a negation cue and the first term it negates.
const NEGATION_WINDOW: usize = 5;

/// A clinical term recognised in text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Canonical lexicon term, normalised.
    pub term: String,
    pub kind: FindingKind,
    pub negated: bool,
    /// Term belongs to the critical symptom set.
    #[serde(default)]
    pub critical: bool,
    /// Byte offset of the match in the classified text.
    pub offset: usize,
}

/// Text classification capability used by the extraction agent.
pub trait ClinicalTextClassifier: Send + Sync {
    /// Findings in text order.
    fn classify(&self, text: &str) -> Vec<Finding>;
}

struct TermPattern {
    term: String,
    kind: FindingKind,
    critical: bool,
    regex: Regex,
}

/// Lexicon-driven classifier built from the triage config.
pub struct KeywordClassifier {
    patterns: Vec<TermPattern>,
    negation: Option<Regex>,
}

impl KeywordClassifier {
    pub fn from_config(config: &TriageConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.symptom_terms(),
            config.history_conditions.iter().map(String::as_str),
            config.negation_cues.iter().map(String::as_str),
        )?
        .with_critical(config.critical_symptoms.iter().map(String::as_str)))
    }

    pub fn new<'a>(
        symptoms: impl IntoIterator<Item = &'a str>,
        conditions: impl IntoIterator<Item = &'a str>,
        negation_cues: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, ConfigError> {
        let mut patterns: Vec<TermPattern> = Vec::new();

        let tagged = symptoms
            .into_iter()
            .map(|t| (t, FindingKind::Symptom))
            .chain(conditions.into_iter().map(|t| (t, FindingKind::Condition)));

        for (raw, kind) in tagged {
            let term = normalize_term(raw);
            if term.is_empty() || patterns.iter().any(|p| p.term == term) {
                continue;
            }
            let regex = Regex::new(&format!(r"(?i)\b{}\b", term_pattern(&term)))
                .map_err(|e| ConfigError::Invalid(format!("lexicon term '{term}': {e}")))?;
            patterns.push(TermPattern {
                term,
                kind,
                critical: false,
                regex,
            });
        }

        let mut cues: Vec<String> = negation_cues
            .into_iter()
            .map(normalize_term)
            .filter(|c| !c.is_empty())
            .collect();
        // Longest first so "negative for" wins over "no"
        cues.sort_by_key(|c| std::cmp::Reverse(c.len()));
        cues.dedup();

        let negation = if cues.is_empty() {
            None
        } else {
            let alternation = cues
                .iter()
                .map(|c| term_pattern(c))
                .collect::<Vec<_>>()
                .join("|");
            Some(
                Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))
                    .map_err(|e| ConfigError::Invalid(format!("negation cues: {e}")))?,
            )
        };

        Ok(Self { patterns, negation })
    }

    /// Mark symptom terms whose findings must never be dropped silently.
    pub fn with_critical<'a>(mut self, terms: impl IntoIterator<Item = &'a str>) -> Self {
        let critical: Vec<String> = terms.into_iter().map(normalize_term).collect();
        for pattern in &mut self.patterns {
            pattern.critical =
                pattern.kind == FindingKind::Symptom && critical.contains(&pattern.term);
        }
        self
    }

    fn classify_clause(&self, clause: &str, base: usize, out: &mut Vec<Finding>) {
        let mut spans: Vec<(usize, usize, &TermPattern)> = self
            .patterns
            .iter()
            .flat_map(|p| p.regex.find_iter(clause).map(move |m| (m.start(), m.end(), p)))
            .collect();

        dedup_overlapping(&mut spans);

        let mut negated = vec![false; spans.len()];
        if let Some(re) = &self.negation {
            for cue in re.find_iter(clause) {
                mark_negation_scope(clause, cue.end(), &spans, &mut negated);
            }
        }
        let history_start = history_scope_start(clause);

        for (i, (start, _, pattern)) in spans.into_iter().enumerate() {
            let in_history = history_start.is_some_and(|end| end <= start);
            let kind = if in_history {
                FindingKind::Condition
            } else {
                pattern.kind
            };
            out.push(Finding {
                term: pattern.term.clone(),
                kind,
                negated: negated[i],
                critical: pattern.critical,
                offset: base + start,
            });
        }
    }
}

impl ClinicalTextClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (offset, clause) in clauses(text) {
            self.classify_clause(clause, offset, &mut findings);
        }
        findings
    }
}

/// Multi-word terms tolerate any run of spaces or hyphens between words.
pub(crate) fn term_pattern(term: &str) -> String {
    term.split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"[\s\-]+")
}

/// Split text at clause boundaries, keeping each clause's byte offset.
fn clauses(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    for m in CLAUSE_BOUNDARY.find_iter(text) {
        if m.start() > start {
            out.push((start, &text[start..m.start()]));
        }
        start = m.end();
    }
    if start < text.len() {
        out.push((start, &text[start..]));
    }
    out
}

/// End of the first history cue in `clause`, skipping the present-illness header.
fn history_scope_start(clause: &str) -> Option<usize> {
    HISTORY_CUE
        .captures_iter(clause)
        .find(|caps| caps.get(1).is_none())
        .and_then(|caps| caps.get(0))
        .map(|m| m.end())
}

/// Negate the first term within [`NEGATION_WINDOW`] words of the cue. Later
/// terms follow it only as items of a list that a connector closes.
fn mark_negation_scope(
    clause: &str,
    cue_end: usize,
    spans: &[(usize, usize, &TermPattern)],
    negated: &mut [bool],
) {
    let Some(first) = spans.iter().position(|(start, _, _)| *start >= cue_end) else {
        return;
    };
    let lead = &clause[cue_end..spans[first].0];
    if lead.contains(',') || lead.split_whitespace().count() > NEGATION_WINDOW {
        return;
    }

    let mut last = first;
    for next in first + 1..spans.len() {
        let Some(gap) = clause.get(spans[next - 1].1..spans[next].0) else {
            break;
        };
        if !LIST_GAP.is_match(gap) {
            break;
        }
        if LIST_CONNECTOR.is_match(gap) {
            last = next;
            break;
        }
    }

    // Without a connector ("no fever, chest pain") only the first term is negated
    negated[first..=last].iter_mut().for_each(|n| *n = true);
}

/// Drop matches fully contained in a longer one ("pain" inside "chest pain").
fn dedup_overlapping(spans: &mut Vec<(usize, usize, &TermPattern)>) {
    spans.sort_by_key(|(start, end, _)| (*start, std::cmp::Reverse(*end)));
    let mut kept: Vec<(usize, usize, &TermPattern)> = Vec::with_capacity(spans.len());
    for span in spans.drain(..) {
        let contained = kept
            .iter()
            .any(|(s, e, _)| span.0 >= *s && span.1 <= *e);
        if !contained {
            kept.push(span);
        }
    }
    *spans = kept;
}
