//! Dependency rules proposing emotion/cause candidate pairs.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::nlp::tree::{Node, PosTag, Sentence};

static MODALS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["may", "might", "could", "should", "would", "will"].into());

static NEGATORS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["don't", "doesn't", "didn't", "won't", "not", "no", "isn't"].into());

/// Which structural rule produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    VerbWithModalParent,
    VerbDirectObject,
    AdjectiveWithComplement,
    AdjectiveVerbParent,
}

impl RuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VerbWithModalParent => "verb-with-modal-parent",
            Self::VerbDirectObject => "verb-direct-object",
            Self::AdjectiveWithComplement => "adjective-with-complement",
            Self::AdjectiveVerbParent => "adjective-verb-parent",
        }
    }
}

/// An emotion phrase paired with a proposed cause phrase, both as token indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub sentence_id: usize,
    pub emotion_span: Vec<usize>,
    pub cause_span: Vec<usize>,
    pub rule: RuleKind,
}

/// Result of applying the rule set to one emotion node.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    NoMatch,
    Single(Candidate),
    Two(Candidate, Candidate),
}

impl RuleOutcome {
    fn from_parts(primary: Option<Candidate>, secondary: Option<Candidate>) -> Self {
        match (primary, secondary) {
            (Some(first), Some(second)) => Self::Two(first, second),
            (Some(only), None) | (None, Some(only)) => Self::Single(only),
            (None, None) => Self::NoMatch,
        }
    }

    pub fn into_candidates(self) -> Vec<Candidate> {
        match self {
            Self::NoMatch => Vec::new(),
            Self::Single(only) => vec![only],
            Self::Two(first, second) => vec![first, second],
        }
    }
}

/// How many candidates a firing rule may contribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CandidatePolicy {
    /// Keep both the primary and the secondary phrase of the verb rules.
    #[default]
    All,
    /// Keep only the primary phrase; secondary-only matches are dropped.
    PrimaryOnly,
}

/// Applies the ordered rule set to emotion nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleExtractor {
    policy: CandidatePolicy,
}

impl RuleExtractor {
    pub fn new(policy: CandidatePolicy) -> Self {
        Self { policy }
    }

    /// Classify the configuration around `emotion` and extract cause phrases.
    pub fn apply(&self, sentence: &Sentence, emotion: &Node) -> RuleOutcome {
        let span = emotion_span(sentence, emotion);
        let make = |cause: Option<Vec<usize>>, rule: RuleKind| {
            cause.map(|cause_span| Candidate {
                sentence_id: sentence.id,
                emotion_span: span.clone(),
                cause_span,
                rule,
            })
        };

        if emotion.pos.is_verb_like() && emotion.has_children() {
            return match sentence.parent_of(emotion).filter(|p| is_modal(p)) {
                Some(modal) => self.outcome(
                    make(
                        strip_prepositions(sentence, left_dependents(sentence, modal)),
                        RuleKind::VerbWithModalParent,
                    ),
                    make(
                        strip_prepositions(sentence, right_dependents(sentence, emotion)),
                        RuleKind::VerbDirectObject,
                    ),
                ),
                None => self.outcome(
                    make(
                        strip_prepositions(sentence, right_dependents(sentence, emotion)),
                        RuleKind::VerbDirectObject,
                    ),
                    make(
                        strip_prepositions(sentence, left_dependents(sentence, emotion)),
                        RuleKind::VerbDirectObject,
                    ),
                ),
            };
        }

        if emotion.pos.is_adjective() {
            if emotion.has_children() {
                let cause = strip_prepositions(sentence, right_dependents(sentence, emotion));
                return self.outcome(make(cause, RuleKind::AdjectiveWithComplement), None);
            }
            if let Some(parent) = sentence
                .parent_of(emotion)
                .filter(|p| p.pos.is_verb_like())
            {
                // The first right dependent of the linking verb is the adjective's
                // slot; at least two more are needed to form a cause phrase.
                let rhs = right_dependents(sentence, parent);
                if rhs.len() <= 2 {
                    return RuleOutcome::NoMatch;
                }
                let cause = strip_prepositions(sentence, rhs.into_iter().skip(1).collect());
                return self.outcome(make(cause, RuleKind::AdjectiveVerbParent), None);
            }
        }

        RuleOutcome::NoMatch
    }

    fn outcome(&self, primary: Option<Candidate>, secondary: Option<Candidate>) -> RuleOutcome {
        match self.policy {
            CandidatePolicy::All => RuleOutcome::from_parts(primary, secondary),
            CandidatePolicy::PrimaryOnly => RuleOutcome::from_parts(primary, None),
        }
    }

    /// Run the rules over every emotion node of every sentence.
    ///
    /// The result is stable-sorted by emotion span text so runs are reproducible.
    pub fn build_candidate_list(&self, sentences: &[Sentence]) -> Vec<Candidate> {
        let mut keyed: Vec<(String, Candidate)> = Vec::new();
        for sentence in sentences {
            for &index in &sentence.emotion_nodes {
                let Some(node) = sentence.node(index) else {
                    continue;
                };
                for candidate in self.apply(sentence, node).into_candidates() {
                    keyed.push((sentence.normalized(&candidate.emotion_span), candidate));
                }
            }
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        debug!(count = keyed.len(), "built candidate list");
        keyed.into_iter().map(|(_, candidate)| candidate).collect()
    }
}

fn is_modal(node: &Node) -> bool {
    node.pos.is_verb_like() && MODALS.contains(node.lower.as_str())
}

fn is_negator(node: &Node) -> bool {
    NEGATORS.contains(node.lower.as_str())
}

/// Widen the emotion token to cover a preceding negator or intensifier.
///
/// Captures "not afraid", "so excited", "won't be happy" and "don't really like".
pub fn emotion_span(sentence: &Sentence, emotion: &Node) -> Vec<usize> {
    let index = emotion.index;
    let prev = index.checked_sub(1).and_then(|i| sentence.node(i));
    let prev_prev = index.checked_sub(2).and_then(|i| sentence.node(i));

    let mut span = vec![index];
    if let Some(prev) = prev {
        if is_negator(prev) || prev.pos.is_adverb() {
            span.insert(0, prev.index);
        }
        if let Some(prev_prev) = prev_prev {
            if is_negator(prev_prev) && (prev.pos.is_adverb() || prev.pos == PosTag::Verb) {
                span = vec![prev_prev.index, prev.index, index];
            }
        }
    }
    span
}

/// All descendants of `anchor`, sorted by token index.
pub fn dependents(sentence: &Sentence, anchor: &Node) -> Vec<usize> {
    let mut visited = HashSet::new();
    let mut stack: Vec<usize> = anchor.children.clone();
    let mut out = Vec::new();
    while let Some(index) = stack.pop() {
        if index == anchor.index || !visited.insert(index) {
            continue;
        }
        out.push(index);
        if let Some(node) = sentence.node(index) {
            stack.extend(node.children.iter().copied());
        }
    }
    out.sort_unstable();
    out
}

pub fn left_dependents(sentence: &Sentence, anchor: &Node) -> Vec<usize> {
    dependents(sentence, anchor)
        .into_iter()
        .filter(|&i| i < anchor.index)
        .collect()
}

pub fn right_dependents(sentence: &Sentence, anchor: &Node) -> Vec<usize> {
    dependents(sentence, anchor)
        .into_iter()
        .filter(|&i| i > anchor.index)
        .collect()
}

/// Drop leading preposition/conjunction tokens; `None` when nothing remains.
pub fn strip_prepositions(sentence: &Sentence, phrase: Vec<usize>) -> Option<Vec<usize>> {
    let start = phrase
        .iter()
        .position(|&i| {
            sentence
                .node(i)
                .map_or(true, |node| !node.pos.is_preposition_or_conjunction())
        })?;
    Some(phrase[start..].to_vec())
}
