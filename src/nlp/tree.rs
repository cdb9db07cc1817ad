//! Dependency tree model for parsed tweets.
//!
//! Nodes live in a per-sentence arena; parent and child links are 1-based token
//! indices into that arena rather than references.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{EmoCauseError, Result};

/// ARK Twitter part-of-speech tags as emitted by tweet dependency parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PosTag {
    CommonNoun,
    Pronoun,
    ProperNoun,
    NominalPossessive,
    ProperNounPossessive,
    Verb,
    NominalVerbal,
    ProperNounVerbal,
    Adjective,
    Adverb,
    Interjection,
    Determiner,
    Preposition,
    CoordinatingConjunction,
    Particle,
    Existential,
    ExistentialVerbal,
    Hashtag,
    Mention,
    Discourse,
    Url,
    Emoticon,
    Numeral,
    Punctuation,
    Other,
}

impl PosTag {
    /// `V` and `L` (nominal + verbal contraction) behave as verbs for the rules.
    pub fn is_verb_like(self) -> bool {
        matches!(self, Self::Verb | Self::NominalVerbal)
    }

    pub fn is_adjective(self) -> bool {
        self == Self::Adjective
    }

    pub fn is_adverb(self) -> bool {
        self == Self::Adverb
    }

    /// Tags stripped from the front of a cause phrase.
    pub fn is_preposition_or_conjunction(self) -> bool {
        matches!(self, Self::Preposition | Self::Adverb | Self::Particle)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CommonNoun => "N",
            Self::Pronoun => "O",
            Self::ProperNoun => "^",
            Self::NominalPossessive => "S",
            Self::ProperNounPossessive => "Z",
            Self::Verb => "V",
            Self::NominalVerbal => "L",
            Self::ProperNounVerbal => "M",
            Self::Adjective => "A",
            Self::Adverb => "R",
            Self::Interjection => "!",
            Self::Determiner => "D",
            Self::Preposition => "P",
            Self::CoordinatingConjunction => "&",
            Self::Particle => "T",
            Self::Existential => "X",
            Self::ExistentialVerbal => "Y",
            Self::Hashtag => "#",
            Self::Mention => "@",
            Self::Discourse => "~",
            Self::Url => "U",
            Self::Emoticon => "E",
            Self::Numeral => "$",
            Self::Punctuation => ",",
            Self::Other => "G",
        }
    }
}

impl FromStr for PosTag {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let tag = match s {
            "N" => Self::CommonNoun,
            "O" => Self::Pronoun,
            "^" => Self::ProperNoun,
            "S" => Self::NominalPossessive,
            "Z" => Self::ProperNounPossessive,
            "V" => Self::Verb,
            "L" => Self::NominalVerbal,
            "M" => Self::ProperNounVerbal,
            "A" => Self::Adjective,
            "R" => Self::Adverb,
            "!" => Self::Interjection,
            "D" => Self::Determiner,
            "P" => Self::Preposition,
            "&" => Self::CoordinatingConjunction,
            "T" => Self::Particle,
            "X" => Self::Existential,
            "Y" => Self::ExistentialVerbal,
            "#" => Self::Hashtag,
            "@" => Self::Mention,
            "~" => Self::Discourse,
            "U" => Self::Url,
            "E" => Self::Emoticon,
            "$" => Self::Numeral,
            "," => Self::Punctuation,
            "G" => Self::Other,
            other => return Err(format!("unknown POS tag {other:?}")),
        };
        Ok(tag)
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tab-separated row of parser output.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRow {
    pub index: usize,
    pub text: String,
    pub pos: PosTag,
    /// `0` marks a root, `-1` a token left out of the tree.
    pub parent: i64,
    pub multiword: bool,
}

impl TokenRow {
    /// Parse `index, text, _, pos, _, _, parent, multiword` columns.
    pub fn parse(line: &str, sentence: usize) -> Result<Self> {
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        if fields.len() < 8 {
            return Err(EmoCauseError::malformed(
                sentence,
                format!("expected 8 columns, got {}: {line:?}", fields.len()),
            ));
        }
        let index: usize = fields[0].trim().parse().map_err(|_| {
            EmoCauseError::malformed(sentence, format!("bad token index {:?}", fields[0]))
        })?;
        let pos = fields[3]
            .trim()
            .parse::<PosTag>()
            .map_err(|reason| EmoCauseError::malformed(sentence, reason))?;
        let parent: i64 = fields[6].trim().parse().map_err(|_| {
            EmoCauseError::malformed(sentence, format!("bad parent index {:?}", fields[6]))
        })?;
        let multiword = matches!(fields[7].trim(), "MW" | "CONJ");
        Ok(Self {
            index,
            text: fields[1].to_string(),
            pos,
            parent,
            multiword,
        })
    }
}

/// A parsed word with its dependency links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub index: usize,
    /// Surface form as written.
    pub text: String,
    /// Lowercased form used for lexicon, seed and embedding lookups.
    pub lower: String,
    pub pos: PosTag,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub multiword: bool,
    pub sentence_id: usize,
}

impl Node {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// One parsed tweet: the node arena plus its surface tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    pub id: usize,
    pub raw_text: String,
    pub tokens: Vec<String>,
    pub nodes: Vec<Node>,
    /// Indices of nodes flagged as emotion-bearing.
    pub emotion_nodes: Vec<usize>,
}

impl Sentence {
    /// Node for a 1-based token index.
    pub fn node(&self, index: usize) -> Option<&Node> {
        index.checked_sub(1).and_then(|i| self.nodes.get(i))
    }

    pub fn parent_of(&self, node: &Node) -> Option<&Node> {
        node.parent.and_then(|p| self.node(p))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Space-joined surface text of the given token indices.
    pub fn surface(&self, indices: &[usize]) -> String {
        join(indices.iter().filter_map(|&i| self.node(i)).map(|n| n.text.as_str()))
    }

    /// Space-joined lowercase text of the given token indices.
    pub fn normalized(&self, indices: &[usize]) -> String {
        join(indices.iter().filter_map(|&i| self.node(i)).map(|n| n.lower.as_str()))
    }

    /// Flag emotion nodes using the supplied membership test.
    pub fn mark_emotions<F>(&mut self, is_emotion: F)
    where
        F: Fn(&Node) -> bool,
    {
        self.emotion_nodes = self
            .nodes
            .iter()
            .filter(|node| is_emotion(node))
            .map(|node| node.index)
            .collect();
    }
}

fn join<'a>(words: impl Iterator<Item = &'a str>) -> String {
    words.collect::<Vec<_>>().join(" ")
}

/// Build a sentence tree from its rows, populating parent and child links.
pub fn assemble(sentence_id: usize, rows: Vec<TokenRow>) -> Result<Sentence> {
    if rows.is_empty() {
        return Err(EmoCauseError::malformed(sentence_id, "sentence has no tokens"));
    }
    let count = rows.len();
    let mut nodes = Vec::with_capacity(count);
    for (position, row) in rows.into_iter().enumerate() {
        if row.index != position + 1 {
            return Err(EmoCauseError::malformed(
                sentence_id,
                format!("token {} found at position {}", row.index, position + 1),
            ));
        }
        let parent = match row.parent {
            0 | -1 => None,
            p if p > 0 && (p as usize) <= count && p as usize != row.index => Some(p as usize),
            p => {
                return Err(EmoCauseError::malformed(
                    sentence_id,
                    format!("token {} has unresolvable parent {p}", row.index),
                ))
            }
        };
        nodes.push(Node {
            index: row.index,
            lower: row.text.to_lowercase(),
            text: row.text,
            pos: row.pos,
            parent,
            children: Vec::new(),
            multiword: row.multiword,
            sentence_id,
        });
    }

    for i in 0..count {
        if let Some(parent) = nodes[i].parent {
            let child = nodes[i].index;
            nodes[parent - 1].children.push(child);
        }
    }

    check_acyclic(sentence_id, &nodes)?;

    let tokens: Vec<String> = nodes.iter().map(|n| n.text.clone()).collect();
    Ok(Sentence {
        id: sentence_id,
        raw_text: tokens.join(" "),
        tokens,
        nodes,
        emotion_nodes: Vec::new(),
    })
}

fn check_acyclic(sentence_id: usize, nodes: &[Node]) -> Result<()> {
    for start in nodes {
        let mut current = start.parent;
        let mut steps = 0;
        while let Some(index) = current {
            steps += 1;
            if steps > nodes.len() {
                return Err(EmoCauseError::malformed(
                    sentence_id,
                    format!("dependency cycle through token {}", start.index),
                ));
            }
            current = nodes[index - 1].parent;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(index: usize, text: &str, pos: &str, parent: i64) -> TokenRow {
        TokenRow {
            index,
            text: text.into(),
            pos: pos.parse().unwrap(),
            parent,
            multiword: false,
        }
    }

    #[test]
    fn parses_tweebo_row() {
        let parsed = TokenRow::parse("3\tBernie\t_\t^\t^\t_\t2\tMW", 0).unwrap();
        assert_eq!(parsed.index, 3);
        assert_eq!(parsed.pos, PosTag::ProperNoun);
        assert_eq!(parsed.parent, 2);
        assert!(parsed.multiword);
    }

    #[test]
    fn requires_multiword_column() {
        let err = TokenRow::parse("1\tlove\t_\tV\t_\t_\t0", 2).unwrap_err();
        assert!(err.is_sentence_local());
        let ok = TokenRow::parse("1\tlove\t_\tV\t_\t_\t0\t", 2).unwrap();
        assert!(!ok.multiword);
    }

    #[test]
    fn rejects_unknown_tag() {
        let err = TokenRow::parse("1\tfoo\t_\tQQ\tQQ\t_\t0\t_", 4).unwrap_err();
        assert!(err.is_sentence_local());
    }

    #[test]
    fn detects_cycles() {
        let rows = vec![row(1, "a", "N", 2), row(2, "b", "V", 1)];
        assert!(assemble(0, rows).is_err());
    }

    #[test]
    fn rejects_self_parent() {
        let rows = vec![row(1, "a", "N", 1)];
        assert!(assemble(0, rows).is_err());
    }
}
