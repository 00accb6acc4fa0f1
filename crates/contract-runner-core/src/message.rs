//! Queue message contract checking
//!
//! With no broker to inspect, a message contract is demonstrated from two
//! independent artifacts: the producer's source must build a payload carrying
//! every required key, and the documentation must list every key. Each
//! artifact is read by a [`KeyExtractor`]; a [`KeyPredicate`] decides which
//! keys each artifact has to witness. [`DualSourceInvariant`] pairs them so
//! the same machinery can be pointed at other artifact pairs.
//!
//! Extraction is textual. It relies on the producer building the payload as an
//! object literal; a shared schema artifact would be a stronger source once
//! one exists.

use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::contracts::{QueueCheck, QueueContractSpec, QueueOutcome};

/// Reads the keys one artifact witnesses
pub trait KeyExtractor {
    /// Structural checks that must hold before keys are meaningful
    fn preconditions(&self, text: &str) -> Vec<QueueCheck>;

    /// Keys witnessed by the artifact
    fn extract(&self, text: &str) -> BTreeSet<String>;

    /// Check label for one key
    fn key_label(&self, key: &str) -> String;

    /// Violation detail when a key is not witnessed
    fn missing_detail(&self, key: &str) -> String;
}

/// Decides which keys an artifact must witness
pub trait KeyPredicate {
    fn evaluate(&self, extractor: &dyn KeyExtractor, witnessed: &BTreeSet<String>) -> Vec<QueueCheck>;
}

/// Every listed key must be witnessed, reported in list order
#[derive(Debug, Clone)]
pub struct RequiredKeys(pub Vec<String>);

impl KeyPredicate for RequiredKeys {
    fn evaluate(&self, extractor: &dyn KeyExtractor, witnessed: &BTreeSet<String>) -> Vec<QueueCheck> {
        self.0
            .iter()
            .map(|key| {
                QueueCheck::from_bool(
                    extractor.key_label(key),
                    witnessed.contains(key),
                    extractor.missing_detail(key),
                )
            })
            .collect()
    }
}

/// A fact that must be demonstrable from two artifacts
pub struct DualSourceInvariant<A, B, P> {
    pub primary: A,
    pub secondary: B,
    pub predicate: P,
}

impl<A, B, P> DualSourceInvariant<A, B, P>
where
    A: KeyExtractor,
    B: KeyExtractor,
    P: KeyPredicate,
{
    /// Run preconditions and key checks for both artifacts, primary first
    pub fn check(&self, primary_text: &str, secondary_text: &str) -> Vec<QueueCheck> {
        let mut checks = self.primary.preconditions(primary_text);
        checks.extend(
            self.predicate
                .evaluate(&self.primary, &self.primary.extract(primary_text)),
        );
        checks.extend(self.secondary.preconditions(secondary_text));
        checks.extend(
            self.predicate
                .evaluate(&self.secondary, &self.secondary.extract(secondary_text)),
        );
        checks
    }
}

/// Keys of the payload object literal in producer source
pub struct PayloadLiteralExtractor {
    message_tag: String,
    anchor: Regex,
    source: PathBuf,
}

impl PayloadLiteralExtractor {
    pub fn new(message_tag: impl Into<String>, anchor: Regex, source: impl Into<PathBuf>) -> Self {
        Self {
            message_tag: message_tag.into(),
            anchor,
            source: source.into(),
        }
    }

    fn has_tag(&self, text: &str) -> bool {
        text.contains(&format!("\"{}\"", self.message_tag))
            || text.contains(&format!("'{}'", self.message_tag))
    }

    /// Body of the first `{ ... }` block following an anchor match
    pub fn payload_block<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.anchor
            .find_iter(text)
            .find_map(|m| balanced_block(&text[m.end()..]))
    }
}

impl KeyExtractor for PayloadLiteralExtractor {
    fn preconditions(&self, text: &str) -> Vec<QueueCheck> {
        vec![
            QueueCheck::from_bool(
                format!("{} enqueue present", self.message_tag),
                self.has_tag(text),
                format!("{} does not enqueue {}", self.source.display(), self.message_tag),
            ),
            QueueCheck::from_bool(
                "payload object present",
                self.payload_block(text).is_some(),
                format!(
                    "could not locate {} payload object in {}",
                    self.message_tag,
                    self.source.display()
                ),
            ),
        ]
    }

    fn extract(&self, text: &str) -> BTreeSet<String> {
        self.payload_block(text)
            .map(object_literal_keys)
            .unwrap_or_default()
    }

    fn key_label(&self, key: &str) -> String {
        format!("payload key '{}'", key)
    }

    fn missing_detail(&self, key: &str) -> String {
        format!("queue payload missing key '{}' in {}", key, self.source.display())
    }
}

/// Keys listed as double-quoted strings in documentation
pub struct QuotedKeyExtractor {
    message_tag: String,
    docs: PathBuf,
}

impl QuotedKeyExtractor {
    pub fn new(message_tag: impl Into<String>, docs: impl Into<PathBuf>) -> Self {
        Self {
            message_tag: message_tag.into(),
            docs: docs.into(),
        }
    }
}

impl KeyExtractor for QuotedKeyExtractor {
    fn preconditions(&self, _text: &str) -> Vec<QueueCheck> {
        Vec::new()
    }

    fn extract(&self, text: &str) -> BTreeSet<String> {
        quoted_tokens(text)
    }

    fn key_label(&self, key: &str) -> String {
        format!("docs key '{}'", key)
    }

    fn missing_detail(&self, key: &str) -> String {
        format!(
            "{} missing key '{}' in {} contract",
            self.docs.display(),
            key,
            self.message_tag
        )
    }
}

/// Artifact read failures
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Failed to read {path}: {message}")]
    Artifact { path: PathBuf, message: String },

    #[error("Invalid payload anchor for '{contract}': {message}")]
    Anchor { contract: String, message: String },
}

/// Check a queue contract against in-memory source and documentation text
pub fn check(
    source_text: &str,
    docs_text: &str,
    spec: &QueueContractSpec,
) -> Result<QueueOutcome, MessageError> {
    let anchor = Regex::new(&spec.payload_anchor).map_err(|e| MessageError::Anchor {
        contract: spec.name.clone(),
        message: e.to_string(),
    })?;

    let invariant = DualSourceInvariant {
        primary: PayloadLiteralExtractor::new(&spec.message_tag, anchor, &spec.source),
        secondary: QuotedKeyExtractor::new(&spec.message_tag, &spec.docs),
        predicate: RequiredKeys(spec.required_keys.clone()),
    };

    Ok(QueueOutcome {
        contract: spec.name.clone(),
        producer: spec.producer.clone(),
        consumer: spec.consumer.clone(),
        checks: invariant.check(source_text, docs_text),
    })
}

/// Read the contract's artifacts under `root` and check them
pub fn check_files(spec: &QueueContractSpec, root: &Path) -> Result<QueueOutcome, MessageError> {
    let source = read_artifact(&root.join(&spec.source))?;
    let docs = read_artifact(&root.join(&spec.docs))?;
    check(&source, &docs, spec)
}

fn read_artifact(path: &Path) -> Result<String, MessageError> {
    std::fs::read_to_string(path).map_err(|e| MessageError::Artifact {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Contents between the first `{` (after optional whitespace) and its match
///
/// Braces inside string and template literals and comments are ignored.
fn balanced_block(text: &str) -> Option<&str> {
    let trimmed = text.trim_start();
    let offset = text.len() - trimmed.len();
    if !trimmed.starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    for (i, c, kind) in lexemes(trimmed) {
        if kind != Lexeme::Code {
            continue;
        }
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[offset + 1..offset + i]);
                }
            }
            _ => {}
        }
    }

    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lexeme {
    Code,
    Literal,
    Comment,
}

#[derive(Clone, Copy)]
enum LexState {
    Code,
    Quoted { quote: char, escaped: bool },
    LineComment,
    BlockStart,
    BlockComment { star: bool },
}

/// Classify every char of JS-like source as code, literal or comment
fn lexemes(text: &str) -> Vec<(usize, char, Lexeme)> {
    let mut out = Vec::with_capacity(text.len());
    let mut state = LexState::Code;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let (kind, next) = match state {
            LexState::Code => match c {
                '"' | '\'' | '`' => {
                    (Lexeme::Literal, LexState::Quoted { quote: c, escaped: false })
                }
                '/' => match chars.peek() {
                    Some((_, '/')) => (Lexeme::Comment, LexState::LineComment),
                    Some((_, '*')) => (Lexeme::Comment, LexState::BlockStart),
                    _ => (Lexeme::Code, LexState::Code),
                },
                _ => (Lexeme::Code, LexState::Code),
            },
            LexState::Quoted { quote, escaped } => {
                let next = if escaped {
                    LexState::Quoted { quote, escaped: false }
                } else if c == '\\' {
                    LexState::Quoted { quote, escaped: true }
                } else if c == quote {
                    LexState::Code
                } else {
                    state
                };
                (Lexeme::Literal, next)
            }
            LexState::LineComment if c == '\n' => (Lexeme::Code, LexState::Code),
            LexState::LineComment => (Lexeme::Comment, LexState::LineComment),
            LexState::BlockStart => (Lexeme::Comment, LexState::BlockComment { star: false }),
            LexState::BlockComment { star } => {
                let next = if star && c == '/' {
                    LexState::Code
                } else {
                    LexState::BlockComment { star: c == '*' }
                };
                (Lexeme::Comment, next)
            }
        };
        out.push((i, c, kind));
        state = next;
    }

    out
}

/// Property keys of an object literal body: `key: value` and shorthand `key,`
fn object_literal_keys(block: &str) -> BTreeSet<String> {
    let code: String = lexemes(block)
        .into_iter()
        .map(|(_, c, kind)| if kind == Lexeme::Comment { ' ' } else { c })
        .collect();
    let mut keys = BTreeSet::new();

    for (start, end) in identifiers(&code) {
        let before = code[..start].trim_end().chars().last();
        let after = code[end..].trim_start().chars().next();

        let explicit = after == Some(':') && before != Some('?') && before != Some('.');
        let shorthand = matches!(before, None | Some('{') | Some(','))
            && matches!(after, None | Some(',') | Some('}'));

        if explicit || shorthand {
            keys.insert(code[start..end].to_string());
        }
    }

    keys
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Byte ranges of identifier-like words; words starting with a digit are skipped
fn identifiers(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in text.char_indices() {
        match (start, is_identifier_char(c)) {
            (None, true) => start = Some(i),
            (Some(s), false) => {
                ranges.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        ranges.push((s, text.len()));
    }

    ranges.retain(|&(s, _)| !text[s..].starts_with(|c: char| c.is_ascii_digit()));
    ranges
}

/// Every token enclosed by a pair of consecutive double quotes
fn quoted_tokens(text: &str) -> BTreeSet<String> {
    let quotes: Vec<usize> = text.match_indices('"').map(|(i, _)| i).collect();
    quotes
        .windows(2)
        .map(|pair| &text[pair[0] + 1..pair[1]])
        .filter(|token| !token.is_empty() && !token.contains(char::is_whitespace))
        .map(str::to_string)
        .collect()
}
