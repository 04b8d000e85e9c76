//! Spoken arithmetic parsing
//!
//! Turns a speech transcript into an `ArithmeticExpression`. Stages run in a
//! fixed order and the first one that produces an expression wins:
//!
//! 1. Symbolic fast path (`7 x 8`, `6/3`, `2*4`)
//! 2. Normalization of symbols and punctuation
//! 3. Operator phrase families (Add, Sub, Mul, Div), longest phrase first
//! 4. Single-token fallback
//!
//! The parser is a pure function of its input.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::error::ParseFailure;
use crate::speech::numbers::NumberWordDecoder;
use crate::types::{ArithmeticExpression, OperatorKind};

/// Operator phrase families in priority order
const PHRASE_FAMILIES: &[(OperatorKind, &[&str])] = &[
    (OperatorKind::Add, &["plus", "add", "added to"]),
    (OperatorKind::Sub, &["minus", "subtract", "less"]),
    (OperatorKind::Mul, &["times", "multiply", "multiplied by", "into"]),
    (OperatorKind::Div, &["divided by", "over", "divide", "by"]),
];

/// Tokens recognized by the fallback scan, grouped by operator
const TOKEN_GROUPS: &[(OperatorKind, &[&str])] = &[
    (OperatorKind::Add, &["plus", "+", "add"]),
    (OperatorKind::Sub, &["minus", "-", "subtract"]),
    (OperatorKind::Mul, &["times", "*", "multiplied"]),
    (OperatorKind::Div, &["divided", "/", "over", "by"]),
];

fn trailing_punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.?!]+$").expect("valid punctuation pattern"))
}

fn symbolic_expression() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(-?\d+(?:\.\d+)?)\s*([×∗*x/])\s*(-?\d+(?:\.\d+)?)")
            .expect("valid symbolic pattern")
    })
}

fn digit_flanked_x() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d+)\s*x\s+(\d+)\b").expect("valid x pattern"))
}

fn disallowed_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9\s.\-]").expect("valid charset pattern"))
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

/// Whole-word matchers for every phrase, longest first within each family
fn phrase_matchers() -> &'static [(OperatorKind, Vec<(&'static str, Regex)>)] {
    static MATCHERS: OnceLock<Vec<(OperatorKind, Vec<(&'static str, Regex)>)>> = OnceLock::new();
    MATCHERS.get_or_init(|| {
        PHRASE_FAMILIES
            .iter()
            .map(|(op, phrases)| {
                let mut sorted: Vec<&'static str> = phrases.to_vec();
                // Stable sort keeps declaration order among equal lengths
                sorted.sort_by(|a, b| b.len().cmp(&a.len()));
                let matchers = sorted
                    .into_iter()
                    .map(|phrase| {
                        let pattern = format!(r"\b{}\b", regex::escape(phrase));
                        (phrase, Regex::new(&pattern).expect("valid phrase pattern"))
                    })
                    .collect();
                (*op, matchers)
            })
            .collect()
    })
}

/// Parser for spoken arithmetic
pub struct ExpressionParser;

impl ExpressionParser {
    /// Parse a transcript into an arithmetic expression
    pub fn parse(transcript: &str) -> Result<ArithmeticExpression, ParseFailure> {
        let lowered = transcript.trim().to_lowercase();
        let cleaned = trailing_punctuation().replace(&lowered, "");
        let cleaned = cleaned.trim();

        if cleaned.is_empty() {
            return Err(ParseFailure::EmptyInput);
        }

        if let Some(expr) = symbolic_fast_path(cleaned) {
            debug!(%expr, "parsed via symbolic fast path");
            return Ok(expr);
        }

        let normalized = Self::normalize(cleaned);
        if normalized.is_empty() {
            return Err(ParseFailure::EmptyInput);
        }

        // Remember the first operator we saw so the failure can name it
        let mut first_operator: Option<OperatorKind> = None;

        match scan_phrase_families(&normalized, &mut first_operator) {
            Some(expr) => {
                debug!(%expr, "parsed via operator phrase");
                return Ok(expr);
            }
            None => debug!(text = %normalized, "no operator phrase produced an expression"),
        }

        match scan_tokens(&normalized) {
            TokenScan::Parsed(expr) => {
                debug!(%expr, "parsed via token fallback");
                Ok(expr)
            }
            TokenScan::Undecodable(op) => Err(ParseFailure::UndecodableOperands {
                operator: first_operator.unwrap_or(op),
            }),
            TokenScan::NoOperator => match first_operator {
                Some(operator) => Err(ParseFailure::UndecodableOperands { operator }),
                None => Err(ParseFailure::NoOperator),
            },
        }
    }

    /// Canonicalize symbols and strip everything the decoder cannot use.
    ///
    /// Expects lower-cased input with trailing punctuation already removed.
    pub fn normalize(text: &str) -> String {
        let replaced = text
            .replace('×', " times ")
            .replace('∗', " times ")
            .replace('*', " times ")
            .replace('/', " divided by ");
        let replaced = digit_flanked_x().replace_all(&replaced, "$1 times $2");
        let stripped = disallowed_chars().replace_all(&replaced, " ");
        whitespace().replace_all(&stripped, " ").trim().to_string()
    }
}

fn symbolic_fast_path(text: &str) -> Option<ArithmeticExpression> {
    let caps = symbolic_expression().captures(text)?;
    let literal = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    };
    let left = literal(1)?;
    let right = literal(3)?;
    let op = match caps.get(2)?.as_str() {
        "×" | "∗" | "*" | "x" => OperatorKind::Mul,
        "/" => OperatorKind::Div,
        _ => return None,
    };
    Some(ArithmeticExpression::new(left, op, right))
}

fn scan_phrase_families(
    text: &str,
    first_operator: &mut Option<OperatorKind>,
) -> Option<ArithmeticExpression> {
    for (op, matchers) in phrase_matchers() {
        for (phrase, matcher) in matchers {
            let Some(m) = matcher.find(text) else {
                continue;
            };
            first_operator.get_or_insert(*op);

            let left = text[..m.start()].trim();
            let right = text[m.end()..].trim();

            match (NumberWordDecoder::decode(left), NumberWordDecoder::decode(right)) {
                (Ok(l), Ok(r)) => return Some(ArithmeticExpression::new(l, *op, r)),
                (l, r) => {
                    debug!(
                        phrase,
                        left_ok = l.is_ok(),
                        right_ok = r.is_ok(),
                        "operator phrase matched but operands did not decode"
                    );
                }
            }
        }
    }
    None
}

enum TokenScan {
    Parsed(ArithmeticExpression),
    Undecodable(OperatorKind),
    NoOperator,
}

fn token_operator(token: &str) -> Option<OperatorKind> {
    TOKEN_GROUPS
        .iter()
        .find(|(_, tokens)| tokens.contains(&token))
        .map(|(op, _)| *op)
}

fn scan_tokens(text: &str) -> TokenScan {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let Some((idx, op)) = tokens
        .iter()
        .enumerate()
        .find_map(|(i, t)| token_operator(t).map(|op| (i, op)))
    else {
        return TokenScan::NoOperator;
    };

    let left = tokens[..idx].join(" ");
    let right = tokens[idx + 1..].join(" ");

    match (NumberWordDecoder::decode(&left), NumberWordDecoder::decode(&right)) {
        (Ok(l), Ok(r)) => TokenScan::Parsed(ArithmeticExpression::new(l, op, r)),
        _ => TokenScan::Undecodable(op),
    }
}
