//! Spoken number decoding
//!
//! Converts phrases such as "one hundred twenty three", "one point five" or a
//! plain literal like "-4.5" into a number. Decoding is all-or-nothing: one
//! unknown token anywhere fails the whole phrase.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::DecodeError;

/// Separator word for decimals spoken as words
const POINT_WORD: &str = "point";

/// Filler word ignored inside cardinal compounds
const AND_WORD: &str = "and";

fn numeric_literal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("valid literal pattern"))
}

fn separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[,\s]+").expect("valid separator pattern"))
}

/// Value of a known number word
pub fn word_value(word: &str) -> Option<f64> {
    let value = match word {
        "zero" => 0.0,
        "one" => 1.0,
        "two" => 2.0,
        "three" => 3.0,
        "four" => 4.0,
        "five" => 5.0,
        "six" => 6.0,
        "seven" => 7.0,
        "eight" => 8.0,
        "nine" => 9.0,
        "ten" => 10.0,
        "eleven" => 11.0,
        "twelve" => 12.0,
        "thirteen" => 13.0,
        "fourteen" => 14.0,
        "fifteen" => 15.0,
        "sixteen" => 16.0,
        "seventeen" => 17.0,
        "eighteen" => 18.0,
        "nineteen" => 19.0,
        "twenty" => 20.0,
        "thirty" => 30.0,
        "forty" => 40.0,
        "fifty" => 50.0,
        "sixty" => 60.0,
        "seventy" => 70.0,
        "eighty" => 80.0,
        "ninety" => 90.0,
        "hundred" => 100.0,
        "thousand" => 1000.0,
        _ => return None,
    };
    Some(value)
}

/// Whether a word scales the running value instead of adding to it
fn is_multiplier(word: &str) -> bool {
    matches!(word, "hundred" | "thousand")
}

/// Decoder for spoken numbers
pub struct NumberWordDecoder;

impl NumberWordDecoder {
    /// Decode a phrase into a number
    pub fn decode(text: &str) -> Result<f64, DecodeError> {
        let lowered = text.trim().to_lowercase();
        let normalized = separators().replace_all(&lowered, " ");
        let normalized = normalized.trim();

        if normalized.is_empty() {
            return Err(DecodeError::Empty);
        }

        if numeric_literal().is_match(normalized) {
            return parse_literal(normalized);
        }

        let tokens: Vec<&str> = normalized.split(' ').collect();

        match tokens.iter().position(|t| *t == POINT_WORD) {
            Some(idx) => decode_decimal(&tokens[..idx], &tokens[idx + 1..]),
            None => decode_cardinal(&tokens),
        }
    }
}

fn parse_literal(token: &str) -> Result<f64, DecodeError> {
    let value = token
        .parse::<f64>()
        .map_err(|_| DecodeError::UnknownToken(token.to_string()))?;
    finite(value, token)
}

/// Reject values that overflowed to infinity
fn finite(value: f64, source: &str) -> Result<f64, DecodeError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DecodeError::OutOfRange(source.to_string()))
    }
}

/// "<integer words> point <digit> <digit> ..."
fn decode_decimal(integer: &[&str], fraction: &[&str]) -> Result<f64, DecodeError> {
    let integer_part = NumberWordDecoder::decode(&integer.join(" "))?;

    if fraction.is_empty() {
        return Err(DecodeError::InvalidFraction(String::new()));
    }

    let mut digits = String::with_capacity(fraction.len());
    for token in fraction {
        digits.push(fraction_digit(token)?);
    }

    // Concatenate textually so "one point zero five" keeps its leading zero
    let literal = format!("{}.{}", integer_part, digits);
    let value = literal
        .parse::<f64>()
        .map_err(|_| DecodeError::InvalidFraction(literal.clone()))?;
    finite(value, &literal)
}

fn fraction_digit(token: &str) -> Result<char, DecodeError> {
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_digit() {
            return Ok(c);
        }
    }

    match word_value(token) {
        Some(v) if v <= 9.0 => char::from_digit(v as u32, 10)
            .ok_or_else(|| DecodeError::InvalidFraction(token.to_string())),
        _ => Err(DecodeError::InvalidFraction(token.to_string())),
    }
}

/// "one hundred and twenty three" style compounds.
///
/// Multipliers scale everything accumulated so far; there is no separate
/// flushed total, so "two thousand three hundred" reads as (2000 + 3) * 100.
fn decode_cardinal(tokens: &[&str]) -> Result<f64, DecodeError> {
    let mut current = 0.0;

    for &token in tokens {
        if numeric_literal().is_match(token) {
            current += parse_literal(token)?;
        } else if let Some(value) = word_value(token) {
            if is_multiplier(token) {
                if current == 0.0 {
                    current = 1.0;
                }
                current *= value;
            } else {
                current += value;
            }
        } else if token == AND_WORD {
            continue;
        } else {
            return Err(DecodeError::UnknownToken(token.to_string()));
        }
    }

    finite(current, &tokens.join(" "))
}
