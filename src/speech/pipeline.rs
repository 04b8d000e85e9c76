//! Calculator pipeline orchestration
//!
//! Runs one utterance through parsing and evaluation and packages the result
//! for the surrounding application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::HandsfreeError;
use crate::speech::evaluator::ExpressionEvaluator;
use crate::speech::parser::ExpressionParser;
use crate::types::{ArithmeticExpression, EvaluationOutcome};

/// Hint shown to users when a phrase cannot be parsed
pub const PARSE_FAILURE_HINT: &str =
    "Could not parse arithmetic expression. Try: 'twelve plus five' or '7 times 3'.";

/// Parse and evaluate a transcript in one step.
///
/// # Example
/// ```
/// use handsfree::speech::calculate;
///
/// assert_eq!(calculate("twelve plus five").value(), Some(17.0));
/// ```
pub fn calculate(transcript: &str) -> EvaluationOutcome {
    match ExpressionParser::parse(transcript) {
        Ok(expr) => ExpressionEvaluator::evaluate(&expr),
        Err(reason) => reason.into(),
    }
}

/// One evaluated utterance with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorReading {
    /// Transcript as received from speech recognition
    pub transcript: String,
    /// Parsed expression, when parsing succeeded
    pub expression: Option<ArithmeticExpression>,
    /// Evaluation result
    pub outcome: EvaluationOutcome,
    /// When the reading was produced
    pub computed_at_utc: DateTime<Utc>,
}

impl CalculatorReading {
    /// Evaluate a transcript and record the result
    pub fn from_transcript(transcript: &str) -> Self {
        let (expression, outcome) = match ExpressionParser::parse(transcript) {
            Ok(expr) => (Some(expr), ExpressionEvaluator::evaluate(&expr)),
            Err(reason) => (None, reason.into()),
        };

        debug!(transcript, ?outcome, "calculator reading");

        Self {
            transcript: transcript.to_string(),
            expression,
            outcome,
            computed_at_utc: Utc::now(),
        }
    }

    /// Text suitable for a result panel
    pub fn display(&self) -> String {
        match &self.outcome {
            EvaluationOutcome::Value { value } => format_number(*value),
            EvaluationOutcome::DivisionByZero => "Division by zero".to_string(),
            EvaluationOutcome::ParseFailure { .. } => PARSE_FAILURE_HINT.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, HandsfreeError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Render integral values without a trailing ".0"
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseFailure;
    use crate::types::OperatorKind;

    #[test]
    fn test_calculate_examples() {
        assert_eq!(calculate("twelve plus five").value(), Some(17.0));
        assert_eq!(calculate("7 times 8").value(), Some(56.0));
        assert_eq!(calculate("one hundred divided by four").value(), Some(25.0));
        assert_eq!(calculate("nineteen minus three").value(), Some(16.0));
        assert_eq!(calculate("twenty one plus thirty two").value(), Some(53.0));
        assert_eq!(calculate("one point five times two").value(), Some(3.0));
    }

    #[test]
    fn test_division_by_zero_is_distinct() {
        let outcome = calculate("five divided by zero");
        assert!(outcome.is_division_by_zero());
        assert_eq!(outcome.value(), None);
    }

    #[test]
    fn test_parse_failure_outcome() {
        assert_eq!(
            calculate("hello world"),
            EvaluationOutcome::ParseFailure {
                reason: ParseFailure::NoOperator
            }
        );
    }

    #[test]
    fn test_reading_keeps_expression() {
        let reading = CalculatorReading::from_transcript("Twelve plus five.");
        assert_eq!(
            reading.expression,
            Some(ArithmeticExpression::new(12.0, OperatorKind::Add, 5.0))
        );
        assert_eq!(reading.display(), "17");

        let json: serde_json::Value = serde_json::from_str(&reading.to_json().unwrap()).unwrap();
        assert_eq!(json["transcript"], "Twelve plus five.");
        assert_eq!(json["outcome"]["outcome"], "value");
        assert_eq!(json["expression"]["op"], "add");
    }

    #[test]
    fn test_huge_operands_never_yield_non_finite_values() {
        let huge = "9".repeat(400);
        let outcome = calculate(&format!("{} times 0", huge));
        assert!(matches!(outcome, EvaluationOutcome::ParseFailure { .. }));

        let reading = CalculatorReading::from_transcript(&format!("{} minus {}", huge, huge));
        assert_eq!(reading.expression, None);
        assert_eq!(reading.display(), PARSE_FAILURE_HINT);

        let restored: CalculatorReading =
            serde_json::from_str(&reading.to_json().unwrap()).unwrap();
        assert_eq!(restored, reading);
    }

    #[test]
    fn test_reading_display_messages() {
        assert_eq!(
            CalculatorReading::from_transcript("five over zero").display(),
            "Division by zero"
        );
        assert_eq!(
            CalculatorReading::from_transcript("what time is it").display(),
            PARSE_FAILURE_HINT
        );
        assert_eq!(
            CalculatorReading::from_transcript("one over four").display(),
            "0.25"
        );
    }
}
