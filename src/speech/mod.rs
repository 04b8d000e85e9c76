//! Spoken arithmetic
//!
//! Turns a recognized utterance into a calculator result.
//!
//! Pipeline: Transcript → ExpressionParser → ExpressionEvaluator → EvaluationOutcome

pub mod evaluator;
pub mod numbers;
pub mod parser;
pub mod pipeline;

pub use evaluator::ExpressionEvaluator;
pub use numbers::NumberWordDecoder;
pub use parser::ExpressionParser;
pub use pipeline::{calculate, CalculatorReading};
