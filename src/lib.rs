//! Handsfree - signal interpretation core for hands-free computer control
//!
//! Handsfree turns the output of upstream recognizers into commands:
//!
//! - **Speech**: a spoken transcript is parsed into a binary arithmetic
//!   expression and evaluated (transcript → ExpressionParser →
//!   ExpressionEvaluator → outcome).
//! - **Vision**: hand or face landmarks are classified into static gestures,
//!   mapped to a smoothed cursor and turned into pointer actions.
//!
//! Everything here is synchronous and free of I/O. Camera capture, speech
//! recognition and OS pointer control live with the caller.

pub mod config;
pub mod error;
pub mod session;
pub mod speech;
pub mod types;
pub mod vision;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::HandsfreeConfig;
pub use error::{DecodeError, HandsfreeError, ParseFailure};
pub use session::{FrameReport, LandmarkFrame, TrackingProcessor};
pub use speech::{calculate, CalculatorReading, ExpressionEvaluator, ExpressionParser, NumberWordDecoder};
pub use types::{
    ArithmeticExpression, CursorState, EvaluationOutcome, GestureLabel, GestureSet, Landmark,
    OperatorKind, Point2D,
};
pub use vision::{advance_cursor, CursorSmoother, GestureClassifier, PointerAction, TrackingMode};

/// Handsfree version embedded in reports and CLI output
pub const HANDSFREE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for emitted payloads
pub const PRODUCER_NAME: &str = "handsfree-core";

/// Parse a spoken arithmetic transcript into an expression
pub fn parse_spoken_arithmetic(text: &str) -> Result<ArithmeticExpression, ParseFailure> {
    ExpressionParser::parse(text)
}

/// Evaluate a parsed expression
pub fn evaluate_expression(expr: &ArithmeticExpression) -> EvaluationOutcome {
    ExpressionEvaluator::evaluate(expr)
}

/// Classify a hand landmark snapshot into every matching gesture
pub fn classify_gesture(landmarks: &[Landmark]) -> GestureSet {
    GestureClassifier::classify(landmarks)
}
