//! Core types for handsfree
//!
//! This module defines the values that flow through both recognition paths:
//! arithmetic expressions and their outcomes on the speech side, landmarks,
//! gesture labels and cursor state on the vision side.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::ParseFailure;

/// Arithmetic operator recognized in a spoken phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Add,
    Sub,
    Mul,
    Div,
}

impl OperatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorKind::Add => "add",
            OperatorKind::Sub => "sub",
            OperatorKind::Mul => "mul",
            OperatorKind::Div => "div",
        }
    }

    /// Conventional arithmetic symbol
    pub fn symbol(&self) -> char {
        match self {
            OperatorKind::Add => '+',
            OperatorKind::Sub => '-',
            OperatorKind::Mul => '*',
            OperatorKind::Div => '/',
        }
    }
}

/// A binary expression produced by a successful parse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArithmeticExpression {
    pub left: f64,
    pub right: f64,
    pub op: OperatorKind,
}

impl ArithmeticExpression {
    pub fn new(left: f64, op: OperatorKind, right: f64) -> Self {
        Self { left, right, op }
    }
}

impl fmt::Display for ArithmeticExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op.symbol(), self.right)
    }
}

/// Result of one parse + evaluate attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EvaluationOutcome {
    Value { value: f64 },
    DivisionByZero,
    ParseFailure { reason: ParseFailure },
}

impl EvaluationOutcome {
    /// Numeric result, if there is one
    pub fn value(&self) -> Option<f64> {
        match self {
            EvaluationOutcome::Value { value } => Some(*value),
            _ => None,
        }
    }

    pub fn is_division_by_zero(&self) -> bool {
        matches!(self, EvaluationOutcome::DivisionByZero)
    }
}

impl From<ParseFailure> for EvaluationOutcome {
    fn from(reason: ParseFailure) -> Self {
        EvaluationOutcome::ParseFailure { reason }
    }
}

/// A point in 2D space (normalized frame units or screen pixels, depending on context)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A single landmark emitted by the upstream hand or face model.
///
/// Coordinates are fractions of frame width/height. `z` is carried for
/// completeness but every computation here ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Discrete hand gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    Pinch,
    OpenPalm,
    Fist,
    Point,
    Peace,
}

impl GestureLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureLabel::Pinch => "pinch",
            GestureLabel::OpenPalm => "open_palm",
            GestureLabel::Fist => "fist",
            GestureLabel::Point => "point",
            GestureLabel::Peace => "peace",
        }
    }
}

/// Every gesture label satisfied by one landmark snapshot.
///
/// Iteration follows declaration order of `GestureLabel`; that order carries
/// no precedence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GestureSet(BTreeSet<GestureLabel>);

impl GestureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: GestureLabel) -> bool {
        self.0.insert(label)
    }

    pub fn contains(&self, label: GestureLabel) -> bool {
        self.0.contains(&label)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = GestureLabel> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<GestureLabel> for GestureSet {
    fn from_iter<I: IntoIterator<Item = GestureLabel>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Cursor position owned by a single tracking session
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CursorState {
    pub position: Point2D,
}

impl CursorState {
    pub fn new(position: Point2D) -> Self {
        Self { position }
    }
}
