//! Expression evaluation

use crate::types::{ArithmeticExpression, EvaluationOutcome, OperatorKind};

/// Evaluator for parsed arithmetic expressions
pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    /// Apply the operator to both operands.
    ///
    /// Division by an exact zero yields `DivisionByZero` rather than an
    /// infinite or NaN value.
    pub fn evaluate(expr: &ArithmeticExpression) -> EvaluationOutcome {
        let value = match expr.op {
            OperatorKind::Add => expr.left + expr.right,
            OperatorKind::Sub => expr.left - expr.right,
            OperatorKind::Mul => expr.left * expr.right,
            OperatorKind::Div => {
                if expr.right == 0.0 {
                    return EvaluationOutcome::DivisionByZero;
                }
                expr.left / expr.right
            }
        };
        EvaluationOutcome::Value { value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(left: f64, op: OperatorKind, right: f64) -> EvaluationOutcome {
        ExpressionEvaluator::evaluate(&ArithmeticExpression::new(left, op, right))
    }

    #[test]
    fn test_basic_operators() {
        assert_eq!(eval(12.0, OperatorKind::Add, 5.0).value(), Some(17.0));
        assert_eq!(eval(19.0, OperatorKind::Sub, 3.0).value(), Some(16.0));
        assert_eq!(eval(7.0, OperatorKind::Mul, 8.0).value(), Some(56.0));
        assert_eq!(eval(100.0, OperatorKind::Div, 4.0).value(), Some(25.0));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval(5.0, OperatorKind::Div, 0.0), EvaluationOutcome::DivisionByZero);
        assert_eq!(eval(5.0, OperatorKind::Div, -0.0), EvaluationOutcome::DivisionByZero);
        assert_eq!(eval(0.0, OperatorKind::Div, 0.0), EvaluationOutcome::DivisionByZero);
    }

    #[test]
    fn test_zero_is_only_special_for_division() {
        assert_eq!(eval(5.0, OperatorKind::Mul, 0.0).value(), Some(0.0));
        assert_eq!(eval(0.0, OperatorKind::Div, 5.0).value(), Some(0.0));
    }
}
