/*
 * @file evaluator.rs
 * @brief Left-to-right integer evaluation of the expression buffer
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Left-to-right integer evaluation of the expression buffer.
//!
//! There is no operator precedence: `5 - 2 * 3` is `(5 - 2) * 3`.

use crate::error::{CalcError, CalcResult};
use crate::token::Operator;

/// Evaluates a rendered buffer to a single integer.
///
/// # Details
/// The buffer is split on whitespace. The first part must be a number and
/// seeds the accumulator. Each later operator becomes the pending operator
/// and stays pending until another operator replaces it; each later number
/// is folded into the accumulator with the pending operator. A number seen
/// before any operator overwrites the accumulator. A trailing operator is
/// ignored. Numbers may carry a leading `-` so that a negative result can
/// be chained into the next calculation.
///
/// # Arguments
/// * `expression` - The buffer contents, e.g. `"12 + 3"`.
///
/// # Returns
/// * `Ok(i64)` - The evaluated value.
///
/// # Errors
/// * [`CalcError::MalformedExpression`] - Empty input, an operator first, or
///   a part that is neither a number nor an operator.
/// * [`CalcError::DivisionByZero`] - A `/` whose operand is zero.
/// * [`CalcError::Overflow`] - A literal or result outside the `i64` range.
pub fn evaluate(expression: &str) -> CalcResult<i64> {
    let malformed = || CalcError::MalformedExpression(expression.to_string());
    let mut parts = expression.split_whitespace();
    let first = parts.next().ok_or_else(malformed)?;
    let mut value = parse_number(first, expression)?.ok_or_else(malformed)?;
    let mut pending: Option<Operator> = None;

    for part in parts {
        if let Some(op) = Operator::from_symbol(part) {
            pending = Some(op);
            continue;
        }
        let number = parse_number(part, expression)?.ok_or_else(malformed)?;
        value = match pending {
            None => number,
            Some(op) => combine(value, op, number, expression)?,
        };
    }
    Ok(value)
}

/// Parses one lexical part as a (possibly negative) decimal integer.
///
/// # Returns
/// * `Ok(Some(n))` - The part is numeric and fits in an `i64`.
/// * `Ok(None)` - The part is not numeric at all.
///
/// # Errors
/// [`CalcError::Overflow`] when the digits do not fit in an `i64`.
fn parse_number(part: &str, expression: &str) -> CalcResult<Option<i64>> {
    let digits = part.strip_prefix('-').unwrap_or(part);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    part.parse::<i64>()
        .map(Some)
        .map_err(|_| CalcError::Overflow(expression.to_string()))
}

fn combine(lhs: i64, op: Operator, rhs: i64, expression: &str) -> CalcResult<i64> {
    let overflow = || CalcError::Overflow(expression.to_string());
    match op {
        Operator::Add => lhs.checked_add(rhs).ok_or_else(overflow),
        Operator::Subtract => lhs.checked_sub(rhs).ok_or_else(overflow),
        Operator::Multiply => lhs.checked_mul(rhs).ok_or_else(overflow),
        Operator::Divide if rhs == 0 => Err(CalcError::DivisionByZero),
        // Truncates toward zero.
        Operator::Divide => lhs.checked_div(rhs).ok_or_else(overflow),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_digit_runs_evaluate_to_their_value() {
        for run in ["0", "7", "42", "1234567", "0009"] {
            assert_eq!(evaluate(run), Ok(run.parse::<i64>().unwrap()));
        }
    }

    #[test]
    fn evaluates_strictly_left_to_right() {
        assert_eq!(evaluate("5 - 2 * 3"), Ok(9));
        assert_eq!(evaluate("2 + 3 * 4"), Ok(20));
        assert_eq!(evaluate("1 + 2"), Ok(3));
    }

    #[test]
    fn division_truncates_toward_zero() {
        assert_eq!(evaluate("7 / 2"), Ok(3));
        assert_eq!(evaluate("-7 / 2"), Ok(-3));
    }

    #[test]
    fn division_by_zero_fails() {
        assert_eq!(evaluate("4 / 0"), Err(CalcError::DivisionByZero));
        assert_eq!(evaluate("4 / 00"), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn empty_or_operator_first_is_malformed() {
        assert!(matches!(evaluate(""), Err(CalcError::MalformedExpression(_))));
        assert!(matches!(evaluate("   "), Err(CalcError::MalformedExpression(_))));
        assert!(matches!(evaluate(" + 3"), Err(CalcError::MalformedExpression(_))));
        assert!(matches!(evaluate("1 + x"), Err(CalcError::MalformedExpression(_))));
    }

    #[test]
    fn trailing_operator_is_ignored() {
        assert_eq!(evaluate("1 + "), Ok(1));
        assert_eq!(evaluate("1 +"), Ok(1));
    }

    #[test]
    fn latest_operator_wins() {
        assert_eq!(evaluate("6 + - 2"), Ok(4));
    }

    #[test]
    fn pending_operator_stays_pending() {
        assert_eq!(evaluate("1 + 2 3"), Ok(6));
    }

    #[test]
    fn number_before_any_operator_overwrites() {
        assert_eq!(evaluate("1 2"), Ok(2));
    }

    #[test]
    fn negative_results_can_be_chained() {
        assert_eq!(evaluate("-1 + 2"), Ok(1));
        assert_eq!(evaluate("3 - -1"), Ok(4));
    }

    #[test]
    fn overflow_is_reported() {
        assert!(matches!(
            evaluate("99999999999999999999"),
            Err(CalcError::Overflow(_))
        ));
        assert!(matches!(
            evaluate("9223372036854775807 + 1"),
            Err(CalcError::Overflow(_))
        ));
    }
}
