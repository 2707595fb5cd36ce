/*
 * @file error.rs
 * @brief Error kinds raised by the calculator core
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

//! Error kinds raised while mapping, applying, and evaluating voice input.

use thiserror::Error;

/// Convenience alias used across the calculator core.
pub type CalcResult<T> = Result<T, CalcError>;

/// Failures the calculator core can report.
///
/// # Details
/// `MalformedExpression`, `DivisionByZero` and `Overflow` surface from the
/// `result` command and terminate the recognition loop unless a restart
/// policy is configured. `OutOfRange` is produced by `remove` on an empty
/// buffer and is only propagated under [`EmptyRemovePolicy::Fail`].
///
/// [`EmptyRemovePolicy::Fail`]: crate::buffer::EmptyRemovePolicy::Fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    /// The buffer is empty or does not start with a number.
    #[error("malformed expression: {0:?}")]
    MalformedExpression(String),

    /// A division whose right-hand operand is zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A digit token outside `0..=9`.
    #[error("digit out of range: {0}")]
    InvalidDigit(u8),

    /// `remove` was applied to an empty buffer.
    #[error("cannot remove from an empty buffer")]
    OutOfRange,

    /// A literal or intermediate value does not fit in an `i64`.
    #[error("integer overflow while evaluating {0:?}")]
    Overflow(String),

    /// The speech recognizer could not be created or started.
    #[error("speech recognizer unavailable: {0}")]
    RecognizerUnavailable(String),
}
