/*
 * @file buffer.rs
 * @brief Expression buffer and the token apply rules
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

//! Expression buffer and the rules for applying tokens to it.

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::evaluator::evaluate;
use crate::token::{Control, Token};

/// How the digit six is applied.
///
/// # Details
/// The legacy calculator replaced the whole buffer when it heard "six"
/// while every other digit appended. `Append` treats six like the other
/// digits; `Overwrite` reproduces the legacy behaviour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigitSixMode {
    #[default]
    Append,
    Overwrite,
}

/// What `remove` does when the buffer is already empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyRemovePolicy {
    /// Leave the buffer empty and carry on.
    #[default]
    Ignore,
    /// Report [`CalcError::OutOfRange`].
    Fail,
}

/// Policy knobs consulted by [`ExpressionBuffer::apply`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferRules {
    #[serde(default)]
    pub digit_six: DigitSixMode,
    #[serde(default)]
    pub empty_remove: EmptyRemovePolicy,
}

/// The running textual calculation.
///
/// # Details
/// Digits concatenate onto the current numeric run and operators are
/// written as `" op "`, so splitting on whitespace alternates between
/// numbers and single-character operators. `remove` works on characters,
/// not tokens: after `"1 + "` it yields `"1 +"`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpressionBuffer {
    text: String,
}

impl ExpressionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rendered buffer.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Applies one token to the buffer.
    ///
    /// # Details
    /// On error the buffer is left exactly as it was.
    ///
    /// # Arguments
    /// * `token` - The mapped utterance.
    /// * `rules` - Six-digit and empty-remove policies.
    ///
    /// # Returns
    /// `Ok(())` once the buffer has been updated.
    ///
    /// # Errors
    /// * Any evaluation error for `Control::Result`.
    /// * [`CalcError::InvalidDigit`] for a digit token outside `0..=9`.
    /// * [`CalcError::OutOfRange`] for `remove` on an empty buffer when the
    ///   policy is [`EmptyRemovePolicy::Fail`].
    pub fn apply(&mut self, token: Token, rules: &BufferRules) -> CalcResult<()> {
        match token {
            Token::Control(Control::Clear) => self.text.clear(),
            Token::Control(Control::Remove) => self.remove_last(rules.empty_remove)?,
            Token::Control(Control::Result) => {
                let value = evaluate(&self.text)?;
                self.text = value.to_string();
            }
            Token::Operator(op) => {
                self.text.push(' ');
                self.text.push(op.symbol());
                self.text.push(' ');
            }
            Token::Digit(6) if rules.digit_six == DigitSixMode::Overwrite => {
                self.text = String::from("6");
            }
            Token::Digit(d) => {
                let digit =
                    char::from_digit(u32::from(d), 10).ok_or(CalcError::InvalidDigit(d))?;
                self.text.push(digit);
            }
        }
        Ok(())
    }

    fn remove_last(&mut self, policy: EmptyRemovePolicy) -> CalcResult<()> {
        if self.text.pop().is_some() {
            return Ok(());
        }
        match policy {
            EmptyRemovePolicy::Ignore => {
                log::debug!("Nothing to remove, buffer is empty");
                Ok(())
            }
            EmptyRemovePolicy::Fail => Err(CalcError::OutOfRange),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{map_utterance, Operator};

    fn feed(words: &[&str], rules: &BufferRules) -> CalcResult<ExpressionBuffer> {
        let mut buffer = ExpressionBuffer::new();
        for word in words {
            if let Some(token) = map_utterance(word) {
                buffer.apply(token, rules)?;
            }
        }
        Ok(buffer)
    }

    #[test]
    fn digits_concatenate_and_operators_are_delimited() {
        let buffer = feed(&["one", "two", "plus", "three"], &BufferRules::default()).unwrap();
        assert_eq!(buffer.as_str(), "12 + 3");
    }

    #[test]
    fn clear_always_empties() {
        let rules = BufferRules::default();
        for words in [&["clear"][..], &["one", "plus", "clear"][..], &["nine", "result", "clear"][..]] {
            let buffer = feed(words, &rules).unwrap();
            assert!(buffer.is_empty(), "after {:?}", words);
        }
    }

    #[test]
    fn one_plus_two_result_is_three() {
        let buffer = feed(&["one", "plus", "two", "result"], &BufferRules::default()).unwrap();
        assert_eq!(buffer.as_str(), "3");
    }

    #[test]
    fn result_is_left_to_right() {
        let words = ["five", "minus", "two", "multiply", "three", "result"];
        let buffer = feed(&words, &BufferRules::default()).unwrap();
        assert_eq!(buffer.as_str(), "9");
    }

    #[test]
    fn remove_strips_one_character_not_one_token() {
        let mut buffer = feed(&["one", "plus"], &BufferRules::default()).unwrap();
        assert_eq!(buffer.as_str(), "1 + ");
        buffer
            .apply(Token::Control(Control::Remove), &BufferRules::default())
            .unwrap();
        assert_eq!(buffer.as_str(), "1 +");
    }

    #[test]
    fn remove_on_empty_follows_policy() {
        let mut buffer = ExpressionBuffer::new();
        let remove = Token::Control(Control::Remove);
        assert_eq!(buffer.apply(remove, &BufferRules::default()), Ok(()));
        assert!(buffer.is_empty());

        let strict = BufferRules {
            empty_remove: EmptyRemovePolicy::Fail,
            ..BufferRules::default()
        };
        assert_eq!(buffer.apply(remove, &strict), Err(CalcError::OutOfRange));
    }

    #[test]
    fn six_appends_by_default() {
        let buffer = feed(&["one", "plus", "six"], &BufferRules::default()).unwrap();
        assert_eq!(buffer.as_str(), "1 + 6");
    }

    #[test]
    fn six_overwrites_in_legacy_mode() {
        let legacy = BufferRules {
            digit_six: DigitSixMode::Overwrite,
            ..BufferRules::default()
        };
        let buffer = feed(&["one", "plus", "six"], &legacy).unwrap();
        assert_eq!(buffer.as_str(), "6");
    }

    #[test]
    fn out_of_range_digits_are_rejected() {
        let rules = BufferRules::default();
        let mut buffer = feed(&["four"], &rules).unwrap();
        assert_eq!(buffer.apply(Token::Digit(12), &rules), Err(CalcError::InvalidDigit(12)));
        assert_eq!(buffer.apply(Token::Digit(250), &rules), Err(CalcError::InvalidDigit(250)));
        assert_eq!(buffer.as_str(), "4");
        assert_eq!(buffer.apply(Token::Digit(9), &rules), Ok(()));
        assert_eq!(buffer.as_str(), "49");
    }

    #[test]
    fn failed_result_leaves_buffer_untouched() {
        let err = feed(&["four", "divide", "zero", "result"], &BufferRules::default()).unwrap_err();
        assert_eq!(err, CalcError::DivisionByZero);

        let mut buffer = feed(&["four", "divide", "zero"], &BufferRules::default()).unwrap();
        let before = buffer.clone();
        assert!(buffer
            .apply(Token::Control(Control::Result), &BufferRules::default())
            .is_err());
        assert_eq!(buffer, before);
    }

    #[test]
    fn whitespace_split_alternates_numbers_and_operators() {
        let buffer = feed(
            &["four", "two", "minus", "seven", "divide", "three", "zero"],
            &BufferRules::default(),
        )
        .unwrap();
        let parts: Vec<_> = buffer.as_str().split_whitespace().collect();
        assert_eq!(parts, ["42", "-", "7", "/", "30"]);
        for (i, part) in parts.iter().enumerate() {
            assert_eq!(Operator::from_symbol(part).is_some(), i % 2 == 1);
        }
    }
}
