/*
 * @file token.rs
 * @brief Closed voice vocabulary and utterance-to-token mapping
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

//! Closed voice vocabulary and utterance-to-token mapping.

use std::fmt;

use serde::Serialize;

/// Arithmetic operators the calculator understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Returns the single-character symbol written into the buffer.
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    /// Parses a lexical buffer part back into an operator.
    ///
    /// # Arguments
    /// * `part` - One whitespace-delimited part of the buffer.
    ///
    /// # Returns
    /// * `Some(Operator)` - The part is exactly one operator symbol.
    /// * `None` - Anything else.
    pub fn from_symbol(part: &str) -> Option<Self> {
        match part {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Subtract),
            "*" => Some(Operator::Multiply),
            "/" => Some(Operator::Divide),
            _ => None,
        }
    }
}

/// Buffer-management commands, distinct from digits and operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    /// Empties the buffer.
    Clear,
    /// Drops the last character of the buffer.
    Remove,
    /// Replaces the buffer with its evaluated value.
    Result,
}

/// Symbolic action a recognized utterance maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Token {
    /// A decimal digit in `0..=9`.
    Digit(u8),
    Operator(Operator),
    Control(Control),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Digit(d) => write!(f, "{}", d),
            Token::Operator(op) => write!(f, "{}", op.symbol()),
            Token::Control(Control::Clear) => f.write_str("clear"),
            Token::Control(Control::Remove) => f.write_str("remove"),
            Token::Control(Control::Result) => f.write_str("result"),
        }
    }
}

/// Every word the recognizer grammar admits, paired with its token.
///
/// # Details
/// The order matches the grammar file handed to the recognizer: control
/// commands, operators, then digits.
pub const VOCABULARY: &[(&str, Token)] = &[
    ("clear", Token::Control(Control::Clear)),
    ("remove", Token::Control(Control::Remove)),
    ("result", Token::Control(Control::Result)),
    ("plus", Token::Operator(Operator::Add)),
    ("minus", Token::Operator(Operator::Subtract)),
    ("multiply", Token::Operator(Operator::Multiply)),
    ("divide", Token::Operator(Operator::Divide)),
    ("zero", Token::Digit(0)),
    ("one", Token::Digit(1)),
    ("two", Token::Digit(2)),
    ("three", Token::Digit(3)),
    ("four", Token::Digit(4)),
    ("five", Token::Digit(5)),
    ("six", Token::Digit(6)),
    ("seven", Token::Digit(7)),
    ("eight", Token::Digit(8)),
    ("nine", Token::Digit(9)),
];

/// Maps one recognized utterance onto a calculator token.
///
/// # Details
/// Matching is against whole words of [`VOCABULARY`], ignoring surrounding
/// whitespace and ASCII case. Unknown words have no effect on anything.
///
/// # Arguments
/// * `utterance` - The recognizer's hypothesis.
///
/// # Returns
/// * `Some(Token)` - The utterance is part of the vocabulary.
/// * `None` - The utterance is not recognized.
pub fn map_utterance(utterance: &str) -> Option<Token> {
    let word = utterance.trim();
    VOCABULARY
        .iter()
        .find(|(keyword, _)| keyword.eq_ignore_ascii_case(word))
        .map(|(_, token)| *token)
}

/// Returns the vocabulary words in grammar order.
pub fn words() -> impl Iterator<Item = &'static str> {
    VOCABULARY.iter().map(|(word, _)| *word)
}
