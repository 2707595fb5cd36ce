/*
 * @file grammar.rs
 * @brief JSGF grammar for the calculator vocabulary
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

//! JSGF grammar for the calculator vocabulary.
//!
//! Recognizers that accept a grammar file are constrained to exactly the
//! words in [`VOCABULARY`](crate::token::VOCABULARY).

use crate::token;

/// Name the grammar is published under.
pub const GRAMMAR_NAME: &str = "grammar";

/// Renders the vocabulary as a JSGF grammar with one public rule.
///
/// # Arguments
/// * `name` - Grammar name written into the header.
///
/// # Returns
/// * `String` - The grammar source, newline terminated.
pub fn render_jsgf(name: &str) -> String {
    let words: Vec<&str> = token::words().collect();
    format!(
        "#JSGF V1.0;\n\ngrammar {};\n\npublic <command> = ( {} );\n",
        name,
        words.join(" | ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_lists_every_word_once() {
        let grammar = render_jsgf(GRAMMAR_NAME);
        assert!(grammar.starts_with("#JSGF V1.0;"));
        assert!(grammar.contains("grammar grammar;"));
        for word in token::words() {
            let needle = format!(" {} ", word);
            assert_eq!(grammar.matches(&needle).count(), 1, "{}", word);
        }
    }

    #[test]
    fn rule_starts_with_control_commands() {
        let grammar = render_jsgf("calc");
        assert!(grammar.contains("public <command> = ( clear | remove | result | plus"));
        assert!(grammar.ends_with("nine );\n"));
    }
}
