//! Fluent assertions for parser tests.
//!
//! ```rust,ignore
//! use llgen::testing::{lex, Testable};
//!
//! list::parse(lex("item comma item")).test().assert_success();
//! list::parse(lex("item comma")).test().assert_failure_contains("end of input");
//! ```

use crate::rt::Token;
use std::fmt::{Debug, Display};

/// A wrapper around a parse result, for fluent tests.
pub struct TestResult<T, E> {
    inner: Result<T, E>,
}

impl<T: Debug, E: Display> TestResult<T, E> {
    pub fn new(result: Result<T, E>) -> Self {
        Self { inner: result }
    }

    /// Asserts success and returns the value.
    pub fn assert_success(self) -> T {
        match self.inner {
            Ok(val) => val,
            Err(e) => {
                panic!(
                    "\n🔴 TEST FAILED (Expected Success, but got Error):\nMessage:  {}\n",
                    e
                );
            }
        }
    }

    /// Asserts success and compares the value.
    pub fn assert_success_is<X>(self, expected: X) -> T
    where
        T: PartialEq<X>,
        X: Debug,
    {
        let val = self.assert_success();
        if val != expected {
            panic!(
                "\n🔴 TEST FAILED (Value Mismatch):\nExpected: {:?}\nGot:      {:?}\n",
                expected, val
            );
        }
        val
    }

    /// Asserts failure and returns the error.
    pub fn assert_failure(self) -> E {
        match self.inner {
            Ok(val) => {
                panic!(
                    "\n🔴 TEST FAILED (Expected Failure, but got Success):\nParsed Value: {:?}\n",
                    val
                );
            }
            Err(e) => e,
        }
    }

    /// Asserts failure with a message containing `expected_msg_part`.
    pub fn assert_failure_contains(self, expected_msg_part: &str) {
        let err = self.assert_failure();
        let actual_msg = err.to_string();
        if !actual_msg.contains(expected_msg_part) {
            panic!(
                "\n🔴 TEST FAILED (Error Message Mismatch):\nExpected part: {:?}\nActual msg:    {:?}\n",
                expected_msg_part, actual_msg
            );
        }
    }
}

pub trait Testable<T, E> {
    fn test(self) -> TestResult<T, E>;
}

impl<T: Debug, E: Display> Testable<T, E> for Result<T, E> {
    fn test(self) -> TestResult<T, E> {
        TestResult::new(self)
    }
}

/// A whitespace-separated toy lexer.
///
/// `word` becomes a token of kind `word`, `kind:text` a token of kind `kind`
/// spelling `text`, and `kw:word` a keyword token of kind `keyword`.
pub fn lex(input: &str) -> Vec<Token> {
    input
        .split_whitespace()
        .map(|word| match word.split_once(':') {
            Some(("kw", keyword)) => Token::keyword("keyword", keyword),
            Some((kind, text)) => Token::new(kind, text),
            None => Token::new(word, word),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_forms() {
        assert_eq!(
            lex("a id:x kw:while"),
            vec![
                Token::new("a", "a"),
                Token::new("id", "x"),
                Token::keyword("keyword", "while"),
            ]
        );
    }

    #[test]
    fn test_assertions() {
        Ok::<_, String>(3).test().assert_success_is(3);
        Err::<i32, _>("boom".to_string())
            .test()
            .assert_failure_contains("bo");
    }

    #[test]
    #[should_panic(expected = "TEST FAILED")]
    fn test_failure_on_success_panics() {
        Ok::<_, String>(1).test().assert_failure();
    }
}
