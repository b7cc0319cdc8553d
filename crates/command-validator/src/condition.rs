//! Expected conditions over captured command output

use regex::Regex;

/// How a condition inspects the captured text
#[derive(Debug, Clone)]
enum Matcher {
    /// Substring membership
    Literal(String),
    /// Regular expression match
    Pattern(Regex),
}

/// A single condition a command's output must satisfy
///
/// An expectation pairs a matcher (literal substring or regular expression)
/// with a polarity: by default the match must be *present* in the output;
/// a negated expectation requires it to be *absent*.
#[derive(Debug, Clone)]
pub struct Expectation {
    matcher: Matcher,
    negated: bool,
}

impl Expectation {
    /// Expect the output to contain the given substring
    pub fn contains(text: impl Into<String>) -> Self {
        Self {
            matcher: Matcher::Literal(text.into()),
            negated: false,
        }
    }

    /// Expect the output to match the given pattern
    pub fn matches(pattern: Regex) -> Self {
        Self {
            matcher: Matcher::Pattern(pattern),
            negated: false,
        }
    }

    /// Flip the polarity of this expectation
    pub fn negated(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Expect the output NOT to contain the given substring
    pub fn must_not_contain(text: impl Into<String>) -> Self {
        Self::contains(text).negated()
    }

    /// Whether this expectation requires absence rather than presence
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Test this expectation against captured output
    pub fn is_satisfied_by(&self, output: &str) -> bool {
        let found = match &self.matcher {
            Matcher::Literal(text) => output.contains(text.as_str()),
            Matcher::Pattern(pattern) => pattern.is_match(output),
        };
        found != self.negated
    }
}
