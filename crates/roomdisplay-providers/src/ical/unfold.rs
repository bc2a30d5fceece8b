//! Line unfolding.
//!
//! Feeds fold long content lines by breaking them and starting the
//! continuation with a single space or tab. [`unfold`] joins them back into
//! logical lines, lazily.

use std::borrow::Cow;
use std::iter::Peekable;

/// Splits text on `\r\n`, `\n` or `\r`.
///
/// A trailing terminator does not produce a final empty line.
#[derive(Debug, Clone)]
pub struct PhysicalLines<'a> {
    rest: &'a str,
}

impl<'a> PhysicalLines<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for PhysicalLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        match self.rest.find(['\r', '\n']) {
            Some(idx) => {
                let line = &self.rest[..idx];
                let skip = if self.rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                self.rest = &self.rest[idx + skip..];
                Some(line)
            }
            None => {
                let line = self.rest;
                self.rest = "";
                Some(line)
            }
        }
    }
}

/// Logical lines of a feed, see [`unfold`].
#[derive(Debug, Clone)]
pub struct Unfold<'a> {
    lines: Peekable<PhysicalLines<'a>>,
}

impl<'a> Iterator for Unfold<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.lines.next()?;

        if !self.lines.peek().is_some_and(|line| is_continuation(line)) {
            return Some(Cow::Borrowed(first));
        }

        let mut logical = first.to_string();
        while let Some(continuation) = self.lines.next_if(|line| is_continuation(line)) {
            logical.push_str(&continuation[1..]);
        }
        Some(Cow::Owned(logical))
    }
}

/// Joins folded lines into logical lines.
///
/// A line starting with a single space or tab is appended, without that
/// marker, to the preceding logical line. Lines without continuations are
/// borrowed from the input. A continuation at the very start of the text has
/// nothing to merge into and is yielded as is.
pub fn unfold(text: &str) -> Unfold<'_> {
    Unfold {
        lines: PhysicalLines::new(text).peekable(),
    }
}

fn is_continuation(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}
