//! rustyline adapter for [`Completer`].

use std::borrow::Cow;

use rustyline::completion::{Completer as LineCompleter, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use super::Completer;

/// Line editor helper that completes the word under the cursor
pub struct GrnshHelper {
    completer: Completer,
}

impl GrnshHelper {
    #[must_use]
    pub const fn new(completer: Completer) -> Self {
        Self { completer }
    }

    /// Byte offset where the word ending at `pos` starts
    fn word_start(line: &str, pos: usize) -> usize {
        line[..pos]
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map_or(0, |(i, c)| i + c.len_utf8())
    }

    /// Replacement pairs for the word ending at `pos`
    fn pairs(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let start = Self::word_start(line, pos);
        let pairs = self
            .completer
            .candidates(&line[start..pos])
            .into_iter()
            .map(|replacement| Pair { display: replacement.trim_end().to_string(), replacement })
            .collect();
        (start, pairs)
    }
}

impl LineCompleter for GrnshHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.pairs(line, pos))
    }
}

impl Hinter for GrnshHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for GrnshHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for GrnshHelper {}

impl Helper for GrnshHelper {}
