//! Context-Aware Tab Completion
//!
//! Completion classifies the word being typed and offers candidates from the
//! matching vocabulary:
//! - `--name`: argument names only, returned with the `--` prefix
//! - anything else: command names, table names, optionally argument names,
//!   plus filesystem entries matching `<word>*`
//!
//! Table names are fetched once, when the vocabulary is loaded, with the
//! engine's `table_list` command. After that completion never talks to the
//! engine.

use std::collections::HashSet;

use glob::{glob_with, MatchOptions, Pattern};
use serde_json::Value;
use tracing::debug;

use crate::engine::EngineChannel;
use crate::error::{GrnshError, Result};

mod helper;

pub use helper::GrnshHelper;

/// Upper bound on the number of candidates offered for one word
///
/// Large candidate lists make some terminal line editors misbehave.
pub const MAX_CANDIDATES: usize = 38;

/// Prefix marking an argument (flag) token
pub const FLAG_PREFIX: &str = "--";

/// Command used to list tables at startup
pub const TABLE_LIST_COMMAND: &str = "table_list";

/// Built-in engine command names
pub const COMMANDS: &[&str] = &[
    "select",
    "load",
    "delete",
    "dump",
    "status",
    "table_list",
    "table_create",
    "table_remove",
    "table_rename",
    "table_tokenize",
    "table_copy",
    "column_list",
    "column_create",
    "column_remove",
    "column_rename",
    "column_copy",
    "logical_select",
    "logical_count",
    "logical_range_filter",
    "logical_table_remove",
    "object_exist",
    "object_inspect",
    "object_list",
    "object_remove",
    "normalize",
    "normalizer_list",
    "tokenize",
    "tokenizer_list",
    "plugin_register",
    "plugin_unregister",
    "register",
    "define_selector",
    "suggest",
    "truncate",
    "range_filter",
    "request_cancel",
    "ruby_eval",
    "ruby_load",
    "schema",
    "cache_limit",
    "check",
    "clearlock",
    "lock_acquire",
    "lock_clear",
    "lock_release",
    "log_level",
    "log_put",
    "log_reopen",
    "io_flush",
    "defrag",
    "thread_limit",
    "config_get",
    "config_set",
    "config_delete",
    "shutdown",
    "quit",
];

/// Built-in argument names (without the `--` prefix)
pub const ARGUMENTS: &[&str] = &[
    "name",
    "flags",
    "key_type",
    "value_type",
    "default_tokenizer",
    "normalizer",
    "token_filters",
    "table",
    "type",
    "source",
    "values",
    "columns",
    "ifexists",
    "input_type",
    "each",
    "id",
    "key",
    "filter",
    "match_columns",
    "query",
    "query_expander",
    "query_expansion",
    "query_flags",
    "scorer",
    "sortby",
    "sort_keys",
    "output_columns",
    "offset",
    "limit",
    "drilldown",
    "drilldown_sortby",
    "drilldown_sort_keys",
    "drilldown_output_columns",
    "drilldown_offset",
    "drilldown_limit",
    "drilldown_calc_types",
    "drilldown_calc_target",
    "cache",
    "match_escalation_threshold",
    "adjuster",
    "new_name",
    "from_name",
    "to_name",
    "string",
    "tokenizer",
    "mode",
    "level",
    "message",
    "max",
    "target_name",
    "recursive",
    "only_opened",
    "shard_key",
    "min",
    "min_border",
    "max_border",
    "command_version",
    "output_type",
    "request_id",
];

/// Candidate vocabularies for completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    commands: Vec<String>,
    arguments: Vec<String>,
    tables: Vec<String>,
}

impl Vocabulary {
    /// Built-in commands and arguments, no tables
    #[must_use]
    pub fn builtin() -> Self {
        Self::with_tables(Vec::new())
    }

    /// Built-in commands and arguments plus the given table names
    #[must_use]
    pub fn with_tables(tables: Vec<String>) -> Self {
        Self {
            commands: COMMANDS.iter().map(|s| (*s).to_string()).collect(),
            arguments: ARGUMENTS.iter().map(|s| (*s).to_string()).collect(),
            tables,
        }
    }

    /// Fetch table names from the engine and build the vocabulary
    ///
    /// # Errors
    /// `SchemaUnavailable` if the listing cannot be sent or its response is
    /// not a table listing.
    pub fn load(channel: &mut dyn EngineChannel) -> Result<Self> {
        let response = channel.send(TABLE_LIST_COMMAND).map_err(|e| {
            GrnshError::schema_unavailable(format!("{TABLE_LIST_COMMAND} failed: {e}"))
        })?;

        let tables = parse_table_names(&response)?;
        debug!(target: "grnsh::completion", tables = tables.len(), "loaded table names");
        Ok(Self::with_tables(tables))
    }

    /// Command names, in construction order
    #[must_use]
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Argument names without the flag prefix
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Table names as listed by the engine
    #[must_use]
    pub fn tables(&self) -> &[String] {
        &self.tables
    }
}

/// Extract table names from a `table_list` response
///
/// The header row (the list of `[column, type]` pairs) is skipped, and the
/// `name` column of every following row is collected. Both the flat layout
/// `[status, [header, row, ...]]` and the nested layout
/// `[status, [[[count], header, row, ...]]]` are accepted.
///
/// # Errors
/// `SchemaUnavailable` if the response is not JSON, reports an engine error,
/// or has no header row.
pub fn parse_table_names(raw: &str) -> Result<Vec<String>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| GrnshError::schema_unavailable(format!("table listing is not JSON: {e}")))?;

    if let Some(code) = value.pointer("/0/0").and_then(Value::as_i64) {
        if code != 0 {
            let message = value.pointer("/0/3").and_then(Value::as_str).unwrap_or("unknown error");
            return Err(GrnshError::schema_unavailable(format!(
                "engine rejected {TABLE_LIST_COMMAND} ({code}): {message}"
            )));
        }
    }

    let body = value
        .get(1)
        .and_then(Value::as_array)
        .ok_or_else(|| GrnshError::schema_unavailable("table listing has no result block"))?;

    let block = match body.as_slice() {
        [first, ..] if is_header(first) => body.as_slice(),
        [Value::Array(nested)] => nested.as_slice(),
        _ => body.as_slice(),
    };

    let header_index = block
        .iter()
        .position(is_header)
        .ok_or_else(|| GrnshError::schema_unavailable("table listing has no header row"))?;

    let name_index = block[header_index]
        .as_array()
        .and_then(|columns| {
            columns.iter().position(|c| c.get(0).and_then(Value::as_str) == Some("name"))
        })
        .unwrap_or(1);

    Ok(block[header_index + 1..]
        .iter()
        .filter_map(|row| row.get(name_index).and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}

/// A header row is a non-empty list of `[name, ...]` arrays
fn is_header(value: &Value) -> bool {
    value.as_array().is_some_and(|columns| {
        !columns.is_empty()
            && columns.iter().all(|c| c.get(0).is_some_and(Value::is_string))
    })
}

/// Completion engine over an immutable vocabulary
#[derive(Debug, Clone)]
pub struct Completer {
    vocabulary: Vocabulary,
    complete_arguments: bool,
    max_candidates: usize,
}

impl Completer {
    /// Create a completer; `complete_arguments` also offers argument names
    /// for bare words
    #[must_use]
    pub fn new(vocabulary: Vocabulary, complete_arguments: bool) -> Self {
        Self { vocabulary, complete_arguments, max_candidates: MAX_CANDIDATES }
    }

    /// Override [`MAX_CANDIDATES`]
    #[must_use]
    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// The vocabulary this completer draws from
    #[must_use]
    pub const fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Return the candidate at `index` for `text`, or `None` when exhausted
    ///
    /// Candidates carry a trailing space, and the `--` prefix when `text`
    /// started with it.
    #[must_use]
    pub fn complete(&self, text: &str, index: usize) -> Option<String> {
        self.candidates(text).into_iter().nth(index)
    }

    /// All candidates for `text`, filtered and capped
    #[must_use]
    pub fn candidates(&self, text: &str) -> Vec<String> {
        let (prefix, word, pool) = match text.strip_prefix(FLAG_PREFIX) {
            Some(word) => (FLAG_PREFIX, word, self.vocabulary.arguments.clone()),
            None => ("", text, self.bare_pool(text)),
        };

        let mut seen = HashSet::new();
        pool.into_iter()
            .filter(|candidate| candidate.starts_with(word))
            .filter(|candidate| seen.insert(candidate.clone()))
            .take(self.max_candidates)
            .map(|candidate| format!("{prefix}{candidate} "))
            .collect()
    }

    /// Commands, tables, optional arguments, then filesystem matches
    fn bare_pool(&self, text: &str) -> Vec<String> {
        let mut pool = Vec::new();
        pool.extend(self.vocabulary.commands.iter().cloned());
        pool.extend(self.vocabulary.tables.iter().cloned());
        if self.complete_arguments {
            pool.extend(self.vocabulary.arguments.iter().cloned());
        }
        pool.extend(path_matches(text));
        pool
    }
}

/// Filesystem entries matching `<text>*`
///
/// `text` is matched literally (glob metacharacters are escaped), so only
/// the trailing `*` expands. Hidden entries are only offered when the typed
/// name starts with a dot. Results keep the typed directory part and are
/// sorted.
#[must_use]
pub fn path_matches(text: &str) -> Vec<String> {
    let pattern = format!("{}*", Pattern::escape(text));
    let options = MatchOptions { require_literal_leading_dot: true, ..MatchOptions::new() };

    let Ok(paths) = glob_with(&pattern, options) else {
        return Vec::new();
    };

    let mut matches: Vec<String> = paths
        .filter_map(std::result::Result::ok)
        .filter_map(|path| path.into_os_string().into_string().ok())
        .collect();
    matches.sort();
    matches
}
