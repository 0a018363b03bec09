//! Positional parameter lists for Groonga commands.
//!
//! Groonga assigns bare arguments to parameters by position, e.g.
//! `table_create People TABLE_HASH_KEY ShortText` sets `name`, `flags` and
//! `key_type`.

use std::collections::HashMap;
use std::sync::LazyLock;

static SIGNATURES: LazyLock<HashMap<&'static str, &'static [&'static str]>> = LazyLock::new(|| {
    let entries: [(&str, &[&str]); 36] = [
        (
            "select",
            &[
                "table",
                "match_columns",
                "query",
                "filter",
                "scorer",
                "sortby",
                "output_columns",
                "offset",
                "limit",
                "drilldown",
                "drilldown_sortby",
                "drilldown_output_columns",
                "drilldown_offset",
                "drilldown_limit",
                "cache",
                "match_escalation_threshold",
                "query_expansion",
                "query_flags",
                "query_expander",
                "adjuster",
                "drilldown_calc_types",
                "drilldown_calc_target",
                "drilldown_filter",
                "sort_keys",
                "drilldown_sort_keys",
            ],
        ),
        (
            "load",
            &[
                "values",
                "table",
                "columns",
                "ifexists",
                "input_type",
                "each",
                "output_ids",
                "lock_table",
            ],
        ),
        (
            "table_create",
            &[
                "name",
                "flags",
                "key_type",
                "value_type",
                "default_tokenizer",
                "normalizer",
                "token_filters",
            ],
        ),
        ("column_create", &["table", "name", "flags", "type", "source"]),
        (
            "dump",
            &[
                "tables",
                "dump_plugins",
                "dump_schema",
                "dump_records",
                "dump_indexes",
                "dump_configs",
                "sort_hash_table",
            ],
        ),
        ("status", &[]),
        ("quit", &[]),
        ("shutdown", &["mode"]),
        ("schema", &[]),
        ("table_list", &["prefix"]),
        ("column_list", &["table"]),
        ("table_remove", &["name", "dependent"]),
        ("column_remove", &["table", "name"]),
        ("table_rename", &["name", "new_name"]),
        ("column_rename", &["table", "name", "new_name"]),
        ("column_copy", &["from_table", "from_name", "to_table", "to_name"]),
        ("delete", &["table", "key", "id", "filter"]),
        ("truncate", &["target_name"]),
        ("io_flush", &["target_name", "recursive", "only_opened"]),
        ("object_exist", &["name"]),
        ("object_inspect", &["name"]),
        ("object_remove", &["name", "force"]),
        ("object_list", &[]),
        ("log_level", &["level"]),
        ("log_put", &["level", "message"]),
        ("log_reopen", &[]),
        ("plugin_register", &["name"]),
        ("plugin_unregister", &["name"]),
        ("normalize", &["normalizer", "string", "flags"]),
        ("normalizer_list", &[]),
        (
            "tokenize",
            &["tokenizer", "string", "normalizer", "flags", "mode", "token_filters"],
        ),
        ("tokenizer_list", &[]),
        ("lock_clear", &["target_name"]),
        ("lock_acquire", &["target_name"]),
        ("lock_release", &["target_name"]),
        ("cache_limit", &["max"]),
    ];
    entries.into_iter().collect()
});

/// Positional parameter names for a command, in order.
///
/// Unknown commands accept no positional arguments.
pub fn positional_parameters(command: &str) -> &'static [&'static str] {
    SIGNATURES.get(command).copied().unwrap_or(&[])
}
