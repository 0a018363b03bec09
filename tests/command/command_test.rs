//! Integration tests for command parsing and formatting.
//!
//! These tests check how command text is split into arguments and written
//! back out for the process.

use groonga_stdio::client::format_command;
use groonga_stdio::command::{ArgValue, CommandError, Encoding, OutputType};
use groonga_stdio::Command;
use insta::assert_snapshot;
use serde_json::json;

#[test]
fn test_select_positional_and_named() {
    let cmd = Command::parse("select Users --query 'name:@alice' --limit 5").unwrap();
    assert_eq!(cmd.name(), "select");
    assert_eq!(cmd.argument("table"), Some(&ArgValue::from("Users")));
    assert_eq!(cmd.argument("query"), Some(&ArgValue::from("name:@alice")));
    assert_snapshot!(cmd.to_string(), @"select --table Users --query name:@alice --limit 5");
}

#[test]
fn test_quoted_value_is_requoted() {
    let cmd = Command::parse(r#"select Users --filter "age > 20""#).unwrap();
    assert_eq!(cmd.argument("filter"), Some(&ArgValue::from("age > 20")));
    assert_snapshot!(cmd.to_string(), @r#"select --table Users --filter "age > 20""#);
}

#[test]
fn test_table_create_positionals() {
    let cmd = Command::parse("table_create People TABLE_HASH_KEY ShortText").unwrap();
    assert_snapshot!(
        cmd.to_string(),
        @"table_create --name People --flags TABLE_HASH_KEY --key_type ShortText"
    );
}

#[test]
fn test_column_create_positionals() {
    let cmd = Command::parse("column_create People name COLUMN_SCALAR ShortText").unwrap();
    assert_snapshot!(
        cmd.to_string(),
        @"column_create --table People --name name --flags COLUMN_SCALAR --type ShortText"
    );
}

#[test]
fn test_positionals_skip_named_parameters() {
    let cmd = Command::parse("table_create --flags TABLE_NO_KEY Logs").unwrap();
    assert_eq!(cmd.argument("name"), Some(&ArgValue::from("Logs")));
    assert_snapshot!(cmd.to_string(), @"table_create --flags TABLE_NO_KEY --name Logs");
}

#[test]
fn test_options_override_text() {
    let cmd = Command::parse_with("select Users --limit 5", [("limit", 10_i64)]).unwrap();
    assert_snapshot!(cmd.to_string(), @"select --table Users --limit 10");
}

#[test]
fn test_parse_errors() {
    assert_eq!(Command::parse("   "), Err(CommandError::Empty));
    assert_eq!(
        Command::parse("select Users --limit"),
        Err(CommandError::MissingValue("limit".to_string()))
    );
    assert_eq!(
        Command::parse("select Users --filter 'age > 20"),
        Err(CommandError::UnterminatedQuote('\''))
    );
    assert_eq!(
        Command::parse("status extra"),
        Err(CommandError::UnexpectedPositional {
            command: "status".to_string(),
            value: "extra".to_string(),
        })
    );
}

#[test]
fn test_output_types() {
    let encoding = |text: &str| Command::parse(text).unwrap().encoding();
    assert_eq!(encoding("select Users"), Encoding::Json);
    assert_eq!(encoding("select Users --output_type xml"), Encoding::Text);
    assert_eq!(encoding("select Users --output_type tsv"), Encoding::Text);
    assert_eq!(encoding("select Users --output_type msgpack"), Encoding::Binary);
    assert_eq!(encoding("select Users --output_type apache-arrow"), Encoding::Binary);
    assert_eq!(
        Command::parse("status --output_type yaml").unwrap().output_type(),
        OutputType::Json
    );
}

#[test]
fn test_format_plain_command() {
    let cmd = Command::parse("table_create People TABLE_HASH_KEY ShortText").unwrap();
    let line = format_command(&cmd);
    assert!(line.ends_with('\n'));
    assert_snapshot!(
        line.trim_end(),
        @"table_create --name People --flags TABLE_HASH_KEY --key_type ShortText"
    );
}

#[test]
fn test_format_load_with_values_option() {
    let cmd = Command::parse_with(
        "load --table People",
        [("values", json!([{"_key": "alice", "age": 30}]))],
    )
    .unwrap();
    assert!(cmd.is_load());
    assert_eq!(
        format_command(&cmd),
        "load --table People\n[{\"_key\":\"alice\",\"age\":30}]\n"
    );
}

#[test]
fn test_format_load_with_positional_values() {
    let cmd = Command::parse(r#"load '[{"_key":"bob"}]' People"#).unwrap();
    assert_eq!(cmd.argument("table"), Some(&ArgValue::from("People")));
    assert_eq!(
        format_command(&cmd),
        "load --table People\n[{\"_key\":\"bob\"}]\n"
    );
}

#[test]
fn test_format_dump() {
    let cmd = Command::parse("dump --tables People").unwrap();
    assert!(cmd.is_dump());
    assert_eq!(format_command(&cmd), "dump --tables People\n");
}
