//! JSON Schema for the config document
//!
//! Generated from the config types with `schemars`, so defaults, ranges and
//! descriptions come from the same definitions the loader deserializes into.
//! Served by `bootkit config schema` for editor validation. The loader also
//! uses it to type environment overrides and to flag unknown keys.

use crate::config::AppConfig;
use schemars::generate::SchemaSettings;
use serde_json::Value;
use std::sync::OnceLock;

/// JSON Schema (draft 2020-12) describing `config.toml`.
pub fn config_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(build_schema)
}

fn build_schema() -> Value {
    SchemaSettings::draft2020_12()
        .with(|settings| settings.inline_subschemas = true)
        .into_generator()
        .into_root_schema_for::<AppConfig>()
        .to_value()
}

fn property(path: &[&str]) -> Option<&'static Value> {
    let mut node = config_schema();
    for segment in path {
        node = node.get("properties")?.get(*segment)?;
    }
    Some(node)
}

/// Schema `type` of the key at `path`, e.g. `["runtime", "timeout"]` is
/// `"integer"`. Optional keys report their non-null type. `None` for unknown
/// keys.
pub fn property_type(path: &[&str]) -> Option<&'static str> {
    match property(path)?.get("type")? {
        Value::String(ty) => Some(ty.as_str()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|ty| *ty != "null"),
        _ => None,
    }
}

/// Dotted names of keys in `table` that the schema does not describe.
pub fn unknown_keys(table: &toml::Table) -> Vec<String> {
    let mut unknown = Vec::new();
    collect_unknown(table, &mut Vec::new(), &mut unknown);
    unknown
}

fn collect_unknown<'a>(table: &'a toml::Table, prefix: &mut Vec<&'a str>, out: &mut Vec<String>) {
    for (key, value) in table {
        prefix.push(key);
        match property(prefix) {
            None => out.push(prefix.join(".")),
            Some(_) => {
                if let toml::Value::Table(nested) = value {
                    collect_unknown(nested, prefix, out);
                }
            }
        }
        prefix.pop();
    }
}
