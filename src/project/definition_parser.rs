//! Parser for XML schema-definition files

use std::path::Path;

use anyhow::Result;
use encoding_rs::WINDOWS_1252;
use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::{Document, Node};

use crate::builder::DatabaseBuilder;
use crate::error::DbBuilderError;
use crate::model::{
    ColumnDefinition, DatabaseSettings, ForeignKeyDefinition, ReferentialAction, ScalarType,
    SqlServerVersion, TableDefinition, DEFAULT_SCHEMA,
};

/// `Name`, `Name(n)`, `Name(MAX)` or `Name(p,s)`
static TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_.\[\]]*)\s*(?:\(\s*(\d+|(?i:max))\s*(?:,\s*(\d+)\s*)?\))?\s*$")
        .expect("Invalid type regex")
});

/// Read a file as a string, trying UTF-8 first, then Windows-1252 as fallback
fn read_file_with_encoding_fallback(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;

    match String::from_utf8(bytes) {
        // Strip UTF-8 BOM if present
        Ok(s) if s.starts_with('\u{FEFF}') => Ok(s['\u{FEFF}'.len_utf8()..].to_string()),
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "File contains invalid characters",
                ))
            } else {
                Ok(decoded.into_owned())
            }
        }
    }
}

/// Parse a definition file into a configured builder.
///
/// The builder carries the server name when the file names one; the
/// authentication mode is left for the caller to choose.
pub fn parse_definition(path: &Path) -> Result<DatabaseBuilder> {
    let content =
        read_file_with_encoding_fallback(path).map_err(|e| DbBuilderError::DefinitionReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

    let doc = Document::parse(&content).map_err(|e| DbBuilderError::DefinitionParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let builder = build_from_document(&doc)?;
    tracing::info!(
        path = %path.display(),
        tables = builder.tables().len(),
        "definition loaded"
    );
    Ok(builder)
}

/// Parse definition XML held in memory.
pub fn parse_definition_str(content: &str) -> Result<DatabaseBuilder> {
    let doc = Document::parse(content).map_err(|e| DbBuilderError::DefinitionParseError {
        path: "<memory>".into(),
        source: e,
    })?;
    build_from_document(&doc)
}

fn build_from_document(doc: &Document) -> Result<DatabaseBuilder> {
    let root = doc.root_element();
    if root.tag_name().name() != "Database" {
        return Err(invalid(format!(
            "expected <Database> root element, found <{}>",
            root.tag_name().name()
        )));
    }

    let database_name = required_attribute(&root, "Name")?;
    let settings = match child_elements(&root, "Settings").next() {
        Some(node) => parse_settings(&node)?,
        None => DatabaseSettings::default(),
    };

    let mut builder = DatabaseBuilder::new();
    if let Some(server) = root.attribute("Server") {
        builder.connect_to_server(server);
    }
    builder.create_database(database_name, |_| settings);

    for table_node in child_elements(&root, "Table") {
        builder.add_table(parse_table(&table_node)?);
    }

    Ok(builder)
}

fn parse_settings(node: &Node) -> Result<DatabaseSettings> {
    let mut settings = DatabaseSettings::default();

    if let Some(collation) = node.attribute("Collation") {
        settings = settings.collation(collation);
    }

    // TargetPlatform (e.g., "Sql150") first, so an explicit CompatibilityLevel wins
    if let Some(platform) = node.attribute("TargetPlatform") {
        let version: SqlServerVersion = platform.parse().map_err(invalid)?;
        settings = settings.target_platform(version);
    }

    if let Some(level) = parse_number::<u16>(node, "CompatibilityLevel")? {
        settings = settings.compatibility_level(level);
    }

    if let Some(val) = parse_bool(node, "AllowSnapshotIsolation")? {
        settings = settings.allow_snapshot_isolation(val);
    }

    if let Some(val) = parse_bool(node, "ReadCommittedSnapshot")? {
        settings = settings.read_committed_snapshot(val);
    }

    Ok(settings)
}

fn parse_table(node: &Node) -> Result<TableDefinition> {
    let name = required_attribute(node, "Name")?;
    let schema = node.attribute("Schema").unwrap_or(DEFAULT_SCHEMA);
    let mut table = TableDefinition::with_schema(schema, name);

    let mut columns = child_elements(node, "Column")
        .map(|n| parse_column(&n))
        .collect::<Result<Vec<_>>>()?;
    columns.sort_by_key(|c| c.order);
    for column in columns {
        table.add_column(column);
    }

    for fk_node in child_elements(node, "ForeignKey") {
        table.add_foreign_key(parse_foreign_key(&fk_node)?);
    }

    Ok(table)
}

fn parse_column(node: &Node) -> Result<ColumnDefinition> {
    let name = required_attribute(node, "Name")?;
    let type_spec = required_attribute(node, "Type")?;

    let captures = TYPE_RE.captures(type_spec).ok_or_else(|| {
        DbBuilderError::UnsupportedType {
            type_name: type_spec.to_string(),
            column: name.to_string(),
        }
    })?;
    let type_name = captures.get(1).map(|m| m.as_str()).unwrap_or(type_spec);
    let scalar_type = ScalarType::for_column(type_name, name)?;

    // table scope is filled in by TableDefinition::add_column
    let mut column = ColumnDefinition::new(String::new(), name, scalar_type);

    let first = captures.get(2).map(|m| m.as_str());
    let second = captures.get(3).map(|m| m.as_str());
    match scalar_type {
        ScalarType::String | ScalarType::CharArray => {
            if let Some(scale) = second {
                return Err(invalid(format!(
                    "type {} takes a length only, found scale '{}' for column {}",
                    scalar_type, scale, name
                )));
            }
            if let Some(length) = first.filter(|f| !f.eq_ignore_ascii_case("max")) {
                column.length = length.parse().map_err(|_| {
                    invalid(format!("invalid length '{}' for column {}", length, name))
                })?;
            }
        }
        ScalarType::Single | ScalarType::Double | ScalarType::Decimal => {
            if let Some(precision) = first {
                column.precision = precision.parse().map_err(|_| {
                    invalid(format!("invalid precision '{}' for column {}", precision, name))
                })?;
            }
            if let Some(scale) = second {
                column.scale = scale.parse().map_err(|_| {
                    invalid(format!("invalid scale '{}' for column {}", scale, name))
                })?;
            }
        }
        _ => {
            if let Some(facet) = first {
                return Err(invalid(format!(
                    "type {} takes no size, found '{}' for column {}",
                    scalar_type, facet, name
                )));
            }
        }
    }

    if let Some(length) = parse_number::<u32>(node, "Length")? {
        column.length = length;
    }
    if let Some(precision) = parse_number::<u8>(node, "Precision")? {
        column.precision = precision;
    }
    if let Some(scale) = parse_number::<u8>(node, "Scale")? {
        column.scale = scale;
    }
    if let Some(order) = parse_number::<i32>(node, "Order")? {
        column.order = order;
    }

    if let Some(val) = parse_bool(node, "Nullable")? {
        column.nullable = val;
    }
    if let Some(val) = parse_bool(node, "Unique")? {
        column.unique = val;
    }
    if let Some(val) = parse_bool(node, "PrimaryKey")? {
        column.primary_key = val;
    }
    if let Some(val) = parse_bool(node, "Identity")? {
        column.identity = val;
    }
    if let Some(seed) = parse_number::<i64>(node, "Seed")? {
        column.seed = seed;
    }
    if let Some(increment) = parse_number::<i64>(node, "Increment")? {
        column.increment = increment;
    }

    if let Some(default) = node.attribute("Default") {
        column.default_value = Some(default.to_string());
    }

    Ok(column)
}

fn parse_foreign_key(node: &Node) -> Result<ForeignKeyDefinition> {
    let fields = split_list(required_attribute(node, "Fields")?);
    let target_table = required_attribute(node, "TargetTable")?;
    let references = split_list(required_attribute(node, "References")?);

    let mut foreign_key = ForeignKeyDefinition::new(fields, target_table, references);

    if let Some(schema) = node.attribute("TargetSchema") {
        foreign_key = foreign_key.target_schema(schema);
    }
    if let Some(action) = parse_action(node, "OnUpdate")? {
        foreign_key = foreign_key.on_update(action);
    }
    if let Some(action) = parse_action(node, "OnDelete")? {
        foreign_key = foreign_key.on_delete(action);
    }

    Ok(foreign_key)
}

fn child_elements<'a, 'input: 'a>(
    node: &Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

fn required_attribute<'a>(node: &Node<'a, '_>, name: &str) -> Result<&'a str> {
    node.attribute(name).ok_or_else(|| {
        invalid(format!(
            "<{}> is missing the {} attribute",
            node.tag_name().name(),
            name
        ))
    })
}

fn parse_bool(node: &Node, name: &str) -> Result<Option<bool>> {
    match node.attribute(name) {
        None => Ok(None),
        Some(val) if val.trim().eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(val) if val.trim().eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(val) => Err(invalid(format!(
            "{} must be true or false, found '{}'",
            name, val
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(node: &Node, name: &str) -> Result<Option<T>> {
    node.attribute(name)
        .map(|val| {
            val.trim()
                .parse::<T>()
                .map_err(|_| invalid(format!("{} must be a number, found '{}'", name, val)))
        })
        .transpose()
}

fn parse_action(node: &Node, name: &str) -> Result<Option<ReferentialAction>> {
    node.attribute(name)
        .map(|val| val.parse::<ReferentialAction>().map_err(invalid))
        .transpose()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().trim_matches(|c| c == '[' || c == ']').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    DbBuilderError::InvalidDefinition {
        message: message.into(),
    }
    .into()
}
