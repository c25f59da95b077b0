//! Unit tests for the XML definition parser
//!
//! These tests verify parsing of database, table, column and foreign key
//! elements, along with the errors reported for malformed files.

use std::io::Write;

use pretty_assertions::assert_eq;
use rust_dbbuilder::project::{parse_definition, parse_definition_str};
use rust_dbbuilder::{DbBuilderError, ReferentialAction, ScalarType};
use tempfile::NamedTempFile;

/// Helper to create a temp definition file with raw bytes
fn create_definition_file(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".xml").unwrap();
    file.write_all(content).unwrap();
    file.flush().unwrap();
    file
}

fn definition_error(content: &str) -> DbBuilderError {
    let err = parse_definition_str(content).unwrap_err();
    match err.downcast::<DbBuilderError>() {
        Ok(err) => err,
        Err(other) => panic!("Expected DbBuilderError, got {:?}", other),
    }
}

// ============================================================================
// Database Element Tests
// ============================================================================

#[test]
fn test_parse_minimal_database() {
    let builder = parse_definition_str(r#"<Database Name="Empty" />"#).unwrap();
    assert_eq!(builder.database_name(), Some("Empty"));
    assert_eq!(builder.server_name(), None);
    assert!(builder.tables().is_empty());
    assert_eq!(builder.settings().unwrap().compatibility_level, 160);
}

#[test]
fn test_parse_server_and_settings() {
    let builder = parse_definition_str(
        r#"<Database Name="Shop" Server="db01\SQLEXPRESS">
             <Settings Collation="Latin1_General_100_CI_AS" TargetPlatform="Sql140"
                       AllowSnapshotIsolation="TRUE" ReadCommittedSnapshot="false" />
           </Database>"#,
    )
    .unwrap();

    assert_eq!(builder.server_name(), Some(r"db01\SQLEXPRESS"));
    let settings = builder.settings().unwrap();
    assert_eq!(settings.collation.as_deref(), Some("Latin1_General_100_CI_AS"));
    assert_eq!(settings.compatibility_level, 140);
    assert!(settings.allow_snapshot_isolation);
    assert!(!settings.read_committed_snapshot);
}

#[test]
fn test_compatibility_level_overrides_target_platform() {
    let builder = parse_definition_str(
        r#"<Database Name="Shop">
             <Settings TargetPlatform="Sql130" CompatibilityLevel="150" />
           </Database>"#,
    )
    .unwrap();
    assert_eq!(builder.settings().unwrap().compatibility_level, 150);
}

// ============================================================================
// Column Tests
// ============================================================================

#[test]
fn test_parse_column_type_shorthand() {
    let builder = parse_definition_str(
        r#"<Database Name="Shop">
             <Table Name="Article">
               <Column Name="Code" Type="String(20)" />
               <Column Name="Notes" Type="String(MAX)" />
               <Column Name="Price" Type="Decimal(18, 4)" />
               <Column Name="Letters" Type="System.Char[]" Length="5" />
             </Table>
           </Database>"#,
    )
    .unwrap();

    let columns = &builder.tables()[0].columns;
    assert_eq!(columns[0].sql_type(), "NVARCHAR(20)");
    assert_eq!(columns[1].sql_type(), "NVARCHAR(MAX)");
    assert_eq!(columns[2].sql_type(), "NUMERIC(18,4)");
    assert_eq!(columns[3].scalar_type, ScalarType::CharArray);
    assert_eq!(columns[3].sql_type(), "NVARCHAR(5)");
}

#[test]
fn test_parse_column_flags() {
    let builder = parse_definition_str(
        r#"<Database Name="Shop">
             <Table Schema="sales" Name="Invoice">
               <Column Name="Id" Type="Int64" PrimaryKey="true" Identity="true"
                       Seed="1000" Increment="10" Nullable="false" />
               <Column Name="Number" Type="String" Length="12" Unique="true" Nullable="false" />
               <Column Name="Issued" Type="DateTime" Default="GETDATE()" />
             </Table>
           </Database>"#,
    )
    .unwrap();

    let table = &builder.tables()[0];
    assert_eq!(table.full_name(), "[sales].[Invoice]");

    let id = &table.columns[0];
    assert!(id.primary_key && id.identity && !id.nullable);
    assert_eq!((id.seed, id.increment), (1000, 10));
    assert_eq!(id.table_qualified_name, "sales_Invoice");

    assert!(table.columns[1].unique);
    assert_eq!(
        table.columns[2].render(),
        "[Issued] DATETIME NULL CONSTRAINT df_sales_Invoice_Issued DEFAULT GETDATE()"
    );
}

#[test]
fn test_columns_sorted_by_order_attribute() {
    let builder = parse_definition_str(
        r#"<Database Name="Shop">
             <Table Name="T">
               <Column Name="C" Type="Int32" Order="2" />
               <Column Name="A" Type="Int32" Order="1" />
               <Column Name="B" Type="Int32" Order="2" />
             </Table>
           </Database>"#,
    )
    .unwrap();
    let names: Vec<&str> = builder.tables()[0]
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["A", "C", "B"]);
}

#[test]
fn test_unsupported_column_type() {
    let err = definition_error(
        r#"<Database Name="Shop">
             <Table Name="T"><Column Name="Span" Type="TimeSpan" /></Table>
           </Database>"#,
    );
    assert!(matches!(
        err,
        DbBuilderError::UnsupportedType { ref type_name, ref column }
            if type_name == "TimeSpan" && column == "Span"
    ));
}

#[test]
fn test_scale_out_of_range() {
    let err = definition_error(
        r#"<Database Name="Shop">
             <Table Name="T"><Column Name="Price" Type="Decimal(18,999)" /></Table>
           </Database>"#,
    );
    assert!(matches!(err, DbBuilderError::InvalidDefinition { .. }));
    assert!(err.to_string().contains("invalid scale '999' for column Price"));
}

#[test]
fn test_size_on_fixed_width_type() {
    for type_spec in ["Int32(10)", "Guid(5)", "DateTime(3)"] {
        let err = definition_error(&format!(
            r#"<Database Name="Shop">
                 <Table Name="T"><Column Name="C" Type="{}" /></Table>
               </Database>"#,
            type_spec
        ));
        assert!(
            matches!(err, DbBuilderError::InvalidDefinition { .. }),
            "{} should be rejected, got {:?}",
            type_spec,
            err
        );
        assert!(err.to_string().contains("takes no size"));
    }
}

#[test]
fn test_scale_on_string_type() {
    let err = definition_error(
        r#"<Database Name="Shop">
             <Table Name="T"><Column Name="Code" Type="String(20,2)" /></Table>
           </Database>"#,
    );
    assert!(err.to_string().contains("takes a length only"));
}

// ============================================================================
// Foreign Key Tests
// ============================================================================

#[test]
fn test_parse_foreign_key() {
    let builder = parse_definition_str(
        r#"<Database Name="Shop">
             <Table Name="Shipment">
               <Column Name="OrderId" Type="Int32" />
               <Column Name="LineNo" Type="Int16" />
               <ForeignKey Fields="[OrderId], [LineNo]" TargetSchema="sales"
                           TargetTable="OrderLine" References="OrderId,LineNo"
                           OnUpdate="Cascade" OnDelete="SET NULL" />
             </Table>
           </Database>"#,
    )
    .unwrap();

    let fk = &builder.tables()[0].foreign_keys[0];
    assert_eq!(fk.field_names, vec!["OrderId", "LineNo"]);
    assert_eq!(fk.reference_fields, vec!["OrderId", "LineNo"]);
    assert_eq!(fk.target_schema, "sales");
    assert_eq!(fk.on_update, ReferentialAction::Cascade);
    assert_eq!(fk.on_delete, ReferentialAction::SetNull);
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_wrong_root_element() {
    let err = definition_error(r#"<Project Name="Shop" />"#);
    assert!(err.to_string().contains("expected <Database> root element"));
}

#[test]
fn test_missing_required_attribute() {
    let err = definition_error(r#"<Database Name="Shop"><Table /></Database>"#);
    assert!(err.to_string().contains("<Table> is missing the Name attribute"));
}

#[test]
fn test_invalid_boolean() {
    let err = definition_error(
        r#"<Database Name="Shop">
             <Table Name="T"><Column Name="Id" Type="Int32" Nullable="yes" /></Table>
           </Database>"#,
    );
    assert!(matches!(err, DbBuilderError::InvalidDefinition { .. }));
}

#[test]
fn test_invalid_referential_action() {
    let err = definition_error(
        r#"<Database Name="Shop">
             <Table Name="T">
               <ForeignKey Fields="A" TargetTable="B" References="Id" OnDelete="Restrict" />
             </Table>
           </Database>"#,
    );
    assert!(err.to_string().contains("Unknown referential action: Restrict"));
}

#[test]
fn test_malformed_xml() {
    let err = definition_error("<Database Name=\"Shop\">");
    assert!(matches!(err, DbBuilderError::DefinitionParseError { .. }));
}

// ============================================================================
// File Reading Tests
// ============================================================================

#[test]
fn test_read_file_with_bom() {
    let mut content = vec![0xEF, 0xBB, 0xBF];
    content.extend_from_slice(br#"<Database Name="Shop" />"#);
    let file = create_definition_file(&content);

    let builder = parse_definition(file.path()).unwrap();
    assert_eq!(builder.database_name(), Some("Shop"));
}

#[test]
fn test_read_windows_1252_file() {
    // 0xE9 is 'é' in Windows-1252 and invalid as standalone UTF-8
    let mut content = br#"<Database Name="Caf"#.to_vec();
    content.push(0xE9);
    content.extend_from_slice(br#"" />"#);
    let file = create_definition_file(&content);

    let builder = parse_definition(file.path()).unwrap();
    assert_eq!(builder.database_name(), Some("Café"));
}

#[test]
fn test_missing_file() {
    let err = parse_definition(std::path::Path::new("does/not/exist.xml")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DbBuilderError>(),
        Some(DbBuilderError::DefinitionReadError { .. })
    ));
}
