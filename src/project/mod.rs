//! Schema-definition files

mod definition_parser;

pub use definition_parser::{parse_definition, parse_definition_str};
