//! Writing rendered scripts to disk

use std::path::Path;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};

use crate::error::{DbBuilderError, Result};

/// Resolve an encoding label such as `utf-8`, `utf-16le` or `windows-1252`.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        DbBuilderError::UnsupportedEncoding {
            label: label.to_string(),
        }
    })
}

/// Encode a script. UTF-16 output starts with a byte-order mark; characters
/// the target encoding cannot represent are an error.
pub fn encode_script(content: &str, encoding: &'static Encoding) -> Result<Vec<u8>> {
    if encoding == UTF_16LE || encoding == UTF_16BE {
        let little_endian = encoding == UTF_16LE;
        let mut bytes = Vec::with_capacity(2 + content.len() * 2);
        for unit in std::iter::once(0xFEFF_u16).chain(content.encode_utf16()) {
            let pair = if little_endian {
                unit.to_le_bytes()
            } else {
                unit.to_be_bytes()
            };
            bytes.extend_from_slice(&pair);
        }
        return Ok(bytes);
    }

    let (encoded, used, had_errors) = encoding.encode(content);
    if had_errors || used != encoding {
        return Err(DbBuilderError::ScriptEncoding {
            encoding: encoding.name().to_string(),
        });
    }
    Ok(encoded.into_owned())
}

/// Encode and write a script, creating parent directories as needed.
pub fn write_script(path: &Path, content: &str, encoding: &'static Encoding) -> Result<()> {
    let bytes = encode_script(content, encoding)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DbBuilderError::ScriptWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(path, &bytes).map_err(|e| DbBuilderError::ScriptWriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(
        path = %path.display(),
        encoding = encoding.name(),
        bytes = bytes.len(),
        "script written"
    );
    Ok(())
}
