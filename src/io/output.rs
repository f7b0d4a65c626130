use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::schema::UnitConfig;

/// Serialize a unit configuration back to INI text, reproducing section
/// and key order exactly. Empty sections still emit their header, and
/// every section body is followed by one blank line.
pub fn render(config: &UnitConfig) -> String {
    let mut out = String::new();
    for section in &config.sections {
        out.push('[');
        out.push_str(&section.name);
        out.push_str("]\n");
        for (key, value) in &section.entries {
            out.push_str(key);
            out.push_str(" = ");
            out.push_str(value);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Render and write a unit configuration to `path`.
pub fn write_unit(config: &UnitConfig, path: &Path) -> Result<()> {
    write_text(&render(config), path)
}

/// Write `payload` to `path` through a temporary file in the same
/// directory, renamed into place once fully written. A failure at any
/// point leaves no partial file behind.
pub(crate) fn write_text(payload: &str, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(Error::PathNotWritable(dir.to_path_buf()));
    }

    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| match err.kind() {
        io::ErrorKind::PermissionDenied => Error::PathNotWritable(dir.to_path_buf()),
        _ => Error::Io(err),
    })?;
    tmp.write_all(payload.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|err| Error::Io(err.error))?;
    Ok(())
}
