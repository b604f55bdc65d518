//! Output file naming and writing.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::document::PieDocument;

/// Derive the output file name: `<name>.pie` unless the object name already
/// carries the extension.
pub fn pie_file_name(name: &str) -> String {
    if name.ends_with(".pie") {
        name.to_string()
    } else {
        format!("{name}.pie")
    }
}

/// Write one document into the output directory, line by line in emission
/// order. The file has no trailing newline.
pub fn write_document(doc: &PieDocument, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(pie_file_name(&doc.name));
    let file =
        File::create(&path).with_context(|| format!("Failed to create output: {:?}", path))?;
    let mut writer = BufWriter::new(file);

    for (index, line) in doc.lines().iter().enumerate() {
        if index > 0 {
            writer.write_all(b"\n")?;
        }
        writer.write_all(line.as_bytes())?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write output: {:?}", path))?;

    Ok(path)
}
