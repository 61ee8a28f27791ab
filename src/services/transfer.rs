//! Export/import of setting values
//!
//! The artifact is plain text, one line per setting:
//!
//! ```text
//! moduleId|category|displayName|value
//! ```
//!
//! Fields are escaped so that names and values may contain the delimiter:
//! `\` is written as `\\`, `|` as `\|`, newline as `\n` and carriage return
//! as `\r`. A line without backslashes reads exactly like the unescaped
//! format. Unknown escape sequences are kept verbatim.

use super::convert::ConverterRegistry;
use super::STATUS_TARGET;
use crate::model::setting::{SettingEntry, SettingKey};
use crate::view::settings::grouping::ModuleGroup;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

/// File name of the artifact inside the host's configuration directory
pub const EXPORT_FILE_NAME: &str = "ConfigManagerExport.txt";

const DELIMITER: char = '|';
const ESCAPE: char = '\\';
const FIELD_COUNT: usize = 4;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("import file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Outcome of an import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Lines applied through a setter
    pub imported: usize,
    /// Lines with fewer than four fields
    pub malformed: usize,
    /// Well-formed lines that matched nothing or failed to convert/apply
    pub skipped: usize,
}

/// One parsed artifact line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLine {
    pub key: SettingKey,
    pub value: String,
}

impl ExportLine {
    pub fn to_line(&self) -> String {
        format!(
            "{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}",
            escape_field(&self.key.module_id),
            escape_field(&self.key.category),
            escape_field(&self.key.name),
            escape_field(&self.value)
        )
    }

    /// Parse a line; `None` for blank lines and lines with fewer than four
    /// fields
    pub fn parse(line: &str) -> Option<Self> {
        if line.trim().is_empty() {
            return None;
        }
        let mut fields = split_fields(line).into_iter();
        let module_id = fields.next()?;
        let category = fields.next()?;
        let name = fields.next()?;
        let value = fields.next()?;
        Some(Self {
            key: SettingKey {
                module_id,
                category,
                name,
            },
            value,
        })
    }
}

pub fn escape_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            ESCAPE => out.push_str("\\\\"),
            DELIMITER => out.push_str("\\|"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Split on unescaped delimiters into at most four unescaped fields.
///
/// The last field takes the rest of the line, so an unescaped delimiter
/// inside a value survives.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::with_capacity(FIELD_COUNT);
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.next() {
                Some(ESCAPE) => current.push(ESCAPE),
                Some(DELIMITER) => current.push(DELIMITER),
                Some('n') => current.push('\n'),
                Some('r') => current.push('\r'),
                Some(other) => {
                    current.push(ESCAPE);
                    current.push(other);
                }
                None => current.push(ESCAPE),
            },
            DELIMITER if fields.len() < FIELD_COUNT - 1 => {
                fields.push(std::mem::take(&mut current));
            }
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}

/// Artifact lines for every entry of the given groups that has a current
/// value, in traversal order.
///
/// Entries whose accessor fails or whose value is null are left out.
pub fn export_lines(groups: &[ModuleGroup], converters: &ConverterRegistry) -> Vec<String> {
    let mut lines = Vec::new();
    for group in groups {
        for category in &group.categories {
            for entry in &category.settings {
                let value = match entry.get() {
                    Ok(value) if !value.is_null() => value,
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::warn!("Not exporting {}: {}", entry.key(), e);
                        continue;
                    }
                };
                let line = ExportLine {
                    key: entry.key(),
                    value: converters.to_text(&entry.setting_type, &value),
                };
                lines.push(line.to_line());
            }
        }
    }
    lines
}

/// Write the artifact to `path`.
///
/// The file is first written next to the target and then renamed over it,
/// so a failed export leaves any previous artifact intact.
pub fn export_to_file(
    groups: &[ModuleGroup],
    converters: &ConverterRegistry,
    path: &Path,
) -> Result<usize, TransferError> {
    let lines = export_lines(groups, converters);
    let write_err = |source| TransferError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let tmp_path = path.with_extension("txt.tmp");
    let result = (|| -> io::Result<()> {
        let mut file = io::BufWriter::new(fs::File::create(&tmp_path)?);
        for line in &lines {
            writeln!(file, "{line}")?;
        }
        file.flush()?;
        drop(file);
        fs::rename(&tmp_path, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(write_err(e));
    }

    tracing::info!(target: STATUS_TARGET, "Exported {} settings to {}", lines.len(), path.display());
    Ok(lines.len())
}

/// Apply artifact text to the entries of the given groups.
///
/// Every per-line failure is swallowed: the line is counted as malformed or
/// skipped and the run continues.
pub fn import_text(
    groups: &[ModuleGroup],
    converters: &ConverterRegistry,
    text: &str,
) -> ImportReport {
    let mut index: HashMap<SettingKey, Rc<SettingEntry>> = HashMap::new();
    for group in groups {
        for category in &group.categories {
            for entry in &category.settings {
                index.entry(entry.key()).or_insert_with(|| entry.clone());
            }
        }
    }

    let mut report = ImportReport::default();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let Some(parsed) = ExportLine::parse(line) else {
            report.malformed += 1;
            continue;
        };
        let Some(entry) = index.get(&parsed.key) else {
            report.skipped += 1;
            continue;
        };
        let Some(converter) = converters.resolve(&entry.setting_type) else {
            tracing::debug!("No converter for {} ({})", parsed.key, entry.setting_type);
            report.skipped += 1;
            continue;
        };

        let applied = (converter.from_text)(&parsed.value, &entry.setting_type)
            .map_err(|e| e.to_string())
            .and_then(|value| entry.set(value).map_err(|e| e.to_string()));
        match applied {
            Ok(()) => report.imported += 1,
            Err(reason) => {
                tracing::debug!("Skipping import of {}: {}", parsed.key, reason);
                report.skipped += 1;
            }
        }
    }
    report
}

/// Read the artifact at `path` and apply it.
///
/// The whole file is read before any value is touched, so an I/O failure
/// never leaves a half-applied import behind.
pub fn import_from_file(
    groups: &[ModuleGroup],
    converters: &ConverterRegistry,
    path: &Path,
) -> Result<ImportReport, TransferError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(TransferError::NotFound(path.to_path_buf()))
        }
        Err(source) => {
            return Err(TransferError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let report = import_text(groups, converters, &text);
    tracing::info!(
        target: STATUS_TARGET,
        "Imported {} settings from {}",
        report.imported,
        path.display()
    );
    Ok(report)
}
