//! External font services: glyph coverage introspection and binary
//! subsetting.
//!
//! The pipeline only sees the two traits. The bundled implementations cover
//! the common setup: skrifa for reading coverage out of a font, and a
//! fonttools-compatible external command for producing the subset files.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use skrifa::{FontRef, MetadataProvider};

use crate::{ranges, SubsplitError, EXPORT_FORMATS};

/// Enumerates the Unicode codepoints a font file maps to glyphs.
pub trait FontInspector {
    /// Every codepoint any glyph in the face is reachable from.
    fn points(&self, font_path: &Path) -> Result<BTreeSet<u32>, SubsplitError>;
}

/// Restricts a font file to a codepoint set and writes the result in every
/// export format.
pub trait FontSubsetter {
    /// Writes `<dest_base><ext>` for each entry of
    /// [`EXPORT_FORMATS`](crate::EXPORT_FORMATS).
    fn subset(
        &self,
        font_path: &Path,
        points: &BTreeSet<u32>,
        dest_base: &Path,
    ) -> Result<(), SubsplitError>;
}

/// Coverage read from the font's character map via skrifa.
#[derive(Clone, Copy, Debug, Default)]
pub struct CharmapInspector;

impl FontInspector for CharmapInspector {
    fn points(&self, font_path: &Path) -> Result<BTreeSet<u32>, SubsplitError> {
        let bytes = fs::read(font_path).map_err(|e| SubsplitError::io(font_path, e))?;
        let font = FontRef::new(&bytes).map_err(|e| SubsplitError::Inspect {
            path: font_path.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(font.charmap().mappings().map(|(cp, _gid)| cp).collect())
    }
}

/// Subsetting delegated to an external command with a fonttools-compatible
/// CLI: `<program> subset <font> --unicodes=<ranges> --output-file=<path>`,
/// plus `--flavor=` for the compressed formats.
#[derive(Clone, Debug)]
pub struct CommandSubsetter {
    program: PathBuf,
}

impl Default for CommandSubsetter {
    fn default() -> Self {
        Self::new("fonttools")
    }
}

impl CommandSubsetter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn flavor(extension: &str) -> Option<&'static str> {
        match extension {
            ".woff2" => Some("woff2"),
            ".woff" => Some("woff"),
            _ => None,
        }
    }
}

impl FontSubsetter for CommandSubsetter {
    fn subset(
        &self,
        font_path: &Path,
        points: &BTreeSet<u32>,
        dest_base: &Path,
    ) -> Result<(), SubsplitError> {
        let unicodes = ranges::encode(points);
        for format in EXPORT_FORMATS {
            let mut out = dest_base.as_os_str().to_owned();
            out.push(format.extension);

            let mut command = Command::new(&self.program);
            command
                .arg("subset")
                .arg(font_path)
                .arg(format!("--unicodes={unicodes}"))
                .arg("--output-file")
                .arg(&out);
            if let Some(flavor) = Self::flavor(format.extension) {
                command.arg(format!("--flavor={flavor}"));
            }

            debug!("running {command:?}");
            let status = command.status().map_err(|e| SubsplitError::Subsetting {
                path: font_path.to_owned(),
                reason: format!("failed to run {}: {e}", self.program.display()),
            })?;
            if !status.success() {
                return Err(SubsplitError::Subsetting {
                    path: font_path.to_owned(),
                    reason: format!("{} exited with {status}", self.program.display()),
                });
            }
        }
        Ok(())
    }
}
