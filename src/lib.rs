//! Batch font subsetting pipeline.
//!
//! Takes font family directories, splits each face's codepoint coverage into
//! the named subsets defined under `def/`, hands every subset to a font
//! subsetting backend, and writes `@font-face` CSS wiring the pieces back
//! together with `unicode-range`.
//!
//! Reading glyph coverage out of a font and producing the reduced binary
//! fonts are delegated to the [`services`] traits; the pipeline itself is
//! set algebra over codepoint sets plus path bookkeeping.

mod face;
pub mod ranges;
mod registry;
pub mod services;
mod subset;

pub use face::FontFace;
pub use registry::SubsetRegistry;
pub use subset::Subset;

use std::fs::{self, File};
use std::io::{self, Write as _};
use std::path::Path;

use log::{info, warn};
use thiserror::Error;

/// One output flavor produced for every subset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportFormat {
    /// Output file extension, dot included.
    pub extension: &'static str,
    /// Token for the CSS `format()` function.
    pub css_format: &'static str,
}

/// Formats exported for every subset, in CSS `src` priority order.
pub const EXPORT_FORMATS: &[ExportFormat] = &[
    ExportFormat {
        extension: ".woff2",
        css_format: "woff2",
    },
    ExportFormat {
        extension: ".woff",
        css_format: "woff",
    },
    ExportFormat {
        extension: ".otf",
        css_format: "opentype",
    },
];

/// Subset name prefix reserved for the synthesized catch-all subset.
pub const REST_PREFIX: &str = "10000.";

/// Backing filename used when the catch-all subset is persisted.
pub const REST_FILENAME: &str = "10000.rest.lst";

#[derive(Debug, Error)]
pub enum SubsplitError {
    /// Face filenames must look like `<name>.<weight>.<ext>`.
    #[error("invalid font face filename {0:?}")]
    FaceName(String),

    /// `load`/`save` was called on a subset that has no backing file.
    /// Synthesized subsets are the only ones without one, and they are only
    /// saved under an explicit flag, so hitting this is a caller bug.
    #[error("subset in {0:?} has no backing file")]
    NoBackingFile(String),

    #[error("invalid input unicode {0}")]
    InvalidUnicode(String),

    #[error("invalid unicode range {start:x}-{end:x}")]
    InvalidUnicodeRange { start: u32, end: u32 },

    #[error("I/O error on {path:?}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to inspect font {path:?}: {reason}")]
    Inspect {
        path: std::path::PathBuf,
        reason: String,
    },

    #[error("failed to subset font {path:?}: {reason}")]
    Subsetting {
        path: std::path::PathBuf,
        reason: String,
    },
}

impl SubsplitError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_owned(),
            source,
        }
    }
}

/// How the catch-all "rest" subset is handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AutoRest {
    /// Leftover codepoints stay uncovered.
    #[default]
    Off,
    /// Synthesize an in-memory rest subset from leftover codepoints.
    Synthesize,
    /// Synthesize and write it to `def/10000.rest.lst`.
    Persist,
}

impl AutoRest {
    fn enabled(self) -> bool {
        self != Self::Off
    }

    fn persists(self) -> bool {
        self == Self::Persist
    }
}

/// Pipeline configuration.
#[derive(Clone, Copy, Debug)]
pub struct Options {
    pub auto_rest: AutoRest,
    /// Leftover count that must be exceeded before a rest subset is
    /// synthesized.
    pub rest_threshold: usize,
    /// Codepoints at or below this value are treated as introspection
    /// sentinels and never land in the rest subset.
    pub sentinel_floor: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            auto_rest: AutoRest::Off,
            rest_threshold: 2,
            sentinel_floor: 0,
        }
    }
}

/// Processes one font family directory end to end: every face under
/// `original/` is reconciled against the subset definitions under `def/`,
/// subset via `subsetter`, and described in the family's `style.css`.
///
/// Faces with unparseable filenames are logged and skipped; any other
/// failure aborts the family.
pub fn process_family(
    family: &str,
    options: &Options,
    inspector: &dyn services::FontInspector,
    subsetter: &dyn services::FontSubsetter,
) -> Result<(), SubsplitError> {
    let family_dir = Path::new(family);
    let face_files = list_files_sorted(&family_dir.join("original"))?;

    let css_path = family_dir.join("style.css");
    let mut css_out = File::create(&css_path).map_err(|e| SubsplitError::io(&css_path, e))?;

    let mut registry = SubsetRegistry::discover(family)?;
    info!("{family}: {} subset definition(s) found", registry.len());

    for filename in face_files {
        let face_path = family_dir.join("original").join(&filename);
        info!("grabbing font face: {}", face_path.display());

        let mut face = match FontFace::new(family, &filename) {
            Ok(face) => face,
            Err(err @ SubsplitError::FaceName(_)) => {
                warn!("skipping {}: {err}", face_path.display());
                continue;
            }
            Err(err) => return Err(err),
        };

        let coverage = face.points(inspector, false)?.clone();
        let omitted = registry.omits(&coverage)?;
        let leftovers = registry.leftovers(&coverage)?;
        info!(
            "{} glyphs, {} in subset only, {} in font only",
            coverage.len(),
            omitted.len(),
            leftovers.len()
        );

        let out_dir = family_dir.join("subset").join(face.weight());
        fs::create_dir_all(&out_dir).map_err(|e| SubsplitError::io(&out_dir, e))?;

        if options.auto_rest.enabled()
            && leftovers.len() > options.rest_threshold
            && !registry.has_rest_subset()
        {
            info!("calculating rest subset from {} leftovers", leftovers.len());
            let mut rest = Subset::rest(family);
            rest.extend(
                leftovers
                    .iter()
                    .copied()
                    .filter(|&cp| cp > options.sentinel_floor),
            );
            if options.auto_rest.persists() {
                info!("writing {REST_FILENAME}");
                rest.save()?;
            }
            registry.push(rest);
        }

        for subset in registry.by_name() {
            info!(
                "processing subset {} ({} glyphs)",
                subset.name(),
                subset.len()
            );
            face.subset(subsetter, subset)?;
        }

        let css = face.css(&registry);
        write!(css_out, "{css}\n\n").map_err(|e| SubsplitError::io(&css_path, e))?;
    }

    info!("{family}: complete");
    Ok(())
}

/// Regular files in `dir`, name-sorted. Directory listing order is not
/// deterministic across filesystems, so every consumer gets sorted names.
pub(crate) fn list_files_sorted(dir: &Path) -> Result<Vec<String>, SubsplitError> {
    let entries = fs::read_dir(dir).map_err(|e| SubsplitError::io(dir, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SubsplitError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| SubsplitError::io(dir, e))?;
        if file_type.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
