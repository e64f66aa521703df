//! One weight of a font family: coverage lookup, per-subset output paths,
//! and `@font-face` CSS rendering.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::services::{FontInspector, FontSubsetter};
use crate::{Subset, SubsetRegistry, SubsplitError, EXPORT_FORMATS};

/// One face file under `<family>/original/`.
#[derive(Debug)]
pub struct FontFace {
    family: String,
    filename: String,
    name: String,
    weight: String,
    coverage: Option<BTreeSet<u32>>,
}

impl FontFace {
    /// Parses `<name>.<weight>.<ext>` out of `filename`; the name part may
    /// itself contain dots. Filenames with fewer than two dots are
    /// rejected.
    pub fn new(family: impl Into<String>, filename: &str) -> Result<Self, SubsplitError> {
        let mut parts = filename.rsplitn(3, '.');
        let _ext = parts.next();
        let weight = parts.next();
        match (parts.next(), weight) {
            (Some(name), Some(weight)) if !name.is_empty() => Ok(Self {
                family: family.into(),
                filename: filename.to_owned(),
                name: name.to_owned(),
                weight: weight.to_owned(),
                coverage: None,
            }),
            _ => Err(SubsplitError::FaceName(filename.to_owned())),
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> &str {
        &self.weight
    }

    /// Path of the face's binary font file.
    pub fn source_path(&self) -> PathBuf {
        Path::new(&self.family).join("original").join(&self.filename)
    }

    /// Extension-less output path for `subset_name`, also the form embedded
    /// in CSS `url()` entries.
    fn dest_base(&self, subset_name: &str) -> String {
        format!("{}/subset/{}/{}", self.family, self.weight, subset_name)
    }

    /// Codepoint coverage of the face, computed once via the inspector and
    /// cached until `force_reopen`. Opens and parses the binary font file,
    /// so the first call per face is the expensive one.
    pub fn points(
        &mut self,
        inspector: &dyn FontInspector,
        force_reopen: bool,
    ) -> Result<&BTreeSet<u32>, SubsplitError> {
        if force_reopen || self.coverage.is_none() {
            let points = inspector.points(&self.source_path())?;
            return Ok(self.coverage.insert(points));
        }
        match &self.coverage {
            Some(points) => Ok(points),
            None => unreachable!("coverage cache is filled on the other branch"),
        }
    }

    /// Extracts `subset`'s codepoints from this face into one output file
    /// per export format, under `subset/<weight>/`.
    pub fn subset(
        &self,
        subsetter: &dyn FontSubsetter,
        subset: &Subset,
    ) -> Result<(), SubsplitError> {
        let dest = self.dest_base(subset.name());
        subsetter.subset(&self.source_path(), subset.points(), Path::new(&dest))
    }

    /// One `@font-face` block per registry subset, in registry order,
    /// joined by blank lines. Pure string assembly, no I/O.
    pub fn css(&self, registry: &SubsetRegistry) -> String {
        let mut rules = Vec::with_capacity(registry.len());
        for subset in registry.iter() {
            let dest = self.dest_base(subset.name());
            let mut lines = vec![
                "@font-face {".to_owned(),
                format!("  font-family: '{}';", self.family),
                format!("  font-weight: {};", self.weight.to_lowercase()),
                format!("  unicode-range: {};", subset.range()),
                format!("  src: local('{}'),", self.family),
            ];
            for (i, format) in EXPORT_FORMATS.iter().enumerate() {
                let term = if i + 1 == EXPORT_FORMATS.len() { ';' } else { ',' };
                lines.push(format!(
                    "    url('{dest}{}') format('{}'){term}",
                    format.extension, format.css_format
                ));
            }
            lines.push("}".to_owned());
            rules.push(lines.join("\n"));
        }
        rules.join("\n\n")
    }
}
