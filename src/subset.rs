//! Named codepoint sets backed by `def/*.lst` files.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{ranges, SubsplitError, REST_FILENAME};

/// A named set of Unicode codepoints, optionally backed by a definition
/// file under `<family>/def/`.
///
/// The backing file encoding is the set itself: every character in the
/// file's text content is one member codepoint, newlines included.
#[derive(Clone, Debug)]
pub struct Subset {
    family: String,
    filename: Option<String>,
    points: BTreeSet<u32>,
    loaded: bool,
}

impl Subset {
    /// Subset backed by `<family>/def/<filename>`, created empty and
    /// unloaded.
    pub fn from_file(family: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            filename: Some(filename.into()),
            points: BTreeSet::new(),
            loaded: false,
        }
    }

    /// The synthesized catch-all subset. Carries the reserved backing
    /// filename so it can be persisted, and counts as loaded since its
    /// membership never comes from a file read.
    pub fn rest(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            filename: Some(REST_FILENAME.to_owned()),
            points: BTreeSet::new(),
            loaded: true,
        }
    }

    /// A purely in-memory subset with no backing file. [`Self::load`] and
    /// [`Self::save`] report [`SubsplitError::NoBackingFile`] for these.
    pub fn detached(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            filename: None,
            points: BTreeSet::new(),
            loaded: true,
        }
    }

    /// The subset's display and output-path name: its filename with the
    /// final extension stripped. A filename without a dot is returned
    /// unchanged; a detached subset has the empty name.
    pub fn name(&self) -> &str {
        let Some(filename) = self.filename.as_deref() else {
            return "";
        };
        match filename.rfind('.') {
            Some(dot) => &filename[..dot],
            None => filename,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn points(&self) -> &BTreeSet<u32> {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn contains(&self, cp: u32) -> bool {
        self.points.contains(&cp)
    }

    pub fn insert(&mut self, cp: u32) -> bool {
        self.points.insert(cp)
    }

    pub fn extend(&mut self, points: impl IntoIterator<Item = u32>) {
        self.points.extend(points);
    }

    fn backing_path(&self) -> Result<PathBuf, SubsplitError> {
        let filename = self
            .filename
            .as_deref()
            .ok_or_else(|| SubsplitError::NoBackingFile(self.family.clone()))?;
        Ok(Path::new(&self.family).join("def").join(filename))
    }

    /// Replaces the membership with the character content of the backing
    /// file. No-op when already loaded, unless `force_reload`.
    pub fn load(&mut self, force_reload: bool) -> Result<(), SubsplitError> {
        if self.loaded && !force_reload {
            return Ok(());
        }
        let path = self.backing_path()?;
        let text = fs::read_to_string(&path).map_err(|e| SubsplitError::io(&path, e))?;
        self.points = text.chars().map(|c| c as u32).collect();
        self.loaded = true;
        Ok(())
    }

    /// Writes the membership back as literal characters, ascending,
    /// truncating whatever the backing file held before. Codepoints with no
    /// scalar value (surrogates) cannot be written and are dropped.
    pub fn save(&self) -> Result<(), SubsplitError> {
        let path = self.backing_path()?;
        let text: String = self
            .points
            .iter()
            .filter_map(|&cp| char::from_u32(cp))
            .collect();
        fs::write(&path, text).map_err(|e| SubsplitError::io(&path, e))
    }

    /// The membership as a CSS `unicode-range` value.
    pub fn range(&self) -> String {
        ranges::encode(&self.points)
    }
}
