//! Discovery of a family's subset definitions and the set algebra that
//! reconciles them against font coverage.

use std::collections::BTreeSet;
use std::path::Path;

use crate::{list_files_sorted, Subset, SubsplitError, REST_PREFIX};

/// Filename extension of subset definition files under `def/`.
const DEF_EXTENSION: &str = ".lst";

/// All subset definitions of one font family.
///
/// Membership is fixed at discovery, except for the single synthesized rest
/// subset a processing run may [`push`](Self::push).
#[derive(Debug)]
pub struct SubsetRegistry {
    family: String,
    sets: Vec<Subset>,
}

impl SubsetRegistry {
    /// An empty registry for `family`.
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            sets: Vec::new(),
        }
    }

    /// Builds the registry from `<family>/def/`: one subset per `.lst`
    /// file, hidden files ignored, sorted by name.
    pub fn discover(family: impl Into<String>) -> Result<Self, SubsplitError> {
        let family = family.into();
        let dir = Path::new(&family).join("def");
        let sets = list_files_sorted(&dir)?
            .into_iter()
            .filter(|name| !name.starts_with('.') && name.ends_with(DEF_EXTENSION))
            .map(|name| Subset::from_file(&family, name))
            .collect();
        Ok(Self { family, sets })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Subsets in registry order: discovery (name-sorted) order, with any
    /// synthesized rest subset at the end.
    pub fn iter(&self) -> impl Iterator<Item = &Subset> {
        self.sets.iter()
    }

    /// Subsets in ascending name order, the order they are subset in.
    pub fn by_name(&self) -> Vec<&Subset> {
        let mut sets: Vec<&Subset> = self.sets.iter().collect();
        sets.sort_by(|a, b| a.name().cmp(b.name()));
        sets
    }

    /// Appends a synthesized subset.
    pub fn push(&mut self, subset: Subset) {
        self.sets.push(subset);
    }

    fn ensure_loaded(&mut self, force_reload: bool) -> Result<(), SubsplitError> {
        for subset in &mut self.sets {
            subset.load(force_reload)?;
        }
        Ok(())
    }

    /// The union of every subset's codepoints, loading each subset at most
    /// once over the registry's lifetime.
    pub fn points(&mut self) -> Result<BTreeSet<u32>, SubsplitError> {
        self.ensure_loaded(false)?;
        Ok(self
            .sets
            .iter()
            .flat_map(|subset| subset.points().iter().copied())
            .collect())
    }

    /// Codepoints declared by some subset but missing from `coverage`.
    /// Informational; fonttools-style backends drop these on their own.
    pub fn omits(&mut self, coverage: &BTreeSet<u32>) -> Result<BTreeSet<u32>, SubsplitError> {
        Ok(self.points()?.difference(coverage).copied().collect())
    }

    /// Codepoints in `coverage` that no subset declares. Routinely includes
    /// sentinel codepoints from font introspection; filter strictly
    /// positive values before treating these as real glyphs.
    pub fn leftovers(&mut self, coverage: &BTreeSet<u32>) -> Result<BTreeSet<u32>, SubsplitError> {
        let points = self.points()?;
        Ok(coverage.difference(&points).copied().collect())
    }

    /// Whether a reserved `10000.*` catch-all subset already exists, either
    /// from a persisted definition file or an earlier synthesis.
    pub fn has_rest_subset(&self) -> bool {
        self.sets
            .iter()
            .any(|subset| subset.name().starts_with(REST_PREFIX))
    }
}
