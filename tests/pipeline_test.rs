//! End-to-end pipeline runs over scratch family directories with mock font
//! services standing in for the introspection and subsetting backends.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use pretty_assertions::assert_eq;
use subsplit::services::{FontInspector, FontSubsetter};
use subsplit::{process_family, AutoRest, Options, SubsplitError, EXPORT_FORMATS};
use tempdir::TempDir;

/// Hands out a fixed coverage set for any font file.
struct FixedInspector(BTreeSet<u32>);

impl FixedInspector {
    fn of(points: impl IntoIterator<Item = u32>) -> Self {
        Self(points.into_iter().collect())
    }
}

impl FontInspector for FixedInspector {
    fn points(&self, _font_path: &Path) -> Result<BTreeSet<u32>, SubsplitError> {
        Ok(self.0.clone())
    }
}

/// Writes empty marker files where a real backend would put fonts, and
/// records every request.
#[derive(Default)]
struct RecordingSubsetter {
    calls: Mutex<Vec<(PathBuf, BTreeSet<u32>, PathBuf)>>,
}

impl RecordingSubsetter {
    fn calls(&self) -> Vec<(PathBuf, BTreeSet<u32>, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

impl FontSubsetter for RecordingSubsetter {
    fn subset(
        &self,
        font_path: &Path,
        points: &BTreeSet<u32>,
        dest_base: &Path,
    ) -> Result<(), SubsplitError> {
        for format in EXPORT_FORMATS {
            let mut file = dest_base.as_os_str().to_owned();
            file.push(format.extension);
            fs::write(&file, "").map_err(|e| SubsplitError::Io {
                path: PathBuf::from(&file),
                source: e,
            })?;
        }
        self.calls
            .lock()
            .unwrap()
            .push((font_path.to_owned(), points.clone(), dest_base.to_owned()));
        Ok(())
    }
}

/// `<dir>/Fam` with one Regular face and a `latin.lst` covering "AB".
fn make_family(dir: &TempDir) -> String {
    let family = dir.path().join("Fam");
    fs::create_dir_all(family.join("original")).unwrap();
    fs::create_dir_all(family.join("def")).unwrap();
    fs::write(family.join("original/Fam.Regular.otf"), b"stub").unwrap();
    fs::write(family.join("def/latin.lst"), "AB").unwrap();
    family.to_str().unwrap().to_owned()
}

fn options(auto_rest: AutoRest) -> Options {
    Options {
        auto_rest,
        ..Options::default()
    }
}

#[test]
fn pipeline_writes_subset_files_and_css() {
    let dir = TempDir::new("pipeline").unwrap();
    let family = make_family(&dir);
    let inspector = FixedInspector::of([65, 66, 67]);
    let subsetter = RecordingSubsetter::default();

    process_family(&family, &options(AutoRest::Off), &inspector, &subsetter).unwrap();

    for ext in [".woff2", ".woff", ".otf"] {
        let path = dir.path().join(format!("Fam/subset/Regular/latin{ext}"));
        assert!(path.exists(), "missing {}", path.display());
    }

    let calls = subsetter.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Path::new(&family).join("original/Fam.Regular.otf"));
    assert_eq!(calls[0].1, BTreeSet::from([65, 66]));

    let css = fs::read_to_string(dir.path().join("Fam/style.css")).unwrap();
    let expected = format!(
        "@font-face {{\n\
         \x20 font-family: '{family}';\n\
         \x20 font-weight: regular;\n\
         \x20 unicode-range: u+41-42;\n\
         \x20 src: local('{family}'),\n\
         \x20   url('{family}/subset/Regular/latin.woff2') format('woff2'),\n\
         \x20   url('{family}/subset/Regular/latin.woff') format('woff'),\n\
         \x20   url('{family}/subset/Regular/latin.otf') format('opentype');\n\
         }}\n\n"
    );
    assert_eq!(css, expected);
}

#[test]
fn autorest_skipped_below_leftover_threshold() {
    let dir = TempDir::new("pipeline").unwrap();
    let family = make_family(&dir);
    // one leftover (0x43) does not exceed the default threshold of 2
    let inspector = FixedInspector::of([65, 66, 67]);
    let subsetter = RecordingSubsetter::default();

    process_family(&family, &options(AutoRest::Synthesize), &inspector, &subsetter).unwrap();

    assert_eq!(subsetter.calls().len(), 1);
    assert!(!dir.path().join("Fam/def/10000.rest.lst").exists());
    let css = fs::read_to_string(dir.path().join("Fam/style.css")).unwrap();
    assert_eq!(css.matches("@font-face {").count(), 1);
}

#[test]
fn autorest_synthesizes_and_persists_rest_subset() {
    let dir = TempDir::new("pipeline").unwrap();
    let family = make_family(&dir);
    // three leftovers beyond the declared "AB", plus a sentinel 0 that must
    // be filtered out of the rest subset
    let inspector = FixedInspector::of([0, 65, 66, 67, 68, 69]);
    let subsetter = RecordingSubsetter::default();

    process_family(&family, &options(AutoRest::Persist), &inspector, &subsetter).unwrap();

    let rest = fs::read_to_string(dir.path().join("Fam/def/10000.rest.lst")).unwrap();
    assert_eq!(rest, "CDE");

    // subsets are processed in ascending name order: 10000.rest first
    let calls = subsetter.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1, BTreeSet::from([67, 68, 69]));
    assert_eq!(calls[0].2, Path::new(&format!("{family}/subset/Regular/10000.rest")));
    assert_eq!(calls[1].1, BTreeSet::from([65, 66]));

    let css = fs::read_to_string(dir.path().join("Fam/style.css")).unwrap();
    assert!(css.contains("unicode-range: u+43-45;"));
    assert!(dir.path().join("Fam/subset/Regular/10000.rest.woff2").exists());
}

#[test]
fn autorest_in_memory_survives_later_faces() {
    let dir = TempDir::new("pipeline").unwrap();
    let family = make_family(&dir);
    fs::write(
        dir.path().join("Fam/original/Fam.Bold.otf"),
        b"stub",
    )
    .unwrap();
    let inspector = FixedInspector::of([65, 66, 67, 68, 69]);
    let subsetter = RecordingSubsetter::default();

    // Synthesize (without persisting) must not make later faces try to load
    // a rest definition file that was never written.
    process_family(&family, &options(AutoRest::Synthesize), &inspector, &subsetter).unwrap();

    assert!(!dir.path().join("Fam/def/10000.rest.lst").exists());
    // 2 faces x (latin + rest); rest synthesized only once
    assert_eq!(subsetter.calls().len(), 4);
    let css = fs::read_to_string(dir.path().join("Fam/style.css")).unwrap();
    assert_eq!(css.matches("@font-face {").count(), 4);
    assert_eq!(css.matches("font-weight: bold;").count(), 2);
}

#[test]
fn existing_rest_definition_blocks_synthesis() {
    let dir = TempDir::new("pipeline").unwrap();
    let family = make_family(&dir);
    fs::write(dir.path().join("Fam/def/10000.rest.lst"), "Z").unwrap();
    let inspector = FixedInspector::of([65, 66, 67, 68, 69]);
    let subsetter = RecordingSubsetter::default();

    process_family(&family, &options(AutoRest::Persist), &inspector, &subsetter).unwrap();

    // the persisted definition wins; nothing recalculated or overwritten
    let rest = fs::read_to_string(dir.path().join("Fam/def/10000.rest.lst")).unwrap();
    assert_eq!(rest, "Z");
    assert_eq!(subsetter.calls().len(), 2);
}

#[test]
fn unparseable_face_names_are_skipped() {
    let dir = TempDir::new("pipeline").unwrap();
    let family = make_family(&dir);
    fs::write(dir.path().join("Fam/original/README"), b"not a font").unwrap();
    fs::write(dir.path().join("Fam/original/notes.txt"), b"nor this").unwrap();
    let inspector = FixedInspector::of([65, 66]);
    let subsetter = RecordingSubsetter::default();

    process_family(&family, &options(AutoRest::Off), &inspector, &subsetter).unwrap();

    let calls = subsetter.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Path::new(&family).join("original/Fam.Regular.otf"));
}

#[test]
fn missing_family_layout_is_fatal() {
    let dir = TempDir::new("pipeline").unwrap();
    let family = dir.path().join("Nope");
    fs::create_dir_all(&family).unwrap();
    let inspector = FixedInspector::of([]);
    let subsetter = RecordingSubsetter::default();

    let err = process_family(
        family.to_str().unwrap(),
        &options(AutoRest::Off),
        &inspector,
        &subsetter,
    )
    .unwrap_err();
    assert!(matches!(err, SubsplitError::Io { .. }));
}
