//! The CSS `unicode-range` wire format.
//!
//! [`encode`] compresses a codepoint set into maximal runs of consecutive
//! values. [`parse`] accepts the same comma separated hex tokens, plus the
//! looser prefixes subsetting tools take on the command line.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::SubsplitError;

/// Renders `points` as a CSS `unicode-range` value: maximal runs of
/// consecutive codepoints, lowercase unpadded hex, comma separated.
/// An empty set renders as an empty string.
pub fn encode(points: &BTreeSet<u32>) -> String {
    let mut out = String::new();
    let mut iter = points.iter().copied();
    let Some(first) = iter.next() else {
        return out;
    };

    let (mut start, mut end) = (first, first);
    for cp in iter {
        if cp == end + 1 {
            end = cp;
            continue;
        }
        push_run(&mut out, start, end);
        (start, end) = (cp, cp);
    }
    push_run(&mut out, start, end);
    out
}

fn push_run(out: &mut String, start: u32, end: u32) {
    if !out.is_empty() {
        out.push(',');
    }
    if start == end {
        let _ = write!(out, "u+{start:x}");
    } else {
        let _ = write!(out, "u+{start:x}-{end:x}");
    }
}

/// Parses a comma/whitespace-separated list of Unicode codepoints or ranges
/// as hex numbers, optionally prefixed with 'U+', 'u', etc. For example
/// `41-5a,61-7a` covers ASCII letters, so does the more verbose
/// `U+0041-005A,U+0061-007A`. The inverse of [`encode`], deliberately
/// looser about its input.
pub fn parse(input: &str) -> Result<BTreeSet<u32>, SubsplitError> {
    let mut result = BTreeSet::new();
    if input.is_empty() {
        return Ok(result);
    }
    let re = regex::Regex::new(r"[><\+,;&#}{\\xXuUnNiI\n\t\v\f\r]").unwrap();
    let s = re.replace_all(input, " ");
    for cp in s.split_whitespace() {
        if let Some((start, end)) = cp.split_once('-') {
            let start: u32 = u32::from_str_radix(start, 16)
                .map_err(|_| SubsplitError::InvalidUnicode(start.to_owned()))?;
            let end: u32 = u32::from_str_radix(end, 16)
                .map_err(|_| SubsplitError::InvalidUnicode(end.to_owned()))?;
            if start > end {
                return Err(SubsplitError::InvalidUnicodeRange { start, end });
            }
            result.extend(start..=end);
        } else {
            let unicode: u32 = u32::from_str_radix(cp, 16)
                .map_err(|_| SubsplitError::InvalidUnicode(cp.to_owned()))?;
            result.insert(unicode);
        }
    }
    Ok(result)
}

#[test]
fn test_encode_singletons_and_runs() {
    assert_eq!(encode(&BTreeSet::from([65])), "u+41");
    assert_eq!(encode(&BTreeSet::from([65, 66, 67])), "u+41-43");
    assert_eq!(encode(&BTreeSet::from([65, 67])), "u+41,u+43");
    assert_eq!(encode(&BTreeSet::new()), "");
}

#[test]
fn test_encode_runs_are_maximal() {
    // 0x61..=0x7a with a hole at 0x70
    let points: BTreeSet<u32> = (0x61..=0x7a).filter(|&cp| cp != 0x70).collect();
    assert_eq!(encode(&points), "u+61-6f,u+71-7a");

    let points: BTreeSet<u32> = BTreeSet::from([0, 1, 2, 10, 0x10ffff]);
    assert_eq!(encode(&points), "u+0-2,u+a,u+10ffff");
}

#[test]
fn test_encode_parse_round_trip() {
    let points: BTreeSet<u32> = BTreeSet::from([0, 1, 2, 10, 11, 64, 70, 71, 72, 0x10ffff]);
    assert_eq!(parse(&encode(&points)).unwrap(), points);
    assert!(parse(&encode(&BTreeSet::new())).unwrap().is_empty());
}

#[test]
fn test_parse_loose_prefixes() {
    let output = parse("61 62,63").unwrap();
    assert_eq!(output, BTreeSet::from([97, 98, 99]));

    let output = parse("u+61,U+62,x63").unwrap();
    assert_eq!(output, BTreeSet::from([97, 98, 99]));

    let output = parse("u+61,U+65-67").unwrap();
    assert_eq!(output, BTreeSet::from([97, 101, 102, 103]));
}

#[test]
fn test_parse_rejects_bad_input() {
    assert!(matches!(
        parse("not-hex"),
        Err(SubsplitError::InvalidUnicode(_))
    ));
    assert!(matches!(
        parse("45-41"),
        Err(SubsplitError::InvalidUnicodeRange {
            start: 0x45,
            end: 0x41
        })
    ));
}
