//! Year and year-range folder resolution.
//!
//! Year folders come in two shapes: a single year (`1890`) or an inclusive
//! range (`1891-1893`). Both parse into one [`YearSpan`] variant so that
//! "which folder holds year Y" is a single ranking function over candidate
//! spans instead of two code paths.
//!
//! When several folders cover the same year — a single-year folder inside
//! an overlapping range, or two overlapping ranges — [`YearIndex::pick`]
//! decides: the preferred kind per the `ranges_take_precedence` flag, then
//! the narrowest span, then the lexicographically first folder name. A pick
//! that needed the tie-breakers reports its losing contenders so the caller
//! can record the ambiguity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A folder's represented year or inclusive year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum YearSpan {
    Single(u16),
    Range(u16, u16),
}

impl YearSpan {
    /// Parse a folder name: four-digit `"1890"` or `"1891-1893"`.
    ///
    /// Anything else — prose, padded years, a range with start > end —
    /// is not a year folder and returns `None`.
    pub fn parse(name: &str) -> Option<YearSpan> {
        fn year(part: &str) -> Option<u16> {
            if part.len() == 4 && part.bytes().all(|b| b.is_ascii_digit()) {
                part.parse().ok()
            } else {
                None
            }
        }
        match name.split_once('-') {
            None => year(name).map(YearSpan::Single),
            Some((a, b)) => {
                let (start, end) = (year(a)?, year(b)?);
                (start <= end).then_some(YearSpan::Range(start, end))
            }
        }
    }

    pub fn start(&self) -> u16 {
        match *self {
            YearSpan::Single(y) => y,
            YearSpan::Range(start, _) => start,
        }
    }

    pub fn end(&self) -> u16 {
        match *self {
            YearSpan::Single(y) => y,
            YearSpan::Range(_, end) => end,
        }
    }

    pub fn contains(&self, year: u16) -> bool {
        self.start() <= year && year <= self.end()
    }

    pub fn is_range(&self) -> bool {
        matches!(self, YearSpan::Range(..))
    }

    /// Number of calendar years covered.
    pub fn width(&self) -> u16 {
        self.end() - self.start() + 1
    }

    /// Every calendar year covered, ascending.
    pub fn years(&self) -> impl Iterator<Item = u16> {
        self.start()..=self.end()
    }
}

/// A parsed year folder: the span plus the folder name it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanFolder {
    pub span: YearSpan,
    pub folder: String,
}

/// Outcome of resolving one year against a [`YearIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub chosen: SpanFolder,
    /// Folder names of the same preferred kind that also covered the year,
    /// in ranking order. Non-empty means the tie-breakers decided.
    pub contenders: Vec<String>,
}

impl Resolution {
    pub fn is_ambiguous(&self) -> bool {
        !self.contenders.is_empty()
    }
}

/// Index from year to the span folders covering it, built from one
/// profile directory's immediate subfolders.
#[derive(Debug, Clone, Default)]
pub struct YearIndex {
    by_year: BTreeMap<u16, Vec<SpanFolder>>,
}

impl YearIndex {
    /// Build an index from folder names. Returns the index and the names
    /// that did not parse as a year or year range (the caller records
    /// those as diagnostics; they are excluded from resolution).
    pub fn build<I, S>(folder_names: I) -> (YearIndex, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = YearIndex::default();
        let mut unparsed = Vec::new();
        for name in folder_names {
            let name = name.into();
            match YearSpan::parse(&name) {
                Some(span) => {
                    let entry = SpanFolder {
                        span,
                        folder: name,
                    };
                    for year in span.years() {
                        index.by_year.entry(year).or_default().push(entry.clone());
                    }
                }
                None => unparsed.push(name),
            }
        }
        unparsed.sort();
        (index, unparsed)
    }

    pub fn is_empty(&self) -> bool {
        self.by_year.is_empty()
    }

    /// Every year covered by at least one folder, ascending.
    pub fn years(&self) -> impl Iterator<Item = u16> + '_ {
        self.by_year.keys().copied()
    }

    /// Resolve the folder whose contents count for `year`.
    ///
    /// Candidates of the preferred kind (single-year by default, range
    /// when `ranges_take_precedence`) win outright; within a kind the
    /// narrowest span wins, then the lexicographically first folder name.
    pub fn pick(&self, year: u16, ranges_take_precedence: bool) -> Option<Resolution> {
        let candidates = self.by_year.get(&year)?;
        let (ranges, singles): (Vec<&SpanFolder>, Vec<&SpanFolder>) =
            candidates.iter().partition(|c| c.span.is_range());

        let mut pool = if ranges_take_precedence {
            if ranges.is_empty() { singles } else { ranges }
        } else if singles.is_empty() {
            ranges
        } else {
            singles
        };
        pool.sort_by(|a, b| {
            a.span
                .width()
                .cmp(&b.span.width())
                .then_with(|| a.folder.cmp(&b.folder))
        });

        let mut pool = pool.into_iter();
        let chosen = pool.next()?.clone();
        Some(Resolution {
            chosen,
            contenders: pool.map(|c| c.folder.clone()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_year() {
        assert_eq!(YearSpan::parse("1890"), Some(YearSpan::Single(1890)));
    }

    #[test]
    fn parses_range() {
        assert_eq!(
            YearSpan::parse("1891-1893"),
            Some(YearSpan::Range(1891, 1893))
        );
    }

    #[test]
    fn rejects_inverted_range() {
        assert_eq!(YearSpan::parse("1893-1891"), None);
    }

    #[test]
    fn rejects_non_year_names() {
        for name in ["", "189", "18900", "1890_fixup", "c1890", "1890-", "-1890", "1890-93"] {
            assert_eq!(YearSpan::parse(name), None, "{name:?} should not parse");
        }
    }

    #[test]
    fn degenerate_range_allowed() {
        let span = YearSpan::parse("1890-1890").unwrap();
        assert_eq!(span, YearSpan::Range(1890, 1890));
        assert_eq!(span.width(), 1);
        assert!(span.is_range());
    }

    #[test]
    fn span_accessors() {
        let span = YearSpan::Range(1891, 1893);
        assert_eq!(span.start(), 1891);
        assert_eq!(span.end(), 1893);
        assert_eq!(span.width(), 3);
        assert!(span.contains(1892));
        assert!(!span.contains(1890));
        assert_eq!(span.years().collect::<Vec<_>>(), vec![1891, 1892, 1893]);
    }

    #[test]
    fn index_covers_each_range_year() {
        let (index, unparsed) = YearIndex::build(["1890", "1891-1893"]);
        assert!(unparsed.is_empty());
        assert_eq!(
            index.years().collect::<Vec<_>>(),
            vec![1890, 1891, 1892, 1893]
        );
    }

    #[test]
    fn unparsed_names_reported_sorted() {
        let (index, unparsed) = YearIndex::build(["zz-notes", "1890", "backup"]);
        assert_eq!(index.years().collect::<Vec<_>>(), vec![1890]);
        assert_eq!(unparsed, vec!["backup".to_string(), "zz-notes".to_string()]);
    }

    #[test]
    fn single_wins_by_default() {
        let (index, _) = YearIndex::build(["1890", "1889-1891"]);
        let resolution = index.pick(1890, false).unwrap();
        assert_eq!(resolution.chosen.folder, "1890");
        // Not ambiguous: the kind preference alone decided
        assert!(!resolution.is_ambiguous());
    }

    #[test]
    fn range_wins_when_flag_set() {
        let (index, _) = YearIndex::build(["1890", "1889-1891"]);
        let resolution = index.pick(1890, true).unwrap();
        assert_eq!(resolution.chosen.folder, "1889-1891");
        assert!(!resolution.is_ambiguous());
    }

    #[test]
    fn flag_irrelevant_when_only_one_kind() {
        let (index, _) = YearIndex::build(["1889-1891"]);
        assert_eq!(index.pick(1890, false).unwrap().chosen.folder, "1889-1891");
        let (index, _) = YearIndex::build(["1890"]);
        assert_eq!(index.pick(1890, true).unwrap().chosen.folder, "1890");
    }

    #[test]
    fn overlapping_ranges_prefer_narrowest() {
        let (index, _) = YearIndex::build(["1890-1895", "1893-1894"]);
        let resolution = index.pick(1893, false).unwrap();
        assert_eq!(resolution.chosen.folder, "1893-1894");
        assert!(resolution.is_ambiguous());
        assert_eq!(resolution.contenders, vec!["1890-1895".to_string()]);
    }

    #[test]
    fn equal_width_tie_breaks_lexicographically() {
        let (index, _) = YearIndex::build(["1891-1892", "1890-1891"]);
        let resolution = index.pick(1891, false).unwrap();
        assert_eq!(resolution.chosen.folder, "1890-1891");
        assert!(resolution.is_ambiguous());
    }

    #[test]
    fn uncovered_year_resolves_to_none() {
        let (index, _) = YearIndex::build(["1890"]);
        assert!(index.pick(1891, false).is_none());
    }
}
