//! Codepoint interval tables and lookup.
//!
//! Two hand-maintained source tables, one of zero-width combining marks and
//! one of East Asian wide ranges, are merged once into a single sorted
//! [`IntervalTable`] tagged with a [`WidthClass`]. Combining marks take
//! precedence: wide ranges are split around any combining range they cover.

use std::sync::LazyLock;

/// Width class attached to an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidthClass {
    /// Combining marks and format characters that occupy no column.
    Zero,
    /// East Asian wide and fullwidth characters that occupy two columns.
    Wide,
}

/// A closed codepoint range `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub lo: u32,
    pub hi: u32,
    pub class: WidthClass,
}

/// Sorted, non-overlapping intervals searchable by codepoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalTable {
    ranges: Vec<Interval>,
}

impl IntervalTable {
    /// Merge layers of `(class, ranges)` into one table.
    ///
    /// Earlier layers win: any part of a later range already claimed by an
    /// earlier layer is cut out. Ranges within a layer may be unsorted but
    /// must not overlap each other.
    #[must_use]
    pub fn from_layers(layers: &[(WidthClass, &[(u32, u32)])]) -> Self {
        let mut ranges: Vec<Interval> = Vec::new();
        for &(class, layer) in layers {
            let mut added = Vec::new();
            for &(lo, hi) in layer {
                subtract_claimed(&ranges, lo, hi, &mut |lo, hi| {
                    added.push(Interval { lo, hi, class });
                });
            }
            ranges.extend(added);
            ranges.sort_unstable_by_key(|r| r.lo);
        }
        Self { ranges }
    }

    /// Class of `cp`, or `None` when no interval contains it.
    #[must_use]
    pub fn classify(&self, cp: u32) -> Option<WidthClass> {
        let (first, last) = (self.ranges.first()?, self.ranges.last()?);
        if cp < first.lo || cp > last.hi {
            return None;
        }
        self.ranges
            .binary_search_by(|r| {
                if r.hi < cp {
                    std::cmp::Ordering::Less
                } else if r.lo > cp {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .ok()
            .map(|idx| self.ranges[idx].class)
    }

    #[must_use]
    pub fn ranges(&self) -> &[Interval] { &self.ranges }
}

/// Emit the pieces of `[lo, hi]` not covered by `claimed` (sorted by `lo`).
fn subtract_claimed(claimed: &[Interval], lo: u32, hi: u32, emit: &mut impl FnMut(u32, u32)) {
    let mut start = lo;
    for r in claimed {
        if r.hi < start {
            continue;
        }
        if r.lo > hi {
            break;
        }
        if r.lo > start {
            emit(start, r.lo - 1);
        }
        if r.hi >= hi {
            return;
        }
        start = r.hi + 1;
    }
    emit(start, hi);
}

/// Membership test over a sorted table of closed ranges.
#[must_use]
pub fn in_ranges(cp: u32, table: &[(u32, u32)]) -> bool {
    let (Some(first), Some(last)) = (table.first(), table.last()) else {
        return false;
    };
    if cp < first.0 || cp > last.1 {
        return false;
    }
    table
        .binary_search_by(|&(lo, hi)| {
            if hi < cp {
                std::cmp::Ordering::Less
            } else if lo > cp {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

/// Process-wide width table, built on first use.
pub static WIDTH_TABLE: LazyLock<IntervalTable> = LazyLock::new(|| {
    IntervalTable::from_layers(&[(WidthClass::Zero, COMBINING), (WidthClass::Wide, WIDE)])
});

/// Look up the width class of `cp` in [`WIDTH_TABLE`].
#[inline]
#[must_use]
pub fn classify(cp: u32) -> Option<WidthClass> { WIDTH_TABLE.classify(cp) }

/// East Asian wide ranges: Hangul Jamo initial consonants, the angle
/// brackets, CJK radicals through Yi (minus U+303F), Hangul syllables, CJK
/// compatibility ideographs, vertical and compatibility forms, fullwidth
/// forms and the two supplementary ideographic planes.
pub const WIDE: &[(u32, u32)] = &[
    (0x1100, 0x115F),
    (0x2329, 0x232A),
    (0x2E80, 0x303E),
    (0x3040, 0xA4CF),
    (0xAC00, 0xD7A3),
    (0xF900, 0xFAFF),
    (0xFE10, 0xFE19),
    (0xFE30, 0xFE6F),
    (0xFF00, 0xFF60),
    (0xFFE0, 0xFFE6),
    (0x20000, 0x2FFFD),
    (0x30000, 0x3FFFD),
];

/// Nonspacing marks, enclosing marks and format characters (general
/// categories Mn, Me and Cf), plus the Hangul medial vowels and final
/// consonants which render on top of the preceding initial consonant.
pub const COMBINING: &[(u32, u32)] = &[
    (0x0300, 0x036F),
    (0x0483, 0x0486),
    (0x0488, 0x0489),
    (0x0591, 0x05BD),
    (0x05BF, 0x05BF),
    (0x05C1, 0x05C2),
    (0x05C4, 0x05C5),
    (0x05C7, 0x05C7),
    (0x0600, 0x0603),
    (0x0610, 0x0615),
    (0x064B, 0x065E),
    (0x0670, 0x0670),
    (0x06D6, 0x06E4),
    (0x06E7, 0x06E8),
    (0x06EA, 0x06ED),
    (0x070F, 0x070F),
    (0x0711, 0x0711),
    (0x0730, 0x074A),
    (0x07A6, 0x07B0),
    (0x07EB, 0x07F3),
    (0x0901, 0x0902),
    (0x093C, 0x093C),
    (0x0941, 0x0948),
    (0x094D, 0x094D),
    (0x0951, 0x0954),
    (0x0962, 0x0963),
    (0x0981, 0x0981),
    (0x09BC, 0x09BC),
    (0x09C1, 0x09C4),
    (0x09CD, 0x09CD),
    (0x09E2, 0x09E3),
    (0x0A01, 0x0A02),
    (0x0A3C, 0x0A3C),
    (0x0A41, 0x0A42),
    (0x0A47, 0x0A48),
    (0x0A4B, 0x0A4D),
    (0x0A70, 0x0A71),
    (0x0A81, 0x0A82),
    (0x0ABC, 0x0ABC),
    (0x0AC1, 0x0AC5),
    (0x0AC7, 0x0AC8),
    (0x0ACD, 0x0ACD),
    (0x0AE2, 0x0AE3),
    (0x0B01, 0x0B01),
    (0x0B3C, 0x0B3C),
    (0x0B3F, 0x0B3F),
    (0x0B41, 0x0B43),
    (0x0B4D, 0x0B4D),
    (0x0B56, 0x0B56),
    (0x0B82, 0x0B82),
    (0x0BC0, 0x0BC0),
    (0x0BCD, 0x0BCD),
    (0x0C3E, 0x0C40),
    (0x0C46, 0x0C48),
    (0x0C4A, 0x0C4D),
    (0x0C55, 0x0C56),
    (0x0CBC, 0x0CBC),
    (0x0CBF, 0x0CBF),
    (0x0CC6, 0x0CC6),
    (0x0CCC, 0x0CCD),
    (0x0CE2, 0x0CE3),
    (0x0D41, 0x0D43),
    (0x0D4D, 0x0D4D),
    (0x0DCA, 0x0DCA),
    (0x0DD2, 0x0DD4),
    (0x0DD6, 0x0DD6),
    (0x0E31, 0x0E31),
    (0x0E34, 0x0E3A),
    (0x0E47, 0x0E4E),
    (0x0EB1, 0x0EB1),
    (0x0EB4, 0x0EB9),
    (0x0EBB, 0x0EBC),
    (0x0EC8, 0x0ECD),
    (0x0F18, 0x0F19),
    (0x0F35, 0x0F35),
    (0x0F37, 0x0F37),
    (0x0F39, 0x0F39),
    (0x0F71, 0x0F7E),
    (0x0F80, 0x0F84),
    (0x0F86, 0x0F87),
    (0x0F90, 0x0F97),
    (0x0F99, 0x0FBC),
    (0x0FC6, 0x0FC6),
    (0x102D, 0x1030),
    (0x1032, 0x1032),
    (0x1036, 0x1037),
    (0x1039, 0x1039),
    (0x1058, 0x1059),
    (0x1160, 0x11FF),
    (0x135F, 0x135F),
    (0x1712, 0x1714),
    (0x1732, 0x1734),
    (0x1752, 0x1753),
    (0x1772, 0x1773),
    (0x17B4, 0x17B5),
    (0x17B7, 0x17BD),
    (0x17C6, 0x17C6),
    (0x17C9, 0x17D3),
    (0x17DD, 0x17DD),
    (0x180B, 0x180D),
    (0x18A9, 0x18A9),
    (0x1920, 0x1922),
    (0x1927, 0x1928),
    (0x1932, 0x1932),
    (0x1939, 0x193B),
    (0x1A17, 0x1A18),
    (0x1B00, 0x1B03),
    (0x1B34, 0x1B34),
    (0x1B36, 0x1B3A),
    (0x1B3C, 0x1B3C),
    (0x1B42, 0x1B42),
    (0x1B6B, 0x1B73),
    (0x1DC0, 0x1DCA),
    (0x1DFE, 0x1DFF),
    (0x200B, 0x200F),
    (0x202A, 0x202E),
    (0x2060, 0x2063),
    (0x206A, 0x206F),
    (0x20D0, 0x20EF),
    (0x302A, 0x302F),
    (0x3099, 0x309A),
    (0xA806, 0xA806),
    (0xA80B, 0xA80B),
    (0xA825, 0xA826),
    (0xFB1E, 0xFB1E),
    (0xFE00, 0xFE0F),
    (0xFE20, 0xFE23),
    (0xFEFF, 0xFEFF),
    (0xFFF9, 0xFFFB),
    (0x10A01, 0x10A03),
    (0x10A05, 0x10A06),
    (0x10A0C, 0x10A0F),
    (0x10A38, 0x10A3A),
    (0x10A3F, 0x10A3F),
    (0x1D167, 0x1D169),
    (0x1D173, 0x1D182),
    (0x1D185, 0x1D18B),
    (0x1D1AA, 0x1D1AD),
    (0x1D242, 0x1D244),
    (0xE0001, 0xE0001),
    (0xE0020, 0xE007F),
    (0xE0100, 0xE01EF),
];

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn assert_sorted_disjoint(table: &[(u32, u32)]) {
        for &(lo, hi) in table {
            assert!(lo <= hi, "inverted range {lo:#X}..{hi:#X}");
        }
        for pair in table.windows(2) {
            assert!(
                pair[0].1 < pair[1].0,
                "ranges {:#X?} and {:#X?} overlap or are unsorted",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn source_tables_are_sorted_and_disjoint() {
        assert_sorted_disjoint(COMBINING);
        assert_sorted_disjoint(WIDE);
    }

    #[test]
    fn merged_table_is_sorted_and_disjoint() {
        let pairs: Vec<_> = WIDTH_TABLE.ranges().iter().map(|r| (r.lo, r.hi)).collect();
        assert_sorted_disjoint(&pairs);
    }

    #[rstest]
    #[case(0x0301, Some(WidthClass::Zero))]
    #[case(0x200B, Some(WidthClass::Zero))]
    #[case(0x1160, Some(WidthClass::Zero))]
    #[case(0xE01EF, Some(WidthClass::Zero))]
    #[case(0x1100, Some(WidthClass::Wide))]
    #[case(0x304F, Some(WidthClass::Wide))]
    #[case(0xAC00, Some(WidthClass::Wide))]
    #[case(0xFF21, Some(WidthClass::Wide))]
    #[case(0x2A6D6, Some(WidthClass::Wide))]
    #[case(0x0041, None)]
    #[case(0x303F, None)]
    #[case(0xD7A4, None)]
    #[case(0x10FFFF, None)]
    fn classifies_codepoints(#[case] cp: u32, #[case] expected: Option<WidthClass>) {
        assert_eq!(classify(cp), expected);
    }

    #[test]
    fn combining_marks_inside_wide_blocks_win() {
        // Ideographic tone marks and kana voicing marks sit inside wide blocks.
        assert_eq!(classify(0x302A), Some(WidthClass::Zero));
        assert_eq!(classify(0x3099), Some(WidthClass::Zero));
        assert_eq!(classify(0x3029), Some(WidthClass::Wide));
        assert_eq!(classify(0x3030), Some(WidthClass::Wide));
        assert_eq!(classify(0x309B), Some(WidthClass::Wide));
    }

    #[test]
    fn from_layers_splits_later_ranges() {
        let zero: &[(u32, u32)] = &[(5, 6), (9, 9)];
        let wide: &[(u32, u32)] = &[(1, 10)];
        let table = IntervalTable::from_layers(&[(WidthClass::Zero, zero), (WidthClass::Wide, wide)]);
        let pairs: Vec<_> = table.ranges().iter().map(|r| (r.lo, r.hi, r.class)).collect();
        assert_eq!(
            pairs,
            vec![
                (1, 4, WidthClass::Wide),
                (5, 6, WidthClass::Zero),
                (7, 8, WidthClass::Wide),
                (9, 9, WidthClass::Zero),
                (10, 10, WidthClass::Wide),
            ]
        );
    }

    #[test]
    fn from_layers_drops_fully_covered_ranges() {
        let zero: &[(u32, u32)] = &[(1, 10)];
        let wide: &[(u32, u32)] = &[(3, 4)];
        let table = IntervalTable::from_layers(&[(WidthClass::Zero, zero), (WidthClass::Wide, wide)]);
        assert_eq!(table.ranges().len(), 1);
        assert_eq!(table.classify(3), Some(WidthClass::Zero));
    }

    #[test]
    fn in_ranges_handles_bounds_and_empty_tables() {
        assert!(in_ranges(0x0300, COMBINING));
        assert!(in_ranges(0x036F, COMBINING));
        assert!(!in_ranges(0x0370, COMBINING));
        assert!(!in_ranges(0, COMBINING));
        assert!(!in_ranges(0x41, &[]));
    }

    #[test]
    fn concurrent_first_use_sees_one_table() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| std::ptr::from_ref(&*WIDTH_TABLE) as usize))
            .collect();
        let addrs: Vec<usize> = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .collect();
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    }
}
