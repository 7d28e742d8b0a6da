#![forbid(unsafe_code)]

//! Display-width classification tuned for terminal rendering.
//!
//! This is an approximation, not a full Unicode database: zero-width marks
//! and emoji blocks come from the range tables below, East-Asian wide forms
//! from `unicode-width`.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

/// Width reported for control characters, which are never written.
pub const CONTROL: i8 = -1;

const ZERO_WIDTH_RANGES: &[(u32, u32)] = &[
    (0x0300, 0x036F),
    (0x0483, 0x0489),
    (0x0591, 0x05BD),
    (0x0610, 0x061A),
    (0x064B, 0x065F),
    (0x0E31, 0x0E31),
    (0x0E34, 0x0E3A),
    (0x0E47, 0x0E4E),
    (0x1AB0, 0x1AFF),
    (0x1DC0, 0x1DFF),
    (0x200B, 0x200F),
    (0x202A, 0x202E),
    (0x2060, 0x206F),
    (0x20D0, 0x20FF),
    (0x302A, 0x302F),
    (0x3099, 0x309A),
    (0xFE00, 0xFE0F),
    (0xFE20, 0xFE2F),
    (0xFEFF, 0xFEFF),
    (0xE0100, 0xE01EF),
];

const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x231A, 0x231B),
    (0x23E9, 0x23EC),
    (0x23F0, 0x23F0),
    (0x23F3, 0x23F3),
    (0x25FD, 0x25FE),
    (0x2614, 0x2615),
    (0x2648, 0x2653),
    (0x267F, 0x267F),
    (0x2693, 0x2693),
    (0x26A1, 0x26A1),
    (0x26AA, 0x26AB),
    (0x26BD, 0x26BE),
    (0x26C4, 0x26C5),
    (0x26CE, 0x26CE),
    (0x26D4, 0x26D4),
    (0x26EA, 0x26EA),
    (0x26F2, 0x26F5),
    (0x26FA, 0x26FD),
    (0x2705, 0x2705),
    (0x270A, 0x270B),
    (0x2728, 0x2728),
    (0x274C, 0x274C),
    (0x2753, 0x2755),
    (0x2757, 0x2757),
    (0x2795, 0x2797),
    (0x27B0, 0x27B0),
    (0x27BF, 0x27BF),
    (0x2B1B, 0x2B1C),
    (0x2B50, 0x2B50),
    (0x2B55, 0x2B55),
    (0x1F000, 0x1FAFF),
];

#[inline]
fn in_ranges(table: &[(u32, u32)], u: u32) -> bool {
    table
        .binary_search_by(|&(lo, hi)| {
            if u < lo {
                core::cmp::Ordering::Greater
            } else if u > hi {
                core::cmp::Ordering::Less
            } else {
                core::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

#[inline]
fn is_control(c: char) -> bool {
    matches!(c as u32, 0x0000..=0x001F | 0x007F..=0x009F)
}

#[inline]
fn is_zero_width(c: char) -> bool {
    in_ranges(ZERO_WIDTH_RANGES, c as u32)
}

#[inline]
fn is_emoji(c: char) -> bool {
    in_ranges(EMOJI_RANGES, c as u32)
}

/// Width of a single code point: `-1` control, `0` combining/joiner,
/// `2` wide or emoji, `1` otherwise.
#[inline]
pub fn char_width(c: char) -> i8 {
    if c.is_ascii() {
        return if is_control(c) { CONTROL } else { 1 };
    }
    if is_control(c) {
        return CONTROL;
    }
    if is_zero_width(c) {
        return 0;
    }
    if is_emoji(c) || UnicodeWidthChar::width(c) == Some(2) {
        return 2;
    }
    1
}

/// Width of one user-perceived character (extended grapheme cluster).
///
/// The cluster takes the width of its base character; an emoji
/// presentation selector (U+FE0F) forces width 2.
pub fn grapheme_width(grapheme: &str) -> i8 {
    let mut chars = grapheme.chars();
    let Some(first) = chars.next() else {
        return 0;
    };
    let mut width = char_width(first);
    if width == CONTROL {
        return CONTROL;
    }
    for c in chars {
        if c == '\u{FE0F}' {
            return 2;
        }
        if width == 0 {
            width = char_width(c).max(0);
        }
    }
    width
}

/// Total display width of `text`, ignoring control characters.
pub fn display_width(text: &str) -> usize {
    if text.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
        return text.len();
    }
    text.graphemes(true)
        .map(|g| grapheme_width(g).max(0) as usize)
        .sum()
}
