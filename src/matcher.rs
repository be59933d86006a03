//! Emoji detection over text chunks.
//!
//! Matching is per codepoint: `"🎉🎉🎉"` yields three matches and stripping
//! removes exactly the codepoints `find_all` reports. Sequences joined with
//! ZWJ or skin-tone modifiers are not treated as a unit.

use std::borrow::Cow;
use std::cmp::Ordering;

use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;

/// Detection backend shared by the scanner and the file processor.
pub trait EmojiMatcher: Send + Sync {
    /// Short label shown in the run header.
    fn name(&self) -> &'static str;

    /// Every matched codepoint in order of occurrence, duplicates kept.
    fn find_all<'t>(&self, text: &'t str) -> Vec<&'t str>;

    /// `text` with all matched codepoints removed. Borrowed when nothing matched.
    fn strip<'t>(&self, text: &'t str) -> Cow<'t, str>;
}

/// Inclusive codepoint interval with a descriptive label.
#[derive(Debug, Clone, Copy)]
pub struct EmojiRange {
    pub lo: char,
    pub hi: char,
    pub category: &'static str,
}

const fn range(lo: char, hi: char, category: &'static str) -> EmojiRange {
    EmojiRange { lo, hi, category }
}

const fn single(c: char, category: &'static str) -> EmojiRange {
    EmojiRange {
        lo: c,
        hi: c,
        category,
    }
}

/// Sorted, disjoint. CJK ideographs, math operators and plain enclosed
/// alphanumerics are intentionally absent.
pub static EMOJI_RANGES: &[EmojiRange] = &[
    range('\u{23E9}', '\u{23F3}', "media controls"),
    range('\u{23F8}', '\u{23FA}', "media controls"),
    single('\u{25B6}', "play button"),
    single('\u{25C0}', "reverse button"),
    range('\u{2600}', '\u{2604}', "weather"),
    single('\u{2611}', "ballot box with check"),
    range('\u{2614}', '\u{2615}', "umbrella, hot beverage"),
    single('\u{2618}', "shamrock"),
    single('\u{261D}', "index pointing up"),
    single('\u{2620}', "skull and crossbones"),
    range('\u{2622}', '\u{2623}', "radioactive, biohazard"),
    single('\u{2626}', "orthodox cross"),
    single('\u{262A}', "star and crescent"),
    range('\u{262E}', '\u{262F}', "peace, yin yang"),
    range('\u{2638}', '\u{263A}', "wheel of dharma, faces"),
    single('\u{2640}', "female sign"),
    single('\u{2642}', "male sign"),
    range('\u{2648}', '\u{2653}', "zodiac"),
    single('\u{2668}', "hot springs"),
    single('\u{267B}', "recycling"),
    range('\u{267E}', '\u{267F}', "infinity, wheelchair"),
    range('\u{2692}', '\u{2697}', "tools"),
    single('\u{2699}', "gear"),
    range('\u{269B}', '\u{269C}', "atom, fleur-de-lis"),
    range('\u{26A0}', '\u{26A1}', "warning, high voltage"),
    single('\u{26A7}', "transgender symbol"),
    range('\u{26AA}', '\u{26AB}', "circles"),
    range('\u{26B0}', '\u{26B1}', "coffin, urn"),
    range('\u{26BD}', '\u{26BE}', "soccer, baseball"),
    range('\u{26C4}', '\u{26C5}', "snowman, sun behind cloud"),
    single('\u{26C8}', "thunder cloud"),
    range('\u{26CE}', '\u{26CF}', "ophiuchus, pick"),
    single('\u{26D1}', "rescue helmet"),
    range('\u{26D3}', '\u{26D4}', "chains, no entry"),
    range('\u{26E9}', '\u{26EA}', "shrine, church"),
    range('\u{26F0}', '\u{26F5}', "mountain, outdoor"),
    range('\u{26F7}', '\u{26FA}', "skier, tent"),
    single('\u{26FD}', "fuel pump"),
    range('\u{2702}', '\u{2704}', "scissors"),
    range('\u{2708}', '\u{270D}', "airplane, envelope, hands"),
    single('\u{270F}', "pencil"),
    single('\u{2712}', "black nib"),
    single('\u{2714}', "heavy check mark"),
    single('\u{2716}', "heavy multiplication x"),
    single('\u{271D}', "latin cross"),
    single('\u{2721}', "star of david"),
    single('\u{2728}', "sparkles"),
    range('\u{2733}', '\u{2734}', "eight-spoked asterisk"),
    single('\u{2744}', "snowflake"),
    single('\u{2747}', "sparkle"),
    single('\u{274C}', "cross mark"),
    single('\u{274E}', "cross mark button"),
    range('\u{2753}', '\u{2755}', "question and exclamation marks"),
    single('\u{2757}', "heavy exclamation mark"),
    range('\u{2763}', '\u{2764}', "hearts"),
    range('\u{2795}', '\u{2797}', "heavy plus, minus, division"),
    single('\u{27A1}', "right arrow"),
    single('\u{27B0}', "curly loop"),
    single('\u{27BF}', "double curly loop"),
    range('\u{2B05}', '\u{2B07}', "arrows"),
    range('\u{2B1B}', '\u{2B1C}', "large squares"),
    single('\u{2B50}', "star"),
    single('\u{2B55}', "heavy large circle"),
    single('\u{3030}', "wavy dash"),
    single('\u{303D}', "part alternation mark"),
    single('\u{1F004}', "mahjong red dragon"),
    single('\u{1F0CF}', "joker"),
    range('\u{1F170}', '\u{1F171}', "blood types A, B"),
    range('\u{1F17E}', '\u{1F17F}', "blood type O, parking"),
    single('\u{1F18E}', "blood type AB"),
    range('\u{1F191}', '\u{1F19A}', "squared letters"),
    range('\u{1F1E0}', '\u{1F1FF}', "regional indicators"),
    range('\u{1F201}', '\u{1F202}', "squared katakana"),
    single('\u{1F21A}', "squared free of charge"),
    single('\u{1F22F}', "squared reserved"),
    range('\u{1F232}', '\u{1F23A}', "squared ideographs"),
    range('\u{1F250}', '\u{1F251}', "circled ideographs"),
    range('\u{1F300}', '\u{1F5FF}', "misc symbols and pictographs"),
    range('\u{1F600}', '\u{1F64F}', "emoticons"),
    range('\u{1F680}', '\u{1F6FF}', "transport and map"),
    range('\u{1F900}', '\u{1F9FF}', "supplemental symbols and pictographs"),
    range('\u{1FA00}', '\u{1FA6F}', "chess symbols"),
    range('\u{1FA70}', '\u{1FAFF}', "symbols and pictographs extended-A"),
];

/// Binary search over [`EMOJI_RANGES`].
pub fn is_emoji(c: char) -> bool {
    EMOJI_RANGES
        .binary_search_by(|r| {
            if r.hi < c {
                Ordering::Less
            } else if r.lo > c {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
        .is_ok()
}

/// Matcher backed by the static range table.
#[derive(Debug, Default, Clone, Copy)]
pub struct RangeTableMatcher;

impl EmojiMatcher for RangeTableMatcher {
    fn name(&self) -> &'static str {
        "range table"
    }

    fn find_all<'t>(&self, text: &'t str) -> Vec<&'t str> {
        text.char_indices()
            .filter(|(_, c)| is_emoji(*c))
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect()
    }

    fn strip<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if !text.chars().any(is_emoji) {
            return Cow::Borrowed(text);
        }
        Cow::Owned(text.chars().filter(|c| !is_emoji(*c)).collect())
    }
}

// One codepoint per match, same granularity as the range table.
static PICTOGRAPHIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Extended_Pictographic}\p{Regional_Indicator}]")
        .expect("Invalid PICTOGRAPHIC_RE regex")
});

/// Matcher backed by the Unicode emoji properties compiled into `regex`.
/// Broader than the range table: it also covers symbols such as © and ™.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodePropertyMatcher;

impl EmojiMatcher for UnicodePropertyMatcher {
    fn name(&self) -> &'static str {
        "unicode properties"
    }

    fn find_all<'t>(&self, text: &'t str) -> Vec<&'t str> {
        PICTOGRAPHIC_RE
            .find_iter(text)
            .map(|m| m.as_str())
            .collect()
    }

    fn strip<'t>(&self, text: &'t str) -> Cow<'t, str> {
        PICTOGRAPHIC_RE.replace_all(text, "")
    }
}

/// Which detection backend to use for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MatcherKind {
    /// Curated codepoint range table
    #[default]
    Table,
    /// Unicode Extended_Pictographic property
    Unicode,
}

static RANGE_TABLE: RangeTableMatcher = RangeTableMatcher;
static UNICODE_PROPERTIES: UnicodePropertyMatcher = UnicodePropertyMatcher;

/// Resolve the backend once at start-up; callers hold the reference for the run.
pub fn select_matcher(kind: MatcherKind) -> &'static dyn EmojiMatcher {
    match kind {
        MatcherKind::Table => &RANGE_TABLE,
        MatcherKind::Unicode => &UNICODE_PROPERTIES,
    }
}
