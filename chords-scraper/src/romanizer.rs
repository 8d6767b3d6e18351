//! CJK line transliteration
//!
//! Produces the `romaji` companion of a chord-sheet line. Chord markers
//! (`{Am7}`) pass through untouched; everything between them is romanized:
//! kana and kanji via kakasi (Hepburn), Hangul syllables via Revised
//! Romanization.
//!
//! Lines without any CJK codepoint short-circuit to an empty string, which
//! means "nothing to transliterate" rather than "transliterated to nothing".

use once_cell::sync::Lazy;
use regex::Regex;

static CHORD_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{.*?\}").expect("chord marker pattern is valid"));

const HANGUL_FIRST: u32 = 0xAC00;
const HANGUL_LAST: u32 = 0xD7A3;

const INITIALS: [&str; 19] = [
    "g", "kk", "n", "d", "tt", "r", "m", "b", "pp", "s", "ss", "", "j", "jj", "ch", "k", "t",
    "p", "h",
];

const MEDIALS: [&str; 21] = [
    "a", "ae", "ya", "yae", "eo", "e", "yeo", "ye", "o", "wa", "wae", "oe", "yo", "u", "wo", "we",
    "wi", "yu", "eu", "ui", "i",
];

const FINALS: [&str; 28] = [
    "", "k", "k", "k", "n", "n", "n", "t", "l", "k", "m", "l", "l", "l", "p", "l", "m", "p", "p",
    "t", "t", "ng", "t", "t", "k", "t", "p", "t",
];

/// Hiragana, Katakana, CJK Unified Ideographs, Hangul
fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x30FF | 0x4E00..=0x9FFF | 0xAC00..=0xD7AF)
}

fn is_hangul_syllable(c: char) -> bool {
    (HANGUL_FIRST..=HANGUL_LAST).contains(&(c as u32))
}

pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

/// Romanize one chord-annotated line
///
/// Returns `""` when the line holds no CJK text.
pub fn romanize_line(line: &str) -> String {
    if !contains_cjk(line) {
        return String::new();
    }

    let mut out = String::with_capacity(line.len() * 2);
    let mut last = 0;
    for marker in CHORD_MARKER.find_iter(line) {
        push_segment(&mut out, &line[last..marker.start()]);
        out.push_str(marker.as_str());
        last = marker.end();
    }
    push_segment(&mut out, &line[last..]);
    out
}

fn push_segment(out: &mut String, segment: &str) {
    if segment.trim().is_empty() {
        out.push_str(segment);
    } else {
        out.push_str(romanize_text(segment).trim());
    }
}

/// Romanize free text with no chord markers
fn romanize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut run = String::new();
    let mut run_is_hangul = false;

    for c in text.chars() {
        let hangul = is_hangul_syllable(c);
        if !run.is_empty() && hangul != run_is_hangul {
            flush_run(&mut out, &run, run_is_hangul);
            run.clear();
        }
        run_is_hangul = hangul;
        run.push(c);
    }
    if !run.is_empty() {
        flush_run(&mut out, &run, run_is_hangul);
    }
    out
}

fn flush_run(out: &mut String, run: &str, hangul: bool) {
    if hangul {
        out.push_str(&romanize_hangul(run));
    } else if run.is_ascii() {
        out.push_str(run);
    } else {
        out.push_str(&kakasi::convert(run).romaji);
    }
}

/// Revised Romanization of Hangul syllables, letter by letter
///
/// Non-syllable characters are copied as-is.
pub fn romanize_hangul(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if !is_hangul_syllable(c) {
            out.push(c);
            continue;
        }
        let index = (c as u32 - HANGUL_FIRST) as usize;
        out.push_str(INITIALS[index / 588]);
        out.push_str(MEDIALS[(index % 588) / 28]);
        out.push_str(FINALS[index % 28]);
    }
    out
}
