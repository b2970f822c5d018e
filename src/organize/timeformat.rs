//! User-facing date format notation.
//!
//! The `--dir-fmt` flag takes the familiar `yyyy/mm` style notation
//! rather than strftime codes. This module converts it to the chrono
//! format string used internally.

/// Conversion table, ordered so longer patterns are consumed before
/// their prefixes (`yyyy` before `yy`, `mmmm` before `mm`). Capture
/// times are zoneless, so zone patterns render a fixed label.
const PATTERNS: &[(&str, &str)] = &[
    ("yyyy", "%Y"),
    ("yy", "%y"),
    ("mmmm", "%B"),
    ("mmm", "%b"),
    ("mm", "%m"),
    ("dddd", "%A"),
    ("ddd", "%a"),
    ("dd", "%d"),
    ("HHT", "%I"),
    ("HH", "%H"),
    ("MM", "%M"),
    ("SS", "%S"),
    ("ss", "%S"),
    ("tt", "%p"),
    ("ZZZ", "UTC"),
    ("Z", "UTC"),
];

/// Convert `yyyy/mm` style notation into a chrono strftime string.
///
/// The input is consumed in a single left-to-right pass, so emitted
/// strftime codes are never re-matched against the table. Characters
/// outside the table pass through unchanged, except `%`, which is
/// escaped so user input can never smuggle in a format code the
/// zoneless datetime cannot render.
#[must_use]
pub fn to_strftime(format: &str) -> String {
    let mut result = String::with_capacity(format.len());
    let mut rest = format;

    'outer: while let Some(ch) = rest.chars().next() {
        for (from, to) in PATTERNS {
            if let Some(tail) = rest.strip_prefix(from) {
                result.push_str(to);
                rest = tail;
                continue 'outer;
            }
        }
        if ch == '%' {
            result.push_str("%%");
        } else {
            result.push(ch);
        }
        rest = &rest[ch.len_utf8()..];
    }

    result
}
