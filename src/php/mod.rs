//! PHP compatible functions and types.

use std::borrow::Cow;
use time::{Date, Duration, Month};

mod parse_date;

/// A date parsing error.
#[derive(Debug, thiserror::Error)]
pub(crate) enum DateTimeParseError {
    /// Invalid input string.
    #[error("invalid input: {0}")]
    Parse(#[from] parse_date::PegError),

    /// A date component was out of range of a calendar unit.
    #[error(transparent)]
    ComponentRange(#[from] time::error::ComponentRange),

    /// The day overflowed into a year that cannot be represented.
    #[error("date out of range")]
    Overflow,
}

/// Parses a free-form date string like [`strtotime`](https://php.net/strtotime)
/// and returns the calendar date it names.
///
/// Only absolute dates are supported; relative formats like “next monday”
/// are rejected. A time of day may follow the date but does not affect the
/// result. Like PHP, a day which is past the end of the month rolls over into
/// the next month.
pub fn strtotime(text: &str) -> Result<Date, DateTimeParseError> {
    let (year, month, day) = parse_date::parse(text)?;
    let first = Date::from_calendar_date(year, Month::try_from(month)?, 1)?;
    first
        .checked_add(Duration::days(i64::from(day) - 1))
        .ok_or(DateTimeParseError::Overflow)
}

/// Formats a date as `YYYY/MM/DD`, like `strftime("%Y/%m/%d")`.
pub fn format_ymd(date: Date) -> String {
    format!(
        "{:04}/{:02}/{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Parses the longest numeric prefix of a string like
/// [`floatval`](https://php.net/floatval). Returns 0.0 if there is no number.
pub fn floatval(n: &str) -> f64 {
    let n = n.trim_start();
    let b = n.as_bytes();
    let digits = |mut at: usize| {
        while b.get(at).is_some_and(u8::is_ascii_digit) {
            at += 1;
        }
        at
    };

    let start = usize::from(matches!(b.first(), Some(b'+' | b'-')));
    let int_end = digits(start);
    let mut end = int_end;
    if b.get(end) == Some(&b'.') {
        let frac_end = digits(end + 1);
        if frac_end > end + 1 || int_end > start {
            end = frac_end;
        }
    }
    if end == start {
        return 0.0;
    }

    if matches!(b.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(b.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits(end + 1 + sign);
        if exp_end > end + 1 + sign {
            end = exp_end;
        }
    }

    n[..end].parse().unwrap_or(0.0)
}

/// Finds and replaces substrings in the input like [`strtr`](https://php.net/strtr).
/// To avoid extra temporary allocation, `replacements` should be ordered from
/// longest to shortest match.
pub fn strtr<'a>(input: &'a str, replacements: &[(&str, &str)]) -> Cow<'a, str> {
    let replacements = if replacements.is_sorted_by(|(a, _), (b, _)| a.len() >= b.len()) {
        Cow::Borrowed(replacements)
    } else {
        let mut replacements = Vec::from(replacements);
        replacements.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
        Cow::Owned(replacements)
    };

    let mut iter = input.char_indices();
    let mut out = String::new();
    let mut flushed = 0;
    'next: while iter.offset() != input.len() {
        for (find, replace) in replacements.iter() {
            if iter.as_str().starts_with(find) {
                out += &input[flushed..iter.offset()];
                out += *replace;
                flushed = iter.offset() + find.len();
                for _ in 0..find.chars().count() {
                    iter.next();
                }
                continue 'next;
            }
        }
        iter.next();
    }

    if flushed == 0 && out.is_empty() {
        Cow::Borrowed(input)
    } else {
        out += &input[flushed..];
        Cow::Owned(out)
    }
}

/// Casts a float to a string similar to [`strval`](https://www.php.net/strval).
pub fn strval(n: f64) -> String {
    match n {
        f64::INFINITY => return "INF".into(),
        f64::NEG_INFINITY => return "-INF".into(),
        n if n.is_nan() => return "NAN".into(),
        _ => {}
    }

    // PHP `precision` ini default
    let len = 14_usize;

    // Clippy: Truncation and sign loss is deliberate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let whole = n.abs() as u64;
    let (len, exp) = if whole == 0 {
        (Some(len), 0)
    } else {
        let exp = whole.ilog10() as usize;
        (len.checked_sub(exp + 1), exp)
    };
    if let Some(len) = len {
        let mut s = format!("{n:.len$}");
        let b = s.as_bytes();
        let end = b
            .iter()
            .rposition(|c| *c != b'0')
            .map_or(b.len(), |e| e + usize::from(b[e] != b'.'));
        s.truncate(end);
        if s == "-0" {
            s.remove(0);
        }
        s
    } else {
        // Clippy: The number is always positive and in range.
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        {
            format!("{:.13}E+{exp}", n / 10.0_f64.powi(exp as i32))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floatval() {
        assert_eq!(floatval("122.34343The"), 122.34343);
        assert_eq!(floatval("1,200"), 1.0);
        assert_eq!(floatval("  -4.5"), -4.5);
        assert_eq!(floatval("1e3x"), 1000.0);
        assert_eq!(floatval("1e"), 1.0);
        assert_eq!(floatval("1.5-3"), 1.5);
        assert_eq!(floatval("abc"), 0.0);
        assert_eq!(floatval(""), 0.0);
        assert_eq!(floatval(".5x"), 0.5);
        assert_eq!(floatval("5.e2"), 500.0);
        assert_eq!(floatval("-.e5"), 0.0);
        assert_eq!(floatval("2E-2"), 0.02);
        assert_eq!(floatval("3e+"), 3.0);
        assert_eq!(floatval(&format!("1{}", "e+".repeat(50_000))), 1.0);
        assert_eq!(floatval(&format!("7{}", "-".repeat(50_000))), 7.0);
    }

    #[test]
    fn test_strtr() {
        let input = "hello, world!";

        // longest first
        assert_eq!(
            strtr(input, &[("ll", "lol"), ("hello", "goodbye")]),
            Cow::<str>::Owned(String::from("goodbye, world!"))
        );

        // do not match already matched
        assert_eq!(
            strtr(input, &[("hello", "world"), ("world", "universe")]),
            Cow::<str>::Owned(String::from("world, universe!"))
        );

        // return original if no match
        assert_eq!(
            strtr(input, &[("foo", "bar")]),
            Cow::Borrowed("hello, world!")
        );

        // a match at the very start that removes text is still a change
        assert_eq!(strtr("''a", &[("''", "")]), "a");
        assert_eq!(strtr("é'é", &[("'", "\\'")]), "é\\'é");
    }

    #[test]
    fn test_strval() {
        assert_eq!(strval(f64::INFINITY), "INF");
        assert_eq!(strval(f64::NAN), "NAN");
        assert_eq!(strval(0.0), "0");
        assert_eq!(strval(-0.0), "0");
        assert_eq!(strval(0.1 + 0.2), "0.3");
        assert_eq!(strval(100.0), "100");
        assert_eq!(strval(-5.0), "-5");
        assert_eq!(strval(1234.56), "1234.56");
        assert_eq!(strval(12_345_678_901_234.0), "12345678901234");
        assert_eq!(strval(123_456_789_012_346.0), "1.2345678901235E+14");
    }

    #[test]
    fn test_strtotime() {
        let ymd = |text| strtotime(text).map(format_ymd).ok();
        assert_eq!(ymd("december 2003").as_deref(), Some("2003/12/01"));
        assert_eq!(ymd("2007-05-06 12:07").as_deref(), Some("2007/05/06"));
        assert_eq!(ymd("2003-02-30").as_deref(), Some("2003/03/02"));
        assert_eq!(ymd("2004-02-29").as_deref(), Some("2004/02/29"));
        assert_eq!(ymd("2006-7-35 22:00:00"), None);
        assert_eq!(ymd("yesterday"), None);
        assert_eq!(ymd(""), None);
    }
}
