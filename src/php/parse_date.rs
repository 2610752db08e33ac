//! A parser for the absolute subset of PHP `strtotime` format date strings.

// The format names used in the comments below are the ones used by timelib
// <https://github.com/derickr/timelib>, which is what PHP uses.

/// A parser error.
pub(super) type PegError = peg::error::ParseError<peg::str::LineCol>;

/// Parses a date string into its `(year, month, day)` components. The day is
/// not checked against the length of the month.
pub(super) fn parse(text: &str) -> Result<(i32, u8, u8), PegError> {
    strtotime::date(text)
}

/// Expands a two-digit year the same way as timelib.
fn expand_year(year: i32) -> i32 {
    if year < 70 { year + 2000 } else { year + 1900 }
}

peg::parser! {grammar strtotime() for str {
    rule i(lit: &'static str)
        = quiet!{
            input:$([_]*<{lit.chars().count()}>)
            {? if input.eq_ignore_ascii_case(lit) { Ok(()) } else { Err(lit) } }
        } / expected!(lit)
    rule digit() = quiet!{['0'..='9']} / expected!("digit")
    rule alpha() = quiet!{['A'..='Z' | 'a'..='z']} / expected!("letter")

    rule _ = quiet!{[' '|'\t'|'\u{00a0}'|'\u{202f}']+}
    rule sep() = quiet!{[' '|'\t'|'.'|'-'|'\u{00a0}']*}

    rule year4() -> i32
        = quiet!{
            y:$(digit()*<4>) !digit()
            { y.parse().unwrap() }
        } / expected!("four-digit year")
    rule year2() -> i32
        = quiet!{
            y:$(digit()*<2>) !digit()
            { expand_year(y.parse().unwrap()) }
        } / expected!("two-digit year")
    rule year() -> i32 = year4() / year2()

    rule month() -> u8
        = quiet!{
            m:$("1" ['0'..='2'] / "0"? ['1'..='9']) !digit()
            { m.parse().unwrap() }
        } / expected!("month")
    rule day() -> u8
        = quiet!{
            d:$("3" ['0'|'1'] / ['1'|'2'] digit() / "0"? ['1'..='9']) !digit()
            { d.parse().unwrap() }
        } / expected!("day")
    rule day_suffix() = i("st") / i("nd") / i("rd") / i("th")

    rule month_word() -> u8
        = i("january") { 1 } / i("february") { 2 } / i("march") { 3 }
        / i("april") { 4 } / i("may") { 5 } / i("june") { 6 }
        / i("july") { 7 } / i("august") { 8 } / i("september") { 9 }
        / i("october") { 10 } / i("november") { 11 } / i("december") { 12 }
        / i("jan") { 1 } / i("feb") { 2 } / i("mar") { 3 } / i("apr") { 4 }
        / i("jun") { 6 } / i("jul") { 7 } / i("aug") { 8 } / i("sept") { 9 }
        / i("sep") { 9 } / i("oct") { 10 } / i("nov") { 11 } / i("dec") { 12 }
    rule month_name() -> u8
        = quiet!{ m:month_word() "."? !alpha() { m } } / expected!("month name")

    rule calendar() -> (i32, u8, u8)
        // iso8601date4
        = y:year4() "-" m:month() "-" d:day() { (y, m, d) }
        // iso8601dateslash
        / y:year4() "/" m:month() "/" d:day() "/"? { (y, m, d) }
        // gnudateshorter
        / y:year4() "-" m:month() { (y, m, 1) }
        // datenodayrev
        / y:year4() sep() m:month_name() { (y, m, 1) }
        // american
        / m:month() "/" d:day() "/" y:year() { (y, m, d) }
        // pointed date, gnudateshort with day first
        / d:day() ['.'|'-'] m:month() ['.'|'-'] y:year4() { (y, m, d) }
        // datefull
        / d:day() day_suffix()? sep() m:month_name() sep() y:year() { (y, m, d) }
        // datenoday
        / m:month_name() sep() y:year4() { (y, m, 1) }
        // datetextual
        / m:month_name() sep() d:day() day_suffix()? [','|'.'|' '|'\t']* y:year() { (y, m, d) }

    rule hour24() = quiet!{['0'|'1'] digit() / "2" ['0'..='4'] / digit()} / expected!("hour")
    rule hour12() = quiet!{"1" ['0'..='2'] / "0"? ['1'..='9']} / expected!("12-hour hour")
    rule minute() = quiet!{['0'..='5'] digit()} / expected!("minute")
    rule second() = quiet!{['0'..='5'] digit() / "60"} / expected!("second")
    rule frac() = quiet!{['.'|','] digit()+} / expected!("time fraction")
    rule meridian()
        = quiet!{['A'|'a'|'P'|'p'] "."? ['M'|'m'] "."?} / expected!("meridian")
    rule zone()
        = quiet!{
            i("utc") / i("gmt") / ['Z'|'z']
            / ['+'|'-'] digit() digit() (":"? digit() digit())?
        } / expected!("time zone")

    rule time_of_day()
        = hour24() ":" minute() (":" second() frac()?)? _? meridian()? _? zone()?
        / hour12() _? meridian()

    pub rule date() -> (i32, u8, u8)
        = _? d:calendar() (['T'|'t'] / _)? time_of_day()? _? { d }
}}

#[cfg(test)]
mod tests {
    use super::parse;

    #[track_caller]
    fn test_parse(text: &str) -> (i32, u8, u8) {
        match parse(text) {
            Ok(date) => date,
            Err(error) => panic!("{text:?} should parse: {error}"),
        }
    }

    #[track_caller]
    fn test_reject(text: &str) {
        assert!(parse(text).is_err(), "{text:?} should be rejected");
    }

    #[test]
    fn iso8601date4_00() {
        assert_eq!(test_parse("2003-12-01"), (2003, 12, 1));
    }

    #[test]
    fn iso8601date4_01() {
        assert_eq!(test_parse("2007-5-6"), (2007, 5, 6));
    }

    #[test]
    fn iso8601date4_02() {
        assert_eq!(test_parse("2007-05-06 12:07"), (2007, 5, 6));
    }

    #[test]
    fn iso8601date4_03() {
        assert_eq!(test_parse("2007-05-06T12:07:59.123Z"), (2007, 5, 6));
    }

    #[test]
    fn iso8601date4_04() {
        assert_eq!(test_parse("  2010-01-31 23:59:60 +02:00 "), (2010, 1, 31));
    }

    #[test]
    fn iso8601dateslash_00() {
        assert_eq!(test_parse("2003/12/25"), (2003, 12, 25));
    }

    #[test]
    fn iso8601dateslash_01() {
        assert_eq!(test_parse("2003/1/2/"), (2003, 1, 2));
    }

    #[test]
    fn gnudateshorter_00() {
        assert_eq!(test_parse("2004-07"), (2004, 7, 1));
    }

    #[test]
    fn american_00() {
        assert_eq!(test_parse("12/25/2003"), (2003, 12, 25));
    }

    #[test]
    fn american_01() {
        assert_eq!(test_parse("9/11/01"), (2001, 9, 11));
    }

    #[test]
    fn american_02() {
        assert_eq!(test_parse("9/11/99 8pm"), (1999, 9, 11));
    }

    #[test]
    fn pointed_date_00() {
        assert_eq!(test_parse("25.12.2003"), (2003, 12, 25));
    }

    #[test]
    fn pointed_date_01() {
        assert_eq!(test_parse("1-12-2003 10:00 am"), (2003, 12, 1));
    }

    #[test]
    fn datefull_00() {
        assert_eq!(test_parse("1 december 2003"), (2003, 12, 1));
    }

    #[test]
    fn datefull_01() {
        assert_eq!(test_parse("01-Dec-2003"), (2003, 12, 1));
    }

    #[test]
    fn datefull_02() {
        assert_eq!(test_parse("3rd Sept. 69"), (2069, 9, 3));
    }

    #[test]
    fn datenoday_00() {
        assert_eq!(test_parse("december 2003"), (2003, 12, 1));
    }

    #[test]
    fn datenoday_01() {
        assert_eq!(test_parse("Jan 1970"), (1970, 1, 1));
    }

    #[test]
    fn datenodayrev_00() {
        assert_eq!(test_parse("2003 DECEMBER"), (2003, 12, 1));
    }

    #[test]
    fn datetextual_00() {
        assert_eq!(test_parse("December 20, 2003"), (2003, 12, 20));
    }

    #[test]
    fn datetextual_01() {
        assert_eq!(test_parse("may 1st 2008 12:00:00"), (2008, 5, 1));
    }

    #[test]
    fn datetextual_02() {
        assert_eq!(test_parse("mar 5 75"), (1975, 3, 5));
    }

    #[test]
    fn rejects() {
        test_reject("");
        test_reject("2003");
        test_reject("2006-7-35 22:00:00");
        test_reject("2006-13-01");
        test_reject("2006-00-01");
        test_reject("13/01/2006");
        test_reject("decembre 2003");
        test_reject("marc 2003");
        test_reject("2003-12-01 25:00");
        test_reject("now");
        test_reject("next monday");
        test_reject("2003-12-01 garbage");
    }
}
