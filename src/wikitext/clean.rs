//! Removal of Wikitext markup from a table so that only cell text remains.

use crate::php::strtr;
use regex::{Captures, Regex, RegexBuilder};
use std::{borrow::Cow, sync::LazyLock};

/// What a cleaning rule does to the text.
enum Action {
    /// Replaces every match of the pattern with the given replacement
    /// expression.
    Replace(Regex, &'static str),
    /// Replaces every match of the pattern with the output of a function.
    Rewrite(Regex, fn(&Captures<'_>) -> String),
    /// Replaces literal substrings.
    Translate(&'static [(&'static str, &'static str)]),
}

/// A named markup cleaning rule.
pub(crate) struct Rule {
    /// The name of the rule, for diagnostics.
    pub name: &'static str,
    /// The transformation.
    action: Action,
}

impl Rule {
    /// Applies this rule to `text`.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match &self.action {
            Action::Replace(pattern, with) => pattern.replace_all(text, *with),
            Action::Rewrite(pattern, f) => pattern.replace_all(text, |caps: &Captures<'_>| f(caps)),
            Action::Translate(pairs) => strtr(text, pairs),
        }
    }
}

impl core::fmt::Debug for Rule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Builds a case-insensitive pattern where `.` also matches line breaks.
fn pattern(source: &str) -> Regex {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .unwrap()
}

/// The cleaning rules, in the order they are applied. Applying the whole list
/// twice gives the same result as applying it once.
pub(crate) static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule {
            name: "ref",
            action: Action::Replace(pattern(r"<ref(?:\s[^>]*[^/>])?\s*>.*?</ref\s*>"), ""),
        },
        Rule {
            name: "ref-self-closing",
            action: Action::Replace(pattern(r"<ref(?:\s[^>]*)?/\s*>"), ""),
        },
        Rule {
            name: "comment",
            action: Action::Replace(pattern(r"<!--.*?-->"), ""),
        },
        Rule {
            name: "attribute",
            action: Action::Replace(
                pattern(r"\b(?:align|style|width|scope)\s*=[^\n|]*\|"),
                "",
            ),
        },
        Rule {
            name: "sup",
            action: Action::Replace(pattern(r"<sup(?:\s[^>]*)?>.*?</sup\s*>"), ""),
        },
        Rule {
            name: "sub",
            action: Action::Replace(pattern(r"<sub(?:\s[^>]*)?>.*?</sub\s*>"), ""),
        },
        Rule {
            name: "dashes",
            action: Action::Replace(pattern(r"-{2,}"), "-"),
        },
        Rule {
            name: "formatnum",
            action: Action::Replace(
                pattern(r"\{\{\s*formatnum\s*:\s*([^{}|]*?)\s*(?:\|[^{}]*)?\}\}"),
                "${1}",
            ),
        },
        Rule {
            name: "emphasis",
            action: Action::Translate(&[("'''", ""), ("''", "")]),
        },
        Rule {
            name: "small",
            action: Action::Replace(pattern(r"</?small\s*>"), ""),
        },
        Rule {
            name: "link",
            action: Action::Rewrite(pattern(r"\[\[(.*?)\]\]"), link_text),
        },
    ]
});

/// Returns the displayed text of a wikilink.
fn link_text(captures: &Captures<'_>) -> String {
    let inner = &captures[1];
    match inner.split_once('|') {
        Some((_, text)) => text.trim().to_string(),
        None => inner.to_string(),
    }
}

/// Removes references, comments, formatting attributes, and inline markup
/// from a wikitable. The result is plain text and still needs escaping.
pub(crate) fn clean(text: &str) -> String {
    RULES
        .iter()
        .fold(text.to_string(), |text, rule| rule.apply(&text).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn apply(name: &str, text: &str) -> String {
        let rule = RULES
            .iter()
            .find(|rule| rule.name == name)
            .unwrap_or_else(|| panic!("no rule named {name}"));
        rule.apply(text).into_owned()
    }

    #[test]
    fn refs() {
        assert_eq!(apply("ref", "1000<ref>Source</ref>"), "1000");
        assert_eq!(
            apply("ref", "1000<ref name=\"a\">Line\nbreak</REF> || 5<ref>x</ref>"),
            "1000 || 5"
        );
        assert_eq!(apply("ref", "1000<ref name=a/>"), "1000<ref name=a/>");
        assert_eq!(apply("ref-self-closing", "1000<ref name=a />"), "1000");
        assert_eq!(apply("ref-self-closing", "x<references/>"), "x<references/>");
    }

    #[test]
    fn comments() {
        assert_eq!(apply("comment", "a<!-- one\ntwo -->b<!--c-->"), "ab");
    }

    #[test]
    fn attributes() {
        assert_eq!(
            apply("attribute", "| align=\"right\" | 12 || style=\"color:red\"| 13"),
            "|  12 ||  13"
        );
        assert_eq!(apply("attribute", "| Width = 5\n| x"), "| Width = 5\n| x");
    }

    #[test]
    fn superscripts() {
        assert_eq!(apply("sup", "10<sup>[1]</sup>"), "10");
        assert_eq!(apply("sub", "H<sub>2</sub>O"), "HO");
    }

    #[test]
    fn dashes() {
        assert_eq!(apply("dashes", "|----\n| a"), "|-\n| a");
        assert_eq!(apply("dashes", "1-2"), "1-2");
    }

    #[test]
    fn formatnum() {
        assert_eq!(apply("formatnum", "{{formatnum: 1234567 }}"), "1234567");
        assert_eq!(apply("formatnum", "{{FORMATNUM:12|R}} x"), "12 x");
    }

    #[test]
    fn emphasis_and_small() {
        assert_eq!(apply("emphasis", "'''bold''' and ''italic''"), "bold and italic");
        assert_eq!(apply("small", "<small>(est.)</small>"), "(est.)");
    }

    #[test]
    fn links() {
        assert_eq!(apply("link", "[[France]] and [[Deutschland|Germany]]"), "France and Germany");
        assert_eq!(apply("link", "[[a| b ]]"), "b");
    }

    #[test]
    fn quotes_and_backslashes_are_kept() {
        assert_eq!(clean("| Côte d'Ivoire || a\\'b\\"), "| Côte d'Ivoire || a\\'b\\");
    }

    #[test]
    fn whole_table() {
        let table = "! Country !! Population<ref>UN</ref>\n\
            |-\n\
            | [[Côte d'Ivoire]] || style=\"text-align:right\" | {{formatnum:26378274}}<!-- 2020 -->\n\
            |----\n\
            | '''[[Ghana|Ghana]]''' || <small>31072940</small><sup>a</sup>";
        let cleaned = clean(table);
        assert_eq!(
            cleaned,
            "! Country !! Population\n\
            |-\n\
            | Côte d'Ivoire ||  26378274\n\
            |-\n\
            | Ghana || 31072940"
        );
        assert_eq!(clean(&cleaned), cleaned);
    }
}
