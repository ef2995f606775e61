//! Ordered, data-driven regex rule tables
//!
//! The ignore catalog, the signature catalog and the artifact-filter patterns
//! are all plain data: a pattern plus whatever the caller attaches to it. A
//! [`RuleSet`] compiles such a table once and evaluates it in declaration order.

use regex::{Regex, RegexBuilder};

/// A compiled rule with its attached payload
#[derive(Debug, Clone)]
pub struct Rule<T> {
    pub regex: Regex,
    pub payload: T,
}

/// Rules evaluated in declaration order
#[derive(Debug, Clone)]
pub struct RuleSet<T> {
    rules: Vec<Rule<T>>,
}

impl<T> RuleSet<T> {
    /// Compile a case-insensitive rule table.
    ///
    /// Catalogs are static data written alongside this crate, so a pattern that
    /// fails to compile is a programming error.
    pub fn case_insensitive<I, P>(table: I) -> Self
    where
        I: IntoIterator<Item = (P, T)>,
        P: AsRef<str>,
    {
        let rules = table
            .into_iter()
            .map(|(pattern, payload)| {
                let regex = RegexBuilder::new(pattern.as_ref())
                    .case_insensitive(true)
                    .build()
                    .unwrap_or_else(|e| panic!("invalid rule pattern {:?}: {}", pattern.as_ref(), e));
                Rule { regex, payload }
            })
            .collect();
        Self { rules }
    }

    /// First rule matching anywhere in `text`
    pub fn first_match(&self, text: &str) -> Option<&Rule<T>> {
        self.rules.iter().find(|rule| rule.regex.is_match(text))
    }

    /// Every rule matching `text`, in declaration order
    pub fn matches<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a Rule<T>> + 'a {
        self.rules.iter().filter(move |rule| rule.regex.is_match(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RuleSet<&'static str> {
        RuleSet::case_insensitive([(r"foo", "first"), (r"f.o", "second"), (r"^bar", "third")])
    }

    #[test]
    fn first_match_respects_declaration_order() {
        let rules = table();
        assert_eq!(rules.first_match("xx FOO xx").map(|r| r.payload), Some("first"));
        assert_eq!(rules.first_match("fxo").map(|r| r.payload), Some("second"));
        assert!(rules.first_match("nothing here").is_none());
    }

    #[test]
    fn matches_collects_all_in_order() {
        let rules = table();
        let hits: Vec<_> = rules.matches("foo").map(|r| r.payload).collect();
        assert_eq!(hits, vec!["first", "second"]);
    }

    #[test]
    fn anchors_are_honoured() {
        let rules = table();
        assert_eq!(rules.first_match("Bar at start").map(|r| r.payload), Some("third"));
        assert!(rules.first_match("not bar at start").is_none());
    }
}
