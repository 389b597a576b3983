//! Priority-ordered detection rules.
//!
//! Each specification field is detected by a table of rules evaluated in
//! order by [`first_match`]; the first rule that produces a value wins.

use once_cell::sync::Lazy;
use regex::Regex;

/// One entry of a detection table.
pub enum Rule<T: 'static> {
    /// Any of the phrases occurs in the text.
    Phrase(&'static [&'static str], T),
    /// The pattern matches anywhere in the text.
    Pattern(&'static Lazy<Regex>, T),
    /// The pattern matches and its first capture group parses as an
    /// integer (thousands separators allowed), which `convert` maps to a value.
    Number(&'static Lazy<Regex>, fn(u64) -> Option<T>),
}

impl<T: Copy> Rule<T> {
    fn apply(&self, text: &str) -> Option<T> {
        match self {
            Rule::Phrase(phrases, value) => phrases
                .iter()
                .any(|phrase| text.contains(phrase))
                .then_some(*value),
            Rule::Pattern(pattern, value) => pattern.is_match(text).then_some(*value),
            Rule::Number(pattern, convert) => pattern
                .captures_iter(text)
                .filter_map(|caps| parse_integer(caps.get(1)?.as_str()))
                .find_map(convert),
        }
    }
}

/// Evaluate `rules` in order against already-lowercased `text`.
pub fn first_match<T: Copy>(rules: &[Rule<T>], text: &str) -> Option<T> {
    rules.iter().find_map(|rule| rule.apply(text))
}

/// Every value whose rule matches, in table order, without duplicates.
pub fn all_matches<T: Copy + PartialEq>(rules: &[Rule<T>], text: &str) -> Vec<T> {
    let mut found = Vec::new();
    for value in rules.iter().filter_map(|rule| rule.apply(text)) {
        if !found.contains(&value) {
            found.push(value);
        }
    }
    found
}

fn parse_integer(token: &str) -> Option<u64> {
    token.replace(',', "").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d[\d,]*)\s*items").unwrap());
    static WHOLE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bcat\b").unwrap());

    fn small(n: u64) -> Option<u32> {
        (n < 100).then(|| n as u32)
    }

    #[test]
    fn earlier_rules_win() {
        let rules = [
            Rule::Phrase(&["alpha"], 1),
            Rule::Phrase(&["beta", "gamma"], 2),
        ];
        assert_eq!(first_match(&rules, "gamma then alpha"), Some(1));
        assert_eq!(first_match(&rules, "only gamma"), Some(2));
        assert_eq!(first_match(&rules, "nothing"), None);
    }

    #[test]
    fn number_rules_skip_unconvertible_captures() {
        let rules = [Rule::Number(&DIGITS, small as fn(u64) -> Option<u32>)];
        assert_eq!(first_match(&rules, "1,200 items or 12 items"), Some(12));
        assert_eq!(first_match(&rules, "5000 items"), None);
    }

    #[test]
    fn all_matches_keeps_table_order() {
        let rules = [
            Rule::Phrase(&["a"], 'a'),
            Rule::Phrase(&["b"], 'b'),
            Rule::Phrase(&["bb"], 'b'),
        ];
        assert_eq!(all_matches(&rules, "bb a"), vec!['a', 'b']);
    }

    #[test]
    fn pattern_rules_respect_word_boundaries() {
        let rules = [Rule::Pattern(&WHOLE_WORD, true)];
        assert_eq!(first_match(&rules, "the cat sat"), Some(true));
        assert_eq!(first_match(&rules, "concatenate"), None);
        assert_eq!(first_match(&rules, "cats"), None);
    }
}
