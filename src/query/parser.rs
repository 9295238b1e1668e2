//! Search text parser
//!
//! Extraction runs in a fixed order so no token is consumed twice:
//! the `rating:` clause first, then hyphen-negated terms, then quoted
//! phrases, and finally the plain whitespace-separated words.

use super::types::{Comparator, Query, RatingFilter};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static RATING_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"rating:(\S*)").expect("valid rating regex"));

static RATING_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(==|!=|>=|<=|=|>|<)(-?\d+(?:\.\d+)?|-?\.\d+)$").expect("valid rating value regex")
});

// `-word`, `-"some phrase"` or `"-word"`, only at the start of a token.
// A bare `-` matches with an empty capture and is dropped.
static NEGATED_TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)(?:-"([^"]*)"|"?-([^\s"]*)"?)"#).expect("valid negation regex")
});

static QUOTED_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)""#).expect("valid phrase regex"));

/// Parse free-form search text into a [`Query`]
///
/// Never fails: anything that does not form a recognised clause is either
/// treated as a plain word or dropped.
///
/// # Examples
/// ```
/// use sadpanda::query::{parse, Comparator};
///
/// let query = parse(r#"Love -"bad ending" rating:>=4"#);
/// assert_eq!(query.words, vec!["love"]);
/// assert_eq!(query.filter_words, vec!["bad_ending"]);
/// assert_eq!(query.rating.unwrap().comparator, Comparator::Ge);
/// ```
#[must_use]
pub fn parse(search_text: &str) -> Query {
    let text = search_text.to_lowercase();

    let rating = RATING_CLAUSE
        .captures_iter(&text)
        .find_map(|caps| parse_rating(&caps[1]));
    let text = RATING_CLAUSE.replace_all(&text, " ");

    let filter_words: Vec<String> = NEGATED_TERM
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .filter_map(|m| normalize_term(m.as_str()))
        .collect();
    let text = NEGATED_TERM.replace_all(&text, " ");

    let phrases: Vec<String> = QUOTED_PHRASE
        .captures_iter(&text)
        .filter_map(|caps| normalize_term(&caps[1]))
        .collect();
    let text = QUOTED_PHRASE.replace_all(&text, " ");

    let words: Vec<String> = text
        .split_whitespace()
        .map(str::to_string)
        .chain(phrases)
        .filter_map(|w| normalize_term(&w.replace('"', "")))
        .collect();

    debug!(?words, ?filter_words, ?rating, "parsed search text");

    Query {
        words,
        filter_words,
        rating,
    }
}

fn parse_rating(clause: &str) -> Option<RatingFilter> {
    let caps = RATING_VALUE.captures(clause)?;
    let comparator = Comparator::try_from(&caps[1]).ok()?;
    let value = caps[2].parse::<f64>().ok()?;
    Some(RatingFilter::new(comparator, value))
}

/// Join internal whitespace with underscores; `None` for blank terms
fn normalize_term(term: &str) -> Option<String> {
    let joined = term.split_whitespace().collect::<Vec<_>>().join("_");
    let joined = joined.replace('"', "");
    if joined.is_empty() { None } else { Some(joined) }
}
