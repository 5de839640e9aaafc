//! Coarse profanity filter for review bodies.
//!
//! A review is dropped when any whitespace/punctuation-delimited token
//! matches a blocked term exactly (case-insensitive). Substrings embedded
//! in longer words never trigger removal; this is a word-boundary list,
//! not a classifier.

use crate::review::Review;

/// Exact-match blocked terms. Matched against lowercased tokens only.
const BLOCKED_TERMS: &[&str] = &[
    "ass",
    "asshole",
    "bastard",
    "bitch",
    "cock",
    "crap",
    "cunt",
    "damn",
    "dick",
    "fuck",
    "fucked",
    "fucking",
    "piss",
    "prick",
    "pussy",
    "shit",
    "shitty",
    "slut",
    "twat",
    "whore",
];

/// Whether a single body of text contains a blocked token.
pub fn contains_blocked_term(text: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .any(|token| {
            let lowered = token.to_lowercase();
            BLOCKED_TERMS.contains(&lowered.as_str())
        })
}

/// Remove reviews whose body contains a blocked term.
pub fn filter_reviews(reviews: Vec<Review>) -> Vec<Review> {
    reviews
        .into_iter()
        .filter(|r| !contains_blocked_term(&r.text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(text: &str) -> Review {
        Review {
            author: "tester".to_string(),
            text: text.to_string(),
            rating: 3,
            time: chrono::Utc::now(),
        }
    }

    #[test]
    fn standalone_token_is_removed() {
        let kept = filter_reviews(vec![review("what an ass this waiter was")]);
        assert!(kept.is_empty());
    }

    #[test]
    fn embedded_substring_is_not_removed() {
        // "cassava" and "passage" contain "ass" but are clean words.
        let kept = filter_reviews(vec![review("the cassava fries in the back passage area")]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn match_is_case_insensitive() {
        assert!(contains_blocked_term("this place is SHIT"));
    }

    #[test]
    fn punctuation_delimits_tokens() {
        assert!(contains_blocked_term("total crap."));
        assert!(contains_blocked_term("crap, honestly"));
    }

    #[test]
    fn clean_reviews_pass_through_unchanged() {
        let kept = filter_reviews(vec![review("lovely spot"), review("would visit again")]);
        assert_eq!(kept.len(), 2);
    }
}
