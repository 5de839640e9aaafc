//! Image prompt construction and narrative sanitization.
//!
//! The image provider renders illegible in-image text, so every prompt
//! forbids lettering; captions are composited afterwards by
//! [`crate::overlay`]. The sanitizer rewrites policy-sensitive wording
//! before the primary prompt is built, and a fully generic fallback prompt
//! exists for when even the sanitized prompt is refused.

use std::sync::LazyLock;

use regex::Regex;

use crate::narrative::split_into_beats;

/// Neutral replacement for policy-sensitive words.
pub const SANITIZE_PLACEHOLDER: &str = "unusual";

/// Policy-sensitive word stems, replaced whole-word and case-insensitively.
/// Covers violence, death, weapons, drugs, bodily harm, hate speech,
/// pests, and contamination wording that image providers commonly refuse.
const SENSITIVE_STEMS: &[&str] = &[
    // violence / bodily harm
    "violent",
    "violence",
    "kill",
    "killed",
    "killing",
    "murder",
    "murdered",
    "stab",
    "stabbed",
    "stabbing",
    "shoot",
    "shooting",
    "shot",
    "attack",
    "attacked",
    "assault",
    "assaulted",
    "fight",
    "fighting",
    "blood",
    "bloody",
    "bleeding",
    "wound",
    "wounded",
    "injury",
    "injured",
    "dead",
    "death",
    "die",
    "died",
    "dying",
    "corpse",
    // weapons
    "gun",
    "guns",
    "knife",
    "knives",
    "weapon",
    "weapons",
    "bomb",
    "bombs",
    // drugs
    "drug",
    "drugs",
    "cocaine",
    "heroin",
    "meth",
    "overdose",
    // hate speech
    "racist",
    "racism",
    "nazi",
    "slur",
    // pests / vermin
    "rat",
    "rats",
    "mouse",
    "mice",
    "roach",
    "roaches",
    "cockroach",
    "cockroaches",
    "maggot",
    "maggots",
    "vermin",
    "infested",
    "infestation",
    // contamination
    "mold",
    "moldy",
    "poison",
    "poisoned",
    "poisoning",
    "vomit",
    "vomiting",
    "feces",
    "urine",
    "filthy",
    "contaminated",
    "rotten",
];

/// Compiled whole-word matcher for the sensitive stem list.
static SENSITIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"(?i)\b(?:{})\b", SENSITIVE_STEMS.join("|"));
    Regex::new(&pattern).expect("valid sensitive-stem regex")
});

/// Replace policy-sensitive words with [`SANITIZE_PLACEHOLDER`].
///
/// Whole-word matching only, so embedded substrings (e.g. "ratatouille")
/// are never altered. Idempotent: the placeholder itself is not on the
/// stem list.
pub fn sanitize_narrative(narrative: &str) -> String {
    SENSITIVE_RE
        .replace_all(narrative, SANITIZE_PLACEHOLDER)
        .into_owned()
}

/// Layout instruction for the given panel count.
fn layout_hint(panel_count: u8) -> &'static str {
    match panel_count {
        1 => "Compose a single full-frame scene filling the whole image.",
        2 => "Compose two panels stacked vertically, top panel first.",
        3 => {
            "Compose three horizontal panels stacked top to bottom, \
             read as a three-beat cinematic flow."
        }
        _ => {
            "Compose four panels in a 2x2 grid, read left-to-right then \
             top-to-bottom, as a setup / twist / climax / aftermath structure."
        }
    }
}

/// Build the primary image-generation prompt.
///
/// Sanitizes the narrative first, then describes the exact panel count,
/// the no-lettering constraint, a per-panel beat breakdown, and the
/// panel-count-specific layout hint.
pub fn build_comic_prompt(narrative: &str, panel_count: u8) -> String {
    let sanitized = sanitize_narrative(narrative);
    let beats = split_into_beats(&sanitized, panel_count);

    let mut prompt = format!(
        "A colorful comic strip with exactly {panel_count} panel{}, drawn in a \
         friendly cartoon style.\n",
        if panel_count == 1 { "" } else { "s" },
    );
    prompt.push_str(layout_hint(panel_count));
    prompt.push_str(
        "\nDo not draw any text, letters, speech bubbles, signs, or lettering \
         of any kind anywhere in the image; captions are added separately.\n",
    );
    for (i, beat) in beats.iter().enumerate() {
        prompt.push_str(&format!("Panel {}: {beat}\n", i + 1));
    }
    prompt
}

/// Fully generic fallback prompt with no narrative content.
///
/// Used when the image provider rejects even the sanitized prompt on
/// content-policy grounds.
pub fn fallback_prompt(panel_count: u8) -> String {
    let mut prompt = format!(
        "A cheerful comic strip with exactly {panel_count} panel{} showing a \
         cozy, quirky little restaurant: a smiling chef, happy diners, and \
         steaming plates of food, drawn in a friendly cartoon style.\n",
        if panel_count == 1 { "" } else { "s" },
    );
    prompt.push_str(layout_hint(panel_count));
    prompt.push_str(
        "\nDo not draw any text, letters, speech bubbles, signs, or lettering \
         of any kind anywhere in the image.\n",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizer_replaces_whole_words() {
        let out = sanitize_narrative("The rats were dead in the kitchen");
        assert!(!out.contains("rats"));
        assert!(!out.contains("dead"));
        assert!(out.contains(SANITIZE_PLACEHOLDER));
    }

    #[test]
    fn sanitizer_leaves_embedded_substrings_alone() {
        // "ratatouille" contains "rat", "pirate" contains "rat" too.
        let out = sanitize_narrative("The ratatouille was a pirate-themed dish");
        assert_eq!(out, "The ratatouille was a pirate-themed dish");
    }

    #[test]
    fn sanitizer_is_case_insensitive() {
        let out = sanitize_narrative("BLOOD everywhere");
        assert!(!out.to_lowercase().contains("blood"));
    }

    #[test]
    fn sanitizer_is_idempotent() {
        let once = sanitize_narrative("A knife fight over rotten food.");
        let twice = sanitize_narrative(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn prompt_contains_panel_count_and_no_text_rule() {
        let prompt = build_comic_prompt("A waiter forgot everything. Then he sang.", 2);
        assert!(prompt.contains("exactly 2 panels"));
        assert!(prompt.contains("Do not draw any text"));
        assert!(prompt.contains("Panel 1:"));
        assert!(prompt.contains("Panel 2:"));
        assert!(prompt.contains("stacked vertically"));
    }

    #[test]
    fn prompt_is_built_from_sanitized_narrative() {
        let prompt = build_comic_prompt("Rats ran across the table.", 1);
        assert!(!prompt.to_lowercase().contains("rats ran"));
    }

    #[test]
    fn four_panel_prompt_uses_grid_layout() {
        let prompt = build_comic_prompt("One. Two. Three. Four.", 4);
        assert!(prompt.contains("2x2 grid"));
        assert!(prompt.contains("aftermath"));
    }

    #[test]
    fn fallback_prompt_has_no_narrative_content() {
        let prompt = fallback_prompt(3);
        assert!(prompt.contains("exactly 3 panels"));
        assert!(prompt.contains("restaurant"));
        assert!(prompt.contains("Do not draw any text"));
    }
}
