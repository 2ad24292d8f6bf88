//! Keyword-driven choice of the reference datasets named in prompts.

/// Always included: symbolic structure reference.
pub const BASE: &str = "Tegridy MIDI (Structural Patterns)";

const CLASSICAL_KEYWORDS: &[&str] = &[
    "classical", "orchestr", "symphon", "piano", "baroque", "chamber", "sonata", "mozart", "bach",
    "beethoven",
];
const JAZZ_KEYWORDS: &[&str] = &["jazz", "blues", "swing", "bebop", "improv", "sax", "coltrane"];
const POP_KEYWORDS: &[&str] = &[
    "pop", "rock", "dance", "electronic", "beat", "song", "metal", "guitar", "drum",
];

const CLASSICAL: &[&str] = &["MusicNet (Classical Harmony)", "MAESTRO (Expressive Timing)"];
const JAZZ: &[&str] = &["Weimar Jazz Database (Improvisation)", "GTZAN (Jazz Features)"];
const POP: &[&str] = &["Lakh MIDI (Pop/Rock Structure)", "Million Song Dataset (Sequencing)"];
const GENERAL: &[&str] = &["Lakh MIDI (General)", "GTZAN (General Genres)"];

/// Selects datasets for a prompt. Genres are not exclusive; a prompt that
/// matches none of them gets the general pair.
pub fn select(prompt: &str) -> Vec<&'static str> {
    let prompt = prompt.to_lowercase();
    let matches = |keywords: &[&str]| keywords.iter().any(|k| prompt.contains(k));

    let mut selected = vec![BASE];
    let mut matched = false;

    for (keywords, sets) in [
        (CLASSICAL_KEYWORDS, CLASSICAL),
        (JAZZ_KEYWORDS, JAZZ),
        (POP_KEYWORDS, POP),
    ] {
        if matches(keywords) {
            selected.extend_from_slice(sets);
            matched = true;
        }
    }

    if !matched {
        selected.extend_from_slice(GENERAL);
    }

    selected
}

/// The selection as it appears inside instruction text.
pub fn describe(prompt: &str) -> String {
    select(prompt).join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_general_when_no_genre() {
        assert_eq!(
            select("something calm for a rainy afternoon"),
            vec![BASE, "Lakh MIDI (General)", "GTZAN (General Genres)"]
        );
    }

    #[test]
    fn test_select_classical_case_insensitive() {
        let selected = select("A BAROQUE Fugue");
        assert_eq!(selected[0], BASE);
        assert!(selected.contains(&"MusicNet (Classical Harmony)"));
        assert!(selected.contains(&"MAESTRO (Expressive Timing)"));
        assert!(!selected.contains(&"Lakh MIDI (General)"));
    }

    #[test]
    fn test_select_multiple_genres_in_order() {
        assert_eq!(
            select("jazz piano ballad"),
            vec![
                BASE,
                "MusicNet (Classical Harmony)",
                "MAESTRO (Expressive Timing)",
                "Weimar Jazz Database (Improvisation)",
                "GTZAN (Jazz Features)",
            ]
        );
    }

    #[test]
    fn test_select_pop_by_substring() {
        let selected = select("heavy drumming");
        assert!(selected.contains(&"Lakh MIDI (Pop/Rock Structure)"));
        assert!(selected.contains(&"Million Song Dataset (Sequencing)"));
    }

    #[test]
    fn test_describe_joins_with_commas() {
        assert_eq!(
            describe("ambient"),
            "Tegridy MIDI (Structural Patterns), Lakh MIDI (General), GTZAN (General Genres)"
        );
    }
}
