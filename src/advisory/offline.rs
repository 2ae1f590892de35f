//! Offline rhyme fallback.
//!
//! A small table of common Portuguese endings backs the rhyme tool when the
//! generative service is unconfigured or unreachable. Syllable counts and
//! tonicity are unknown offline, so entries carry zero syllables and the
//! statistically safest tonicity.

use super::{RhymeEntry, RhymeKind, RhymeSheet, Tonicity};

static SUFFIX_RHYMES: &[(&str, &[&str])] = &[
    (
        "ão",
        &[
            "coração", "mão", "pão", "chão", "ilusão", "paixão", "canção", "ação", "emoção",
            "razão",
        ],
    ),
    (
        "ar",
        &[
            "amar", "olhar", "mar", "lugar", "falar", "pensar", "sonhar", "voar", "cantar",
            "estar",
        ],
    ),
    (
        "er",
        &[
            "viver", "saber", "ter", "ler", "escrever", "poder", "querer", "ver", "ser",
            "entender",
        ],
    ),
    (
        "ir",
        &[
            "sentir", "partir", "sorrir", "abrir", "pedir", "ouvir", "dormir", "existir", "fluir",
            "cair",
        ],
    ),
    (
        "or",
        &[
            "amor", "dor", "flor", "calor", "sabor", "valor", "temor", "cor", "motor", "favor",
        ],
    ),
    (
        "ada",
        &[
            "amada", "estrada", "nada", "chegada", "alvorada", "jornada", "morada", "calada",
            "espada",
        ],
    ),
    (
        "ente",
        &[
            "mente", "gente", "quente", "frente", "sente", "presente", "ausente", "urgente",
            "vivente",
        ],
    ),
    (
        "al",
        &[
            "final", "real", "igual", "natural", "sinal", "mortal", "leal", "banal", "atemporal",
        ],
    ),
    (
        "ento",
        &[
            "vento", "tempo", "momento", "pensamento", "sentimento", "lento", "atento", "assento",
        ],
    ),
    (
        "ia",
        &[
            "dia", "magia", "poesia", "alegria", "fantasia", "guia", "bacia", "fria", "melodia",
        ],
    ),
];

fn ending(word: &str, chars: usize) -> String {
    let count = word.chars().count();
    word.chars().skip(count.saturating_sub(chars)).collect()
}

fn suffix_candidates(suffix: &str) -> Option<&'static [&'static str]> {
    SUFFIX_RHYMES
        .iter()
        .find(|(ending, _)| *ending == suffix)
        .map(|(_, words)| *words)
}

/// Suffix-based rhyme sheet for a word, longest ending first, deduplicated,
/// and never including the queried word itself.
pub fn rhymes(word: &str) -> RhymeSheet {
    let clean = word.trim().to_lowercase();

    let mut collected: Vec<&str> = Vec::new();
    for length in [4, 3, 2] {
        if let Some(words) = suffix_candidates(&ending(&clean, length)) {
            for candidate in words {
                if *candidate != clean && !collected.contains(candidate) {
                    collected.push(candidate);
                }
            }
        }
    }

    RhymeSheet {
        word: word.to_string(),
        rhymes: collected
            .into_iter()
            .map(|candidate| RhymeEntry {
                word: candidate.to_string(),
                kind: RhymeKind::Consonante,
                syllables: 0,
                tonicity: Tonicity::Paroxitona,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_suffixes_produce_rhymes() {
        let sheet = rhymes("verão");

        assert_eq!(sheet.word, "verão");
        assert!(sheet.rhymes.iter().any(|r| r.word == "coração"));
        assert!(sheet.rhymes.iter().any(|r| r.word == "chão"));
    }

    #[test]
    fn the_queried_word_is_never_its_own_rhyme() {
        let sheet = rhymes("Coração");

        assert!(sheet.rhymes.iter().all(|r| r.word != "coração"));
        assert!(!sheet.rhymes.is_empty());
    }

    #[test]
    fn overlapping_suffix_lists_are_deduplicated() {
        let sheet = rhymes("presente");

        let mut words: Vec<&str> = sheet.rhymes.iter().map(|r| r.word.as_str()).collect();
        let total = words.len();
        words.sort();
        words.dedup();
        assert_eq!(words.len(), total);
    }

    #[test]
    fn unknown_endings_yield_an_empty_sheet() {
        let sheet = rhymes("xyz");

        assert!(sheet.rhymes.is_empty());
    }

    #[test]
    fn offline_entries_mark_unknown_syllables() {
        let sheet = rhymes("cantar");

        assert!(!sheet.rhymes.is_empty());
        assert!(
            sheet
                .rhymes
                .iter()
                .all(|r| r.syllables == 0 && r.kind == RhymeKind::Consonante)
        );
    }
}
