//! Text normalization shared by the name-coverage check: lowercase,
//! strip diacritics, collapse whitespace. Mirrors the collate/normalize
//! split used elsewhere for unicode-normalized comparison, minus the
//! case-folding crate dependency — lowercasing here is plain ASCII/
//! unicode lowercasing, which is enough for the Latin-script corpus
//! this validator runs against.

use unicode_normalization::UnicodeNormalization;

/// Unicode general category "Mark, nonspacing" lives in this block for
/// every diacritic this corpus produces (accents over Latin letters).
fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F)
}

/// Lowercases, decomposes to NFD, drops combining marks, recomposes
/// nothing (a plain string suffices once marks are gone), and collapses
/// any run of whitespace to a single space.
pub fn fold(text: &str) -> String {
    let decomposed: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let lowered = decomposed.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut last_was_space = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_strips_diacritics_and_lowercases() {
        assert_eq!(fold("Jean-Baptiste DUPONT"), "jean-baptiste dupont");
        assert_eq!(fold("Véronique Éléonore"), "veronique eleonore");
    }

    #[test]
    fn fold_collapses_whitespace() {
        assert_eq!(fold("Jean   Dupont\n\tMartin"), "jean dupont martin");
    }

    proptest::proptest! {
        #[test]
        fn fold_is_idempotent(s: String) {
            let once = fold(&s);
            let twice = fold(&once);
            prop_assert_eq!(once, twice);
        }
    }
}
