//! Soft similarity warning: Jaccard similarity over word shingles
//! against a bounded window of recent submissions. Never rejects —
//! callers attach the result to the submission record.

use crate::normalize::fold;
use std::collections::{HashSet, VecDeque};

const SHINGLE_SIZE: usize = 3;

fn shingles(text: &str) -> HashSet<String> {
    let words: Vec<&str> = fold(text).split(' ').filter(|w| !w.is_empty()).collect();
    if words.len() < SHINGLE_SIZE {
        return std::iter::once(words.join(" ")).collect();
    }
    words
        .windows(SHINGLE_SIZE)
        .map(|window| window.join(" "))
        .collect()
}

pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let sa = shingles(a);
    let sb = shingles(b);
    if sa.is_empty() && sb.is_empty() {
        return 1.0;
    }
    let intersection = sa.intersection(&sb).count();
    let union = sa.union(&sb).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// A fixed-capacity ring of recently accepted case texts, checked
/// against every new submission before the new text is pushed in.
pub struct SimilarityWindow {
    recent: VecDeque<(String, String)>,
    capacity: usize,
    threshold: f64,
}

impl SimilarityWindow {
    pub fn new(capacity: usize, threshold: f64) -> Self {
        SimilarityWindow {
            recent: VecDeque::with_capacity(capacity),
            capacity,
            threshold,
        }
    }

    /// Returns the instruction id and score of the most similar recent
    /// submission whose score meets or exceeds the threshold, if any.
    pub fn check(&self, instruction_id: &str, case_text: &str) -> Option<(String, f64)> {
        let _ = instruction_id;
        self.recent
            .iter()
            .map(|(id, text)| (id.clone(), jaccard_similarity(case_text, text)))
            .filter(|(_, score)| *score >= self.threshold)
            .fold(None, |best, candidate| match best {
                Some((_, best_score)) if best_score >= candidate.1 => best,
                _ => Some(candidate),
            })
    }

    /// Records an accepted submission, evicting the oldest entry once
    /// the window is at capacity.
    pub fn record(&mut self, instruction_id: String, case_text: String) {
        if self.recent.len() >= self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back((instruction_id, case_text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_has_similarity_one() {
        let text = "Jean Dupont passed away leaving three children behind him";
        assert!((jaccard_similarity(text, text) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unrelated_text_has_low_similarity() {
        let a = "Jean Dupont passed away leaving three children behind him";
        let b = "the weather in Lyon was unusually cold this winter season";
        assert!(jaccard_similarity(a, b) < 0.1);
    }

    #[test]
    fn window_flags_near_duplicate_and_evicts_oldest() {
        let mut window = SimilarityWindow::new(2, 0.9);
        window.record("INS-0001".to_string(), "Jean Dupont passed away leaving three children".to_string());
        window.record("INS-0002".to_string(), "completely unrelated text about something else entirely".to_string());

        let hit = window.check("INS-0003", "Jean Dupont passed away leaving three children");
        assert!(hit.is_some());

        window.record("INS-0003".to_string(), "a third totally different submission text here".to_string());
        assert_eq!(window.recent.len(), 2);
    }

    proptest::proptest! {
        #[test]
        fn jaccard_similarity_is_bounded_and_symmetric(a: String, b: String) {
            let score = jaccard_similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&score));
            prop_assert!((score - jaccard_similarity(&b, &a)).abs() < 1e-9);
        }
    }
}
