//! Argmax label decoding: a 26-entry score vector becomes one letter.

use crate::types::{ModelMode, PredictionLabel};

/// Letter table shared by the per-letter classifier outputs; score index i
/// corresponds to `ALPHABET[i]`.
pub const ALPHABET: [char; 26] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Picks the winning letter for a score vector.
///
/// Scans with strict greater-than, so the first index achieving the maximum
/// wins ties; downstream label stability depends on that staying
/// deterministic. An empty score vector, or a winner outside the letter
/// table, decodes to the unrecognized sentinel. Both alphabet standards use
/// the same 26-letter index space, so `mode` selects the same table today;
/// it stays in the signature because the label sets are per-mode artifacts.
pub fn decode(scores: &[f32], mode: ModelMode) -> PredictionLabel {
    let labels = letter_table(mode);

    let mut best_index: Option<usize> = None;
    let mut best_score = f32::NEG_INFINITY;
    for (index, score) in scores.iter().enumerate() {
        if *score > best_score {
            best_score = *score;
            best_index = Some(index);
        }
    }

    match best_index {
        Some(index) => match labels.get(index) {
            Some(letter) => PredictionLabel::Letter(*letter),
            None => PredictionLabel::Unrecognized,
        },
        None => PredictionLabel::Unrecognized,
    }
}

fn letter_table(_mode: ModelMode) -> &'static [char; 26] {
    // SIBI and BISINDO both map onto A-Z in this design.
    &ALPHABET
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_hot(index: usize) -> Vec<f32> {
        let mut scores = vec![0.0; 26];
        scores[index] = 1.0;
        scores
    }

    #[test]
    fn unique_maximum_decodes_to_its_letter() {
        assert_eq!(
            decode(&one_hot(0), ModelMode::Sibi),
            PredictionLabel::Letter('A')
        );
        assert_eq!(
            decode(&one_hot(25), ModelMode::Bisindo),
            PredictionLabel::Letter('Z')
        );
        assert_eq!(
            decode(&one_hot(10), ModelMode::Sibi),
            PredictionLabel::Letter('K')
        );
    }

    #[test]
    fn ties_resolve_to_the_first_index() {
        let mut scores = vec![0.0; 26];
        scores[3] = 0.7;
        scores[17] = 0.7;
        assert_eq!(decode(&scores, ModelMode::Sibi), PredictionLabel::Letter('D'));

        let flat = vec![0.5; 26];
        assert_eq!(decode(&flat, ModelMode::Bisindo), PredictionLabel::Letter('A'));
    }

    #[test]
    fn empty_scores_decode_to_unrecognized() {
        assert_eq!(decode(&[], ModelMode::Sibi), PredictionLabel::Unrecognized);
    }

    #[test]
    fn winner_outside_the_table_is_unrecognized() {
        let mut scores = vec![0.0; 30];
        scores[28] = 1.0;
        assert_eq!(decode(&scores, ModelMode::Bisindo), PredictionLabel::Unrecognized);
    }

    #[test]
    fn negative_scores_still_pick_the_maximum() {
        let mut scores = vec![-5.0; 26];
        scores[1] = -0.25;
        assert_eq!(decode(&scores, ModelMode::Sibi), PredictionLabel::Letter('B'));
    }

    #[test]
    fn both_modes_share_the_letter_table() {
        for index in 0..26 {
            assert_eq!(
                decode(&one_hot(index), ModelMode::Sibi),
                decode(&one_hot(index), ModelMode::Bisindo)
            );
        }
    }
}
