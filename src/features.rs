//! Geometric feature extraction: hands in, fixed-width distance vectors out.
//!
//! The classifiers were trained on normalized pairwise landmark distances,
//! so pair enumeration order and the max-distance normalization here must
//! stay exactly as they are.

use crate::types::{DetectedHand, Landmark, LANDMARK_COUNT};

/// C(21, 2) unordered landmark pairs for one hand.
pub const SINGLE_HAND_FEATURES: usize = LANDMARK_COUNT * (LANDMARK_COUNT - 1) / 2;

/// Two positional 210-feature blocks for the two-hand alphabet.
pub const TWO_HAND_FEATURES: usize = 2 * SINGLE_HAND_FEATURES;

/// Computes the normalized pairwise-distance vector for one hand.
///
/// Enumerates every unordered landmark pair with the outer index running
/// 0..20 and the inner index i+1..20, takes the 3D Euclidean distance, and
/// divides all 210 distances by the largest one so the vector is invariant
/// to hand size and camera distance. A degenerate hand (wrong landmark
/// count, including empty) yields all zeros rather than an error.
pub fn extract_distances(landmarks: &[Landmark]) -> Vec<f32> {
    if landmarks.len() != LANDMARK_COUNT {
        return vec![0.0; SINGLE_HAND_FEATURES];
    }

    let mut distances = Vec::with_capacity(SINGLE_HAND_FEATURES);
    for i in 0..landmarks.len() {
        for j in (i + 1)..landmarks.len() {
            distances.push(distance3(landmarks[i], landmarks[j]));
        }
    }

    let max_dist = distances.iter().copied().fold(0.0f32, f32::max);
    // A single-point hand collapses every distance to zero; dividing by one
    // keeps the output well-defined.
    let norm = if max_dist > 0.0 { max_dist } else { 1.0 };
    for d in &mut distances {
        *d /= norm;
    }

    distances
}

/// Lays out up to two hands' feature vectors into the 420-wide input of the
/// two-hand classifier.
///
/// Hands are written in detector-reported order into positional slots
/// (0..210 and 210..420); the model was trained on slot position, not
/// handedness, so no left/right sorting happens here. A missing second hand
/// leaves its block zero, which the classifier tolerates.
pub fn compose_two_hand_features(hands: &[DetectedHand]) -> Vec<f32> {
    let mut features = vec![0.0; TWO_HAND_FEATURES];

    for (slot, hand) in hands.iter().take(2).enumerate() {
        let block = extract_distances(&hand.landmarks);
        let start = slot * SINGLE_HAND_FEATURES;
        features[start..start + SINGLE_HAND_FEATURES].copy_from_slice(&block);
    }

    features
}

fn distance3(a: Landmark, b: Landmark) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2) + (a.z - b.z).powi(2)).sqrt()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A fixed, asymmetric 21-point hand so tests get distinct distances.
    pub(crate) fn synthetic_hand() -> Vec<Landmark> {
        (0..LANDMARK_COUNT)
            .map(|i| {
                let t = i as f32;
                Landmark::new(0.1 + 0.03 * t, 0.9 - 0.04 * t, 0.01 * (t % 5.0))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::synthetic_hand;
    use super::*;
    use crate::types::Handedness;

    fn detected(landmarks: Vec<Landmark>) -> DetectedHand {
        DetectedHand {
            landmarks,
            handedness: Handedness::Right,
            score: 0.9,
        }
    }

    #[test]
    fn extracts_210_normalized_distances() {
        let features = extract_distances(&synthetic_hand());
        assert_eq!(features.len(), SINGLE_HAND_FEATURES);
        assert!(features.iter().all(|d| (0.0..=1.0).contains(d)));

        let max = features.iter().copied().fold(0.0f32, f32::max);
        assert_eq!(max, 1.0);
    }

    #[test]
    fn empty_hand_yields_zeros() {
        let features = extract_distances(&[]);
        assert_eq!(features.len(), SINGLE_HAND_FEATURES);
        assert!(features.iter().all(|d| *d == 0.0));
    }

    #[test]
    fn wrong_landmark_count_yields_zeros() {
        let mut short = synthetic_hand();
        short.truncate(20);
        assert!(extract_distances(&short).iter().all(|d| *d == 0.0));
    }

    #[test]
    fn single_point_hand_does_not_divide_by_zero() {
        let collapsed = vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        let features = extract_distances(&collapsed);
        assert!(features.iter().all(|d| *d == 0.0));
    }

    #[test]
    fn extraction_is_deterministic() {
        let hand = synthetic_hand();
        assert_eq!(extract_distances(&hand), extract_distances(&hand));
    }

    #[test]
    fn one_hand_fills_only_the_first_block() {
        let hand = synthetic_hand();
        let expected = extract_distances(&hand);
        let features = compose_two_hand_features(&[detected(hand)]);

        assert_eq!(features.len(), TWO_HAND_FEATURES);
        assert_eq!(&features[..SINGLE_HAND_FEATURES], expected.as_slice());
        assert!(features[SINGLE_HAND_FEATURES..].iter().all(|d| *d == 0.0));
    }

    #[test]
    fn composition_is_slot_positional() {
        let first = synthetic_hand();
        let second: Vec<Landmark> = synthetic_hand()
            .into_iter()
            .map(|lm| Landmark::new(1.0 - lm.x, lm.y, -lm.z))
            .collect();

        let forward = compose_two_hand_features(&[
            detected(first.clone()),
            detected(second.clone()),
        ]);
        let swapped = compose_two_hand_features(&[detected(second), detected(first)]);

        // Swapping the detector order swaps which block each hand occupies.
        assert_eq!(
            &forward[..SINGLE_HAND_FEATURES],
            &swapped[SINGLE_HAND_FEATURES..]
        );
        assert_eq!(
            &forward[SINGLE_HAND_FEATURES..],
            &swapped[..SINGLE_HAND_FEATURES]
        );
        assert_ne!(forward, swapped);
    }

    #[test]
    fn extra_hands_are_ignored() {
        let hand = synthetic_hand();
        let three = vec![
            detected(hand.clone()),
            detected(hand.clone()),
            detected(hand.clone()),
        ];
        let two = vec![detected(hand.clone()), detected(hand)];
        assert_eq!(
            compose_two_hand_features(&three),
            compose_two_hand_features(&two)
        );
    }
}
