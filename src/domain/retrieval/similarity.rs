//! Cosine similarity over embedding vectors.
//!
//! Zero-norm vectors are rejected; scores are always finite and in `[-1, 1]`.

use thiserror::Error;

/// Cosine similarity is undefined when either vector has zero norm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cosine similarity is undefined for a zero-norm vector")]
pub struct DegenerateVectorError;

/// Vectors of different length cannot be compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("vector dimensions differ: {left} vs {right}")]
pub struct DimensionMismatchError {
    pub left: usize,
    pub right: usize,
}

/// Reasons a similarity score cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimilarityError {
    #[error(transparent)]
    Degenerate(#[from] DegenerateVectorError),

    #[error(transparent)]
    DimensionMismatch(#[from] DimensionMismatchError),
}

/// Euclidean norm of a vector.
pub fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Returns the norm if it can be used as a divisor.
pub fn checked_norm(v: &[f32]) -> Result<f32, DegenerateVectorError> {
    let n = norm(v);
    if n == 0.0 || !n.is_finite() {
        return Err(DegenerateVectorError);
    }
    Ok(n)
}

/// Computes `(a·b) / (‖a‖·‖b‖)`, clamped to `[-1, 1]`.
///
/// # Errors
///
/// Fails with [`SimilarityError::DimensionMismatch`] if the vectors differ in
/// length and with [`SimilarityError::Degenerate`] if either has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    let a_norm = checked_norm(a)?;
    let b_norm = checked_norm(b)?;
    cosine_with_norms(a, a_norm, b, b_norm)
}

/// Same as [`cosine_similarity`] for callers that cache norms.
pub(crate) fn cosine_with_norms(
    a: &[f32],
    a_norm: f32,
    b: &[f32],
    b_norm: f32,
) -> Result<f32, SimilarityError> {
    if a.len() != b.len() {
        return Err(DimensionMismatchError {
            left: a.len(),
            right: b.len(),
        }
        .into());
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    Ok((dot / (a_norm * b_norm)).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn identical_vectors_score_one() {
        let score = cosine_similarity(&[0.3, -1.2, 4.0], &[0.3, -1.2, 4.0]).unwrap();
        assert!((score - 1.0).abs() < EPS);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let score = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(score.abs() < EPS);
    }

    #[test]
    fn opposite_vectors_score_minus_one() {
        let score = cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]).unwrap();
        assert!((score + 1.0).abs() < EPS);
    }

    #[test]
    fn diagonal_query_is_about_point_seven_one() {
        let score = cosine_similarity(&[0.1, 0.1], &[1.0, 0.0]).unwrap();
        assert!((score - std::f32::consts::FRAC_1_SQRT_2).abs() < EPS);
    }

    #[test]
    fn zero_vector_is_degenerate() {
        assert_eq!(
            cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]),
            Err(SimilarityError::Degenerate(DegenerateVectorError))
        );
        assert_eq!(
            cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]),
            Err(SimilarityError::Degenerate(DegenerateVectorError))
        );
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        assert_eq!(
            cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0]),
            Err(SimilarityError::DimensionMismatch(DimensionMismatchError {
                left: 3,
                right: 2
            }))
        );
    }

    fn non_zero_vector() -> impl Strategy<Value = Vec<f32>> {
        prop::collection::vec(-100.0f32..100.0, 1..16)
            .prop_filter("non-zero norm", |v| norm(v) > 1e-3)
    }

    proptest! {
        #[test]
        fn self_similarity_is_one(v in non_zero_vector()) {
            let score = cosine_similarity(&v, &v).unwrap();
            prop_assert!((score - 1.0).abs() < 1e-4);
        }

        #[test]
        fn score_stays_within_unit_range(
            (a, b) in (1usize..16).prop_flat_map(|n| (
                prop::collection::vec(-100.0f32..100.0, n),
                prop::collection::vec(-100.0f32..100.0, n),
            ))
        ) {
            if let Ok(score) = cosine_similarity(&a, &b) {
                prop_assert!((-1.0..=1.0).contains(&score));
            }
        }
    }
}
