use crate::utils::sigmoid;
use nalgebra::DVector;

/// Gradients of the pairwise logistic ranking loss for one sampled
/// triple, one vector per touched parameter row. The engine never mutates
/// the factor store; applying the step is the trainer's job.
#[derive(Debug, Clone)]
pub struct TripleGradient {
    pub user: DVector<f32>,
    pub positive: DVector<f32>,
    pub negative: DVector<f32>,
}

/// Computes BPR gradients with an independent L2 decay coefficient per
/// parameter class.
#[derive(Debug, Clone, Copy)]
pub struct PairwiseGradient {
    pub user_reg: f32,
    pub positive_reg: f32,
    pub negative_reg: f32,
}

impl PairwiseGradient {
    pub fn new(user_reg: f32, positive_reg: f32, negative_reg: f32) -> Self {
        Self {
            user_reg,
            positive_reg,
            negative_reg,
        }
    }

    /// Score difference `x̂ = w·h_i − w·h_j`.
    pub fn score_diff(
        user: &DVector<f32>,
        positive: &DVector<f32>,
        negative: &DVector<f32>,
    ) -> f32 {
        user.dot(positive) - user.dot(negative)
    }

    /// For `g = σ(x̂) − 1` (the derivative of `ln σ(x̂)` in `x̂`):
    ///
    ///   ∇w   = g·(h_i − h_j) + λ_w·w
    ///   ∇h_i = g·w           + λ_pos·h_i
    ///   ∇h_j = −g·w          + λ_neg·h_j
    pub fn compute(
        &self,
        user: &DVector<f32>,
        positive: &DVector<f32>,
        negative: &DVector<f32>,
    ) -> TripleGradient {
        let score_diff = Self::score_diff(user, positive, negative);
        let g = sigmoid(score_diff) - 1.0;

        TripleGradient {
            user: (positive - negative) * g + user * self.user_reg,
            positive: user * g + positive * self.positive_reg,
            negative: user * (-g) + negative * self.negative_reg,
        }
    }
}
