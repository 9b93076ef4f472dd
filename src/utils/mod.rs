pub mod metrics;

/// Logistic function, computed with the sign-branching form so the
/// exponential never overflows for large |x|.
pub fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Stable `ln(1 + e^x)`.
pub fn softplus(x: f32) -> f32 {
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}

/// Pairwise ranking loss `-ln σ(x̂)` for a score difference `x̂`.
pub fn pairwise_loss(score_diff: f32) -> f32 {
    softplus(-score_diff)
}
