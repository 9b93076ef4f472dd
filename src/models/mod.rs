use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One observed implicit-feedback positive: the user interacted with the
/// item strongly enough for the upstream filter to keep it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: u64,
    pub item_id: u64,
}

impl Interaction {
    pub fn new(user_id: u64, item_id: u64) -> Self {
        Self { user_id, item_id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendedItem {
    pub item_id: u64,
    pub score: f32,
}

/// Serializable snapshot of the trained factor matrices, one row vector
/// per compact index. In-memory export only; durable storage is the
/// caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParameters {
    pub embedding_dim: usize,
    pub user_factors: Vec<Vec<f32>>,
    pub item_factors: Vec<Vec<f32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub mean_precision: f64,
    pub per_user_precision: HashMap<u64, f64>,
    pub evaluated_users: usize,
}
