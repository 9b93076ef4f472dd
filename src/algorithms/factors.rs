use crate::algorithms::initializer;
use crate::models::ModelParameters;
use nalgebra::DVector;
use rand::Rng;

/// Owner of the mutable user and item embedding matrices, one row of
/// dimension `embedding_dim` per compact index.
///
/// Vectors handed out by `user`/`item` alias live storage; within one SGD
/// step the trainer reads them, computes gradients, then applies the
/// in-place updates. Nothing else mutates the store.
#[derive(Debug, Clone)]
pub struct FactorStore {
    user_factors: Vec<DVector<f32>>,
    item_factors: Vec<DVector<f32>>,
    embedding_dim: usize,
}

impl FactorStore {
    /// Initializes both matrices from N(0, 0.1) using the caller's
    /// generator, so the whole model state is a pure function of the seed.
    pub fn seeded<R: Rng>(rng: &mut R, num_users: usize, num_items: usize, dim: usize) -> Self {
        let user_factors = (0..num_users)
            .map(|_| DVector::from_vec(initializer::normal(rng, dim, 0.0, 0.1)))
            .collect();
        let item_factors = (0..num_items)
            .map(|_| DVector::from_vec(initializer::normal(rng, dim, 0.0, 0.1)))
            .collect();

        Self {
            user_factors,
            item_factors,
            embedding_dim: dim,
        }
    }

    pub fn user(&self, index: u32) -> &DVector<f32> {
        &self.user_factors[index as usize]
    }

    pub fn item(&self, index: u32) -> &DVector<f32> {
        &self.item_factors[index as usize]
    }

    pub fn user_mut(&mut self, index: u32) -> &mut DVector<f32> {
        &mut self.user_factors[index as usize]
    }

    pub fn item_mut(&mut self, index: u32) -> &mut DVector<f32> {
        &mut self.item_factors[index as usize]
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    pub fn num_users(&self) -> usize {
        self.user_factors.len()
    }

    pub fn num_items(&self) -> usize {
        self.item_factors.len()
    }

    /// Affinity of a user for an item under the current parameters.
    pub fn score(&self, user: u32, item: u32) -> f32 {
        self.user_factors[user as usize].dot(&self.item_factors[item as usize])
    }

    pub fn to_parameters(&self) -> ModelParameters {
        ModelParameters {
            embedding_dim: self.embedding_dim,
            user_factors: self
                .user_factors
                .iter()
                .map(|v| v.as_slice().to_vec())
                .collect(),
            item_factors: self
                .item_factors
                .iter()
                .map(|v| v.as_slice().to_vec())
                .collect(),
        }
    }
}
