use crate::data::{FeedbackIndex, IdMap, Interactions};
use crate::error::{RecError, Result};
use rand::Rng;

/// Uniform draw from a user's negative candidate pool. Pure: no state is
/// retained between calls, and repeated draws are independent.
pub struct NegativeSampler<'a> {
    index: &'a FeedbackIndex,
    user_ids: &'a IdMap,
}

impl<'a> NegativeSampler<'a> {
    pub fn new(index: &'a FeedbackIndex, user_ids: &'a IdMap) -> Self {
        Self { index, user_ids }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R, user: u32) -> Result<u32> {
        let pool = self.index.negatives(user);
        if pool.is_empty() {
            return Err(RecError::EmptyNegativePool {
                user: self.user_ids.id_of(user),
            });
        }
        Ok(pool[rng.gen_range(0..pool.len())])
    }
}

/// Uniform with-replacement draw of `(user, positive)` pairs from the
/// trainable subset of the interaction table.
///
/// Trainable means the user still has at least one negative candidate;
/// restricting the source distribution up front is what keeps
/// `EmptyNegativePool` out of the training loop entirely.
pub struct PairSampler {
    pairs: Vec<(u32, u32)>,
}

impl PairSampler {
    pub fn from_interactions(interactions: &Interactions, index: &FeedbackIndex) -> Self {
        let pairs = interactions
            .pairs
            .iter()
            .copied()
            .filter(|&(user, _)| !index.negatives(user).is_empty())
            .collect();
        Self { pairs }
    }

    pub fn draw<R: Rng>(&self, rng: &mut R) -> (u32, u32) {
        self.pairs[rng.gen_range(0..self.pairs.len())]
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
