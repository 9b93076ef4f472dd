use crate::algorithms::{FactorStore, TrainedModel};
use crate::error::{RecError, Result};
use crate::models::RecommendedItem;
use std::cmp::Ordering;

/// Read-only affinity scoring over the current factor matrices. Pure:
/// identical inputs return identical values until the trainer mutates the
/// store again.
pub struct Scorer<'a> {
    store: &'a FactorStore,
}

impl<'a> Scorer<'a> {
    pub fn new(store: &'a FactorStore) -> Self {
        Self { store }
    }

    pub fn score(&self, user: u32, item: u32) -> f32 {
        self.store.score(user, item)
    }

    /// Batch form; values are exactly the scalar dot products.
    pub fn score_items(&self, user: u32, items: &[u32]) -> Vec<f32> {
        let user_vector = self.store.user(user);
        items
            .iter()
            .map(|&item| user_vector.dot(self.store.item(item)))
            .collect()
    }
}

/// Top-N recommendation over either the user's negative candidate pool
/// (when known positives are excluded) or the full catalog.
///
/// Ordering is descending score; equal scores break ties by ascending
/// external item id, which keeps the output deterministic.
pub fn recommend(
    model: &TrainedModel,
    user_id: u64,
    n: usize,
    exclude_known_positives: bool,
) -> Result<Vec<RecommendedItem>> {
    let user = model.user_index(user_id)?;
    let scorer = Scorer::new(model.factors());

    let candidates: Vec<u32> = if exclude_known_positives {
        let pool = model.feedback().negatives(user);
        if pool.is_empty() {
            return Err(RecError::EmptyNegativePool { user: user_id });
        }
        pool.to_vec()
    } else {
        (0..model.feedback().num_items() as u32).collect()
    };

    let scores = scorer.score_items(user, &candidates);

    let mut ranked: Vec<RecommendedItem> = candidates
        .iter()
        .zip(scores)
        .map(|(&item, score)| RecommendedItem {
            item_id: model.item_ids().id_of(item),
            score,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.item_id.cmp(&b.item_id))
    });

    ranked.truncate(n);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::train;
    use crate::config::Config;
    use crate::data::Dataset;
    use crate::models::Interaction;
    use std::collections::HashSet;

    fn trained_model() -> TrainedModel {
        let dataset = Dataset::new(
            vec![1, 2],
            vec![10, 20, 30, 40, 50],
            vec![
                Interaction::new(1, 10),
                Interaction::new(1, 20),
                Interaction::new(2, 40),
            ],
        );
        let mut config = Config::default();
        config.model.embedding_dim = 4;
        config.training.epochs = 10;
        train(&dataset, &config).unwrap()
    }

    #[test]
    fn test_recommendations_are_sorted_and_unique() {
        let model = trained_model();
        let recs = recommend(&model, 1, 3, true).unwrap();

        assert!(recs.len() <= 3);
        for pair in recs.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }

        let unique: HashSet<u64> = recs.iter().map(|r| r.item_id).collect();
        assert_eq!(unique.len(), recs.len());
    }

    #[test]
    fn test_exclusion_drops_known_positives() {
        let model = trained_model();
        let recs = recommend(&model, 1, 10, true).unwrap();

        assert_eq!(recs.len(), 3); // 5 items minus 2 positives
        for rec in &recs {
            assert!(rec.item_id != 10 && rec.item_id != 20);
        }
    }

    #[test]
    fn test_full_catalog_when_not_excluding() {
        let model = trained_model();
        let recs = recommend(&model, 1, 10, false).unwrap();
        assert_eq!(recs.len(), 5);
    }

    #[test]
    fn test_length_is_capped_by_candidates() {
        let model = trained_model();
        let recs = recommend(&model, 2, 100, true).unwrap();
        assert_eq!(recs.len(), 4);
    }

    #[test]
    fn test_unknown_user_is_fatal() {
        let model = trained_model();
        assert_eq!(
            recommend(&model, 777, 5, true).unwrap_err(),
            RecError::UnknownUser(777)
        );
    }

    #[test]
    fn test_saturated_user_cannot_be_ranked_with_exclusion() {
        let dataset = Dataset::new(
            vec![1, 2],
            vec![10, 20],
            vec![
                Interaction::new(1, 10),
                Interaction::new(1, 20),
                Interaction::new(2, 10),
            ],
        );
        let mut config = Config::default();
        config.model.embedding_dim = 2;
        config.training.epochs = 1;
        let model = train(&dataset, &config).unwrap();

        assert_eq!(
            recommend(&model, 1, 5, true).unwrap_err(),
            RecError::EmptyNegativePool { user: 1 }
        );
        // The full-catalog form still works.
        assert_eq!(recommend(&model, 1, 5, false).unwrap().len(), 2);
    }

    #[test]
    fn test_scorer_is_idempotent() {
        let model = trained_model();
        let scorer = Scorer::new(model.factors());

        let first = scorer.score(0, 3);
        let second = scorer.score(0, 3);
        assert_eq!(first, second);

        let batch = scorer.score_items(0, &[3]);
        assert_eq!(batch[0], first);
    }
}
