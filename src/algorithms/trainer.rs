use crate::algorithms::factors::FactorStore;
use crate::algorithms::gradient::PairwiseGradient;
use crate::algorithms::optimizer::{Optimizer, Sgd};
use crate::algorithms::sampler::{NegativeSampler, PairSampler};
use crate::config::Config;
use crate::data::{Dataset, FeedbackIndex, IdMap, Interactions};
use crate::error::{RecError, Result};
use crate::models::ModelParameters;
use crate::utils::pairwise_loss;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Where the trainer is in its fixed-epoch run. There is no adaptive
/// stopping rule; `Exhausted` is reached after the configured epoch count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerPhase {
    Initialized,
    Running { epoch: usize },
    Exhausted,
}

/// Everything the scoring and evaluation stages need after training: the
/// identifier maps, the per-user feedback partition, the final factor
/// matrices, and the advisory per-epoch loss trace.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub(crate) user_ids: IdMap,
    pub(crate) item_ids: IdMap,
    pub(crate) index: FeedbackIndex,
    pub(crate) store: FactorStore,
    pub loss_trace: Vec<f32>,
    /// Epochs whose diagnostic loss came out non-finite. Non-fatal, but a
    /// strong hint that the learning rate is too high.
    pub unstable_epochs: Vec<usize>,
    pub config: Config,
}

impl TrainedModel {
    pub fn user_index(&self, user_id: u64) -> Result<u32> {
        self.user_ids
            .index_of(user_id)
            .ok_or(RecError::UnknownUser(user_id))
    }

    pub fn item_index(&self, item_id: u64) -> Result<u32> {
        self.item_ids
            .index_of(item_id)
            .ok_or(RecError::UnknownItem(item_id))
    }

    pub fn user_ids(&self) -> &IdMap {
        &self.user_ids
    }

    pub fn item_ids(&self) -> &IdMap {
        &self.item_ids
    }

    pub fn feedback(&self) -> &FeedbackIndex {
        &self.index
    }

    pub fn factors(&self) -> &FactorStore {
        &self.store
    }

    pub fn is_unstable(&self) -> bool {
        !self.unstable_epochs.is_empty()
    }

    pub fn parameters(&self) -> ModelParameters {
        self.store.to_parameters()
    }
}

/// Strictly sequential stochastic trainer for the pairwise ranking loss.
///
/// One epoch performs as many steps as there are trainable interactions,
/// each drawing a fresh (user, positive) pair with replacement. Running
/// single-threaded is the concurrency contract: step k+1 always observes
/// every update from step k, which the gradient derivation assumes.
pub struct RankingTrainer {
    config: Config,
    phase: TrainerPhase,
}

impl RankingTrainer {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            phase: TrainerPhase::Initialized,
        })
    }

    pub fn phase(&self) -> TrainerPhase {
        self.phase
    }

    pub fn fit(&mut self, dataset: &Dataset) -> Result<TrainedModel> {
        let interactions = Interactions::compile(dataset)?;
        let index = FeedbackIndex::build(&interactions);

        let mut rng = StdRng::seed_from_u64(self.config.model.seed);
        let mut store = FactorStore::seeded(
            &mut rng,
            interactions.num_users(),
            interactions.num_items(),
            self.config.model.embedding_dim,
        );

        let pair_sampler = PairSampler::from_interactions(&interactions, &index);
        let negative_sampler = NegativeSampler::new(&index, &interactions.user_ids);
        let engine = PairwiseGradient::new(
            self.config.training.user_reg,
            self.config.training.positive_reg,
            self.config.training.negative_reg,
        );
        let mut sgd = Sgd::new(self.config.training.learning_rate);

        let steps_per_epoch = pair_sampler.len();
        let mut loss_trace = Vec::with_capacity(self.config.training.epochs);
        let mut unstable_epochs = Vec::new();

        if pair_sampler.is_empty() {
            warn!("no trainable interactions; returning initial factors unchanged");
            self.phase = TrainerPhase::Exhausted;
            return Ok(TrainedModel {
                user_ids: interactions.user_ids,
                item_ids: interactions.item_ids,
                index,
                store,
                loss_trace,
                unstable_epochs,
                config: self.config.clone(),
            });
        }

        info!(
            users = interactions.num_users(),
            items = interactions.num_items(),
            interactions = steps_per_epoch,
            dim = self.config.model.embedding_dim,
            "starting pairwise ranking training"
        );

        let window_size = self.config.training.diagnostic_window;
        let mut recent_pairs: VecDeque<(u32, u32)> = VecDeque::with_capacity(window_size);

        for epoch in 0..self.config.training.epochs {
            self.phase = TrainerPhase::Running { epoch };

            for _ in 0..steps_per_epoch {
                let (user, positive) = pair_sampler.draw(&mut rng);

                // Cannot fail: the pair sampler only serves users with a
                // non-empty negative pool.
                let negative = negative_sampler.sample(&mut rng, user)?;

                let gradient =
                    engine.compute(store.user(user), store.item(positive), store.item(negative));

                sgd.update(store.user_mut(user), &gradient.user);
                sgd.update(store.item_mut(positive), &gradient.positive);
                sgd.update(store.item_mut(negative), &gradient.negative);

                if recent_pairs.len() == window_size {
                    recent_pairs.pop_front();
                }
                recent_pairs.push_back((user, positive));
            }

            let epoch_loss = self.diagnostic_loss(
                &mut rng,
                &recent_pairs,
                &store,
                &negative_sampler,
            )?;
            loss_trace.push(epoch_loss);

            if epoch_loss.is_finite() {
                debug!(epoch, loss = epoch_loss, "epoch complete");
            } else {
                warn!(
                    epoch,
                    loss = epoch_loss,
                    "non-finite diagnostic loss; learning rate is likely too high"
                );
                unstable_epochs.push(epoch);
            }
        }

        self.phase = TrainerPhase::Exhausted;
        info!(
            epochs = self.config.training.epochs,
            final_loss = loss_trace.last().copied().unwrap_or(f32::NAN),
            "training finished"
        );

        Ok(TrainedModel {
            user_ids: interactions.user_ids,
            item_ids: interactions.item_ids,
            index,
            store,
            loss_trace,
            unstable_epochs,
            config: self.config.clone(),
        })
    }

    /// Mean pairwise loss over the most recent positive pairs, each scored
    /// against a freshly drawn negative. Advisory only; never gates
    /// training continuation.
    fn diagnostic_loss(
        &self,
        rng: &mut StdRng,
        recent_pairs: &VecDeque<(u32, u32)>,
        store: &FactorStore,
        negative_sampler: &NegativeSampler<'_>,
    ) -> Result<f32> {
        let mut total = 0.0f32;
        for &(user, positive) in recent_pairs {
            let negative = negative_sampler.sample(rng, user)?;
            let score_diff = store.score(user, positive) - store.score(user, negative);
            total += pairwise_loss(score_diff);
        }
        Ok(total / recent_pairs.len() as f32)
    }
}

/// Trains a pairwise ranking model on the dataset. Top-level entry point
/// for calling code.
pub fn train(dataset: &Dataset, config: &Config) -> Result<TrainedModel> {
    let mut trainer = RankingTrainer::new(config.clone())?;
    trainer.fit(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Interaction;

    fn two_user_dataset() -> Dataset {
        Dataset::new(
            vec![1, 2],
            vec![10, 20, 30],
            vec![
                Interaction::new(1, 10),
                Interaction::new(1, 20),
                Interaction::new(2, 30),
            ],
        )
    }

    fn small_config() -> Config {
        let mut config = Config::default();
        config.model.embedding_dim = 4;
        config.model.seed = 17;
        config.training.epochs = 5;
        config.training.diagnostic_window = 8;
        config
    }

    #[test]
    fn test_trainer_reaches_exhausted() {
        let mut trainer = RankingTrainer::new(small_config()).unwrap();
        assert_eq!(trainer.phase(), TrainerPhase::Initialized);

        trainer.fit(&two_user_dataset()).unwrap();
        assert_eq!(trainer.phase(), TrainerPhase::Exhausted);
    }

    #[test]
    fn test_loss_trace_has_one_entry_per_epoch() {
        let model = train(&two_user_dataset(), &small_config()).unwrap();
        assert_eq!(model.loss_trace.len(), 5);
        for &loss in &model.loss_trace {
            assert!(loss.is_finite());
            assert!(loss > 0.0);
        }
        assert!(!model.is_unstable());
    }

    #[test]
    fn test_identical_seeds_reproduce_the_model() {
        let a = train(&two_user_dataset(), &small_config()).unwrap();
        let b = train(&two_user_dataset(), &small_config()).unwrap();

        assert_eq!(a.loss_trace, b.loss_trace);
        for user in 0..a.store.num_users() as u32 {
            assert_eq!(a.store.user(user), b.store.user(user));
        }
        for item in 0..a.store.num_items() as u32 {
            assert_eq!(a.store.item(item), b.store.item(item));
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = train(&two_user_dataset(), &small_config()).unwrap();
        let mut config = small_config();
        config.model.seed = 99;
        let b = train(&two_user_dataset(), &config).unwrap();

        assert_ne!(a.store.user(0), b.store.user(0));
    }

    #[test]
    fn test_excessive_learning_rate_flags_instability() {
        // A huge step size blows the factors up within an epoch; the
        // diagnostic loss goes non-finite and the run is flagged, but
        // training still finishes all configured epochs.
        let mut config = small_config();
        config.training.learning_rate = 1e8;
        config.training.epochs = 3;

        let model = train(&two_user_dataset(), &config).unwrap();
        assert_eq!(model.loss_trace.len(), 3);
        assert!(model.is_unstable());
        assert!(model.loss_trace.iter().any(|loss| !loss.is_finite()));
        for &epoch in &model.unstable_epochs {
            assert!(!model.loss_trace[epoch].is_finite());
        }
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let mut config = small_config();
        config.training.learning_rate = -1.0;
        assert!(matches!(
            RankingTrainer::new(config),
            Err(RecError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_dataset_without_trainable_pairs() {
        // Single user who has rated the entire catalog: nothing to
        // contrast against, so training is a no-op.
        let dataset = Dataset::new(
            vec![1],
            vec![10, 20],
            vec![Interaction::new(1, 10), Interaction::new(1, 20)],
        );
        let model = train(&dataset, &small_config()).unwrap();
        assert!(model.loss_trace.is_empty());
    }

    #[test]
    fn test_loss_decreases_on_separable_data() {
        // Two users with disjoint tastes; the ranking loss should drop
        // substantially from the first epoch to the last.
        let dataset = Dataset::new(
            vec![1, 2],
            vec![10, 20, 30, 40],
            vec![
                Interaction::new(1, 10),
                Interaction::new(1, 20),
                Interaction::new(2, 30),
                Interaction::new(2, 40),
            ],
        );

        let mut config = small_config();
        config.training.epochs = 200;
        config.training.learning_rate = 0.1;
        config.training.user_reg = 0.0;
        config.training.positive_reg = 0.0;
        config.training.negative_reg = 0.0;

        let model = train(&dataset, &config).unwrap();
        let first = model.loss_trace[0];
        let last = *model.loss_trace.last().unwrap();
        assert!(last < first * 0.8, "loss {} -> {}", first, last);
    }
}
