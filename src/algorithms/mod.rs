pub mod factors;
pub mod gradient;
pub mod initializer;
pub mod optimizer;
pub mod sampler;
pub mod trainer;

pub use factors::FactorStore;
pub use gradient::{PairwiseGradient, TripleGradient};
pub use sampler::{NegativeSampler, PairSampler};
pub use trainer::{train, RankingTrainer, TrainedModel, TrainerPhase};
