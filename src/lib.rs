pub mod algorithms;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod ranking;
pub mod utils;

pub use algorithms::{train, RankingTrainer, TrainedModel, TrainerPhase};
pub use config::Config;
pub use data::{Dataset, FeedbackIndex, IdMap, Interactions};
pub use error::{RecError, Result};
pub use models::*;
pub use ranking::{recommend, Scorer};
pub use utils::metrics::evaluate;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
