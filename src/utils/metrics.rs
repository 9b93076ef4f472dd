use crate::algorithms::TrainedModel;
use crate::error::Result;
use crate::models::EvaluationReport;
use crate::ranking::recommend;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Precision@N for one user: the fraction of the top-N list that appears
/// in the held-out relevant set. The divisor is N, not the list length.
pub fn precision_at_n(recommended: &[u64], relevant: &HashSet<u64>, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }

    let hits = recommended
        .iter()
        .take(n)
        .filter(|item| relevant.contains(item))
        .count();

    hits as f64 / n as f64
}

/// Offline evaluation against externally supplied ground truth.
///
/// Only users present in the `relevant` mapping contribute to the mean;
/// everyone else is excluded rather than counted as zero. Users whose
/// negative pool is empty cannot be ranked with exclusion and are
/// skipped. The sweep is read-only over the model, so users are scored
/// in parallel.
pub fn evaluate(
    model: &TrainedModel,
    relevant: &HashMap<u64, HashSet<u64>>,
    n: usize,
) -> Result<EvaluationReport> {
    let per_user: Vec<Option<(u64, f64)>> = relevant
        .par_iter()
        .map(|(&user_id, relevant_items)| {
            model.user_index(user_id)?;

            let recs = match recommend(model, user_id, n, true) {
                Ok(recs) => recs,
                Err(crate::error::RecError::EmptyNegativePool { .. }) => {
                    debug!(user = user_id, "skipping user with empty negative pool");
                    return Ok(None);
                }
                Err(e) => return Err(e),
            };

            let recommended: Vec<u64> = recs.iter().map(|r| r.item_id).collect();
            Ok(Some((user_id, precision_at_n(&recommended, relevant_items, n))))
        })
        .collect::<Result<_>>()?;

    let per_user_precision: HashMap<u64, f64> = per_user.into_iter().flatten().collect();
    let evaluated_users = per_user_precision.len();
    let mean_precision = if evaluated_users > 0 {
        per_user_precision.values().sum::<f64>() / evaluated_users as f64
    } else {
        0.0
    };

    Ok(EvaluationReport {
        mean_precision,
        per_user_precision,
        evaluated_users,
    })
}
