use crate::error::{RecError, Result};
use crate::models::Interaction;
use std::collections::HashMap;

/// Input handed over by the data-loading collaborator: the full user and
/// item catalogs plus the already-thresholded positive interaction table.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub users: Vec<u64>,
    pub items: Vec<u64>,
    pub interactions: Vec<Interaction>,
}

impl Dataset {
    pub fn new(users: Vec<u64>, items: Vec<u64>, interactions: Vec<Interaction>) -> Self {
        Self {
            users,
            items,
            interactions,
        }
    }
}

/// Bijective mapping between opaque catalog identifiers and the compact
/// zero-based index space. Stable for the lifetime of a training run:
/// indices follow first-seen catalog order.
#[derive(Debug, Clone)]
pub struct IdMap {
    forward: HashMap<u64, u32>,
    reverse: Vec<u64>,
}

impl IdMap {
    pub fn from_ids(ids: &[u64]) -> Self {
        let mut forward = HashMap::with_capacity(ids.len());
        let mut reverse = Vec::with_capacity(ids.len());

        for &id in ids {
            if !forward.contains_key(&id) {
                forward.insert(id, reverse.len() as u32);
                reverse.push(id);
            }
        }

        Self { forward, reverse }
    }

    pub fn index_of(&self, id: u64) -> Option<u32> {
        self.forward.get(&id).copied()
    }

    pub fn id_of(&self, index: u32) -> u64 {
        self.reverse[index as usize]
    }

    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }

    pub fn ids(&self) -> &[u64] {
        &self.reverse
    }
}

/// The interaction table re-expressed over compact indices.
#[derive(Debug, Clone)]
pub struct Interactions {
    pub user_ids: IdMap,
    pub item_ids: IdMap,
    pub pairs: Vec<(u32, u32)>,
}

impl Interactions {
    /// Compiles the raw dataset. Any interaction referencing an identifier
    /// outside the catalogs is fatal rather than silently dropped.
    pub fn compile(dataset: &Dataset) -> Result<Self> {
        let user_ids = IdMap::from_ids(&dataset.users);
        let item_ids = IdMap::from_ids(&dataset.items);

        let mut pairs = Vec::with_capacity(dataset.interactions.len());
        for interaction in &dataset.interactions {
            let user = user_ids
                .index_of(interaction.user_id)
                .ok_or(RecError::UnknownUser(interaction.user_id))?;
            let item = item_ids
                .index_of(interaction.item_id)
                .ok_or(RecError::UnknownItem(interaction.item_id))?;
            pairs.push((user, item));
        }

        Ok(Self {
            user_ids,
            item_ids,
            pairs,
        })
    }

    pub fn num_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn num_items(&self) -> usize {
        self.item_ids.len()
    }
}

/// Per-user partition of the item catalog into known positives and the
/// negative candidate pool (closed-world: unrated items count as
/// negative candidates).
///
/// Both halves are kept as sorted arrays over compact item indices, so
/// membership is a binary search and uniform sampling from the negative
/// pool is a single slice lookup.
#[derive(Debug, Clone)]
pub struct FeedbackIndex {
    positives: Vec<Vec<u32>>,
    negatives: Vec<Vec<u32>>,
    num_items: usize,
}

impl FeedbackIndex {
    /// Builds the partition for every catalog user, including users with
    /// zero observed positives (empty positive set, full-catalog negative
    /// pool). Duplicate interactions collapse.
    pub fn build(interactions: &Interactions) -> Self {
        let num_users = interactions.num_users();
        let num_items = interactions.num_items();

        let mut positives: Vec<Vec<u32>> = vec![Vec::new(); num_users];
        for &(user, item) in &interactions.pairs {
            positives[user as usize].push(item);
        }

        let mut negatives: Vec<Vec<u32>> = Vec::with_capacity(num_users);
        for user_positives in positives.iter_mut() {
            user_positives.sort_unstable();
            user_positives.dedup();

            let mut pool = Vec::with_capacity(num_items - user_positives.len());
            let mut next_positive = user_positives.iter().peekable();
            for item in 0..num_items as u32 {
                if next_positive.peek() == Some(&&item) {
                    next_positive.next();
                } else {
                    pool.push(item);
                }
            }
            negatives.push(pool);
        }

        Self {
            positives,
            negatives,
            num_items,
        }
    }

    pub fn positives(&self, user: u32) -> &[u32] {
        &self.positives[user as usize]
    }

    pub fn negatives(&self, user: u32) -> &[u32] {
        &self.negatives[user as usize]
    }

    pub fn is_positive(&self, user: u32, item: u32) -> bool {
        self.positives[user as usize].binary_search(&item).is_ok()
    }

    pub fn num_users(&self) -> usize {
        self.positives.len()
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }
}
