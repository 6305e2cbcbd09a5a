//! Strategies for dividing a list of task ids between users
use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString};

/// How the ids of the seeded tasks are handed out to the seeded users. Both
/// strategies keep the ids in their original order and never give the same id
/// to more than one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PartitionStrategy {
    /// Each user in turn takes `remaining / users` ids (rounded down) from the
    /// front of the ids that haven't been handed out yet. Because the divisor
    /// stays fixed while the list shrinks, slices get smaller as seeding
    /// progresses, users at the end may get nothing, and ids may be left over.
    #[default]
    Shrinking,

    /// Every user gets `ids / users` ids and the first `ids % users` users get
    /// one extra, so that every id is handed out.
    Even,
}

impl PartitionStrategy {
    /// Divide `ids` into one slice per user
    pub fn partition(&self, ids: &[i64], users: usize) -> Vec<Vec<i64>> {
        match self {
            PartitionStrategy::Shrinking => shrinking(ids, users),
            PartitionStrategy::Even => even(ids, users),
        }
    }
}

fn shrinking(ids: &[i64], users: usize) -> Vec<Vec<i64>> {
    let mut remaining = ids;
    (0..users)
        .map(|_| {
            let (head, tail) = remaining.split_at(remaining.len() / users);
            remaining = tail;
            head.to_vec()
        })
        .collect()
}

fn even(ids: &[i64], users: usize) -> Vec<Vec<i64>> {
    if users == 0 {
        return Vec::new();
    }
    let (base, extra) = (ids.len() / users, ids.len() % users);
    let mut remaining = ids;
    (0..users)
        .map(|i| {
            let n = base + usize::from(i < extra);
            let (head, tail) = remaining.split_at(n);
            remaining = tail;
            head.to_vec()
        })
        .collect()
}
