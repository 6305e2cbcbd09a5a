//! Fill the database with random sample tasks and users.
//!
//! Seeding happens in two phases, each of which is a single bulk insert: first
//! all tasks are created without an owner, then the users are created, each
//! claiming a slice of the new task ids. The phases are not wrapped in a common
//! transaction, so if the user phase fails the tasks stay in the database.
use crate::{Database, Result, task::Task, user::User};
use serde::Serialize;
use tracing::{debug, info};

pub mod partition;
pub mod text;

pub use partition::PartitionStrategy;
pub use text::{FakeText, TextSource};

/// Parameters for a seeding run
#[derive(Debug, Clone, PartialEq)]
pub struct SeedConfig {
    /// The number of tasks to create
    pub tasks: usize,
    /// The number of users to create
    pub users: usize,
    /// How task ids are divided between the users
    pub partition: PartitionStrategy,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            tasks: 400,
            users: 100,
            partition: PartitionStrategy::default(),
        }
    }
}

/// A summary of what a seeding run created
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedReport {
    pub tasks: usize,
    pub users: usize,
    pub partition: PartitionStrategy,
    /// The number of task ids that were given to some user
    pub assigned: usize,
    /// The number of tasks that no user refers to
    pub unassigned: usize,
}

/// Generate `count` tasks and store them in a single bulk insert. The returned
/// tasks carry the ids assigned by the database.
pub async fn create_tasks<S: TextSource>(
    db: &Database,
    count: usize,
    text: &mut S,
) -> Result<Vec<Task>> {
    let mut tasks: Vec<Task> = (0..count)
        .map(|_| Task::new(text.sentence(), text.paragraph()))
        .collect();
    db.collection::<Task>().insert_many(&mut tasks).await?;
    info!("created {} tasks", tasks.len());
    Ok(tasks)
}

/// Generate `count` users, divide `taskids` between them with `partition` and
/// store the users in a single bulk insert.
pub async fn create_users_with_tasks<S: TextSource>(
    db: &Database,
    count: usize,
    taskids: &[i64],
    partition: PartitionStrategy,
    text: &mut S,
) -> Result<Vec<User>> {
    let slices = partition.partition(taskids, count);
    debug!(
        %partition,
        sizes = ?slices.iter().map(Vec::len).collect::<Vec<_>>(),
        "partitioned task ids"
    );
    let mut users: Vec<User> = slices
        .into_iter()
        .map(|tasks| {
            User::new(
                text.first(),
                text.last(),
                text.email(),
                text.profession(),
                tasks,
            )
        })
        .collect();
    db.collection::<User>().insert_many(&mut users).await?;
    info!("created {} users", users.len());
    Ok(users)
}

/// Run both seeding phases
pub async fn seed<S: TextSource>(
    db: &Database,
    config: &SeedConfig,
    text: &mut S,
) -> Result<SeedReport> {
    debug!(?config, "seeding database");
    let tasks = create_tasks(db, config.tasks, text).await?;
    let taskids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
    let users = create_users_with_tasks(db, config.users, &taskids, config.partition, text).await?;
    let assigned = users.iter().map(|u| u.tasks.len()).sum();
    Ok(SeedReport {
        tasks: tasks.len(),
        users: users.len(),
        partition: config.partition,
        assigned,
        unassigned: tasks.len() - assigned,
    })
}
