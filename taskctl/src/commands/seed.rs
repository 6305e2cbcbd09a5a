use anyhow::Result;
use libtask::{
    Database,
    seed::{self, FakeText, PartitionStrategy, SeedConfig},
};

pub(crate) async fn handle_command(
    tasks: usize,
    users: usize,
    partition: PartitionStrategy,
    random_seed: Option<u64>,
    db: &Database,
) -> Result<()> {
    let config = SeedConfig {
        tasks,
        users,
        partition,
    };
    let report = match random_seed {
        Some(s) => seed::seed(db, &config, &mut FakeText::seeded(s)).await?,
        None => seed::seed(db, &config, &mut FakeText::from_entropy()).await?,
    };
    println!("Created {} tasks and {} users", report.tasks, report.users);
    println!(
        "{} tasks assigned to users, {} unassigned ({} partition)",
        report.assigned, report.unassigned, report.partition
    );
    Ok(())
}
