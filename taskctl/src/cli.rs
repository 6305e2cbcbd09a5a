use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use libtask::seed::PartitionStrategy;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(
        short,
        long,
        global = true,
        env = "TASKCTL_DATABASE",
        help = "Sqlite url of the database (e.g. 'sqlite://tasks.sqlite')"
    )]
    pub database: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Fill the database with random tasks and users")]
    Seed {
        #[arg(long, default_value_t = 400, help = "Number of tasks to create")]
        tasks: usize,
        #[arg(long, default_value_t = 100, help = "Number of users to create")]
        users: usize,
        #[arg(
            long,
            default_value_t = PartitionStrategy::Shrinking,
            help = "How task ids are divided between users ('shrinking' or 'even')"
        )]
        partition: PartitionStrategy,
        #[arg(long, help = "Seed for the random text generator")]
        seed: Option<u64>,
    },
    #[command(about = "Read tasks and users from the database")]
    Query {
        #[command(subcommand)]
        command: Option<QueryCommands>,
    },
    #[command(about = "Show the shape of the stored documents")]
    Schema {
        #[command(flatten)]
        output: OutputArgs,
    },
    #[command(about = "Manage the taskctl configuration")]
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum QueryCommands {
    #[command(about = "List all tasks")]
    Tasks {
        #[arg(short, long, help = "Only show tasks with this text in the title or description")]
        filter: Option<String>,
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    #[command(about = "List all users with the ids of their tasks")]
    Users {
        #[arg(
            short,
            long,
            help = "Only show users with this text in their name, email or job title"
        )]
        filter: Option<String>,
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    #[command(about = "Show the first user with its tasks resolved (default)")]
    UserWithTasks {
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    #[command(about = "Show the current configuration")]
    Show,
    #[command(about = "Set the database that is used when --database isn't given")]
    SetDatabase { url: String },
}

#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    #[arg(short = 'o', long = "output", value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
    #[arg(long, help = "Show all fields")]
    pub full: bool,
}

#[derive(Args, Debug)]
pub struct PageArgs {
    #[arg(long, help = "Maximum number of records to show")]
    pub limit: Option<i32>,
    #[arg(long, requires = "limit", help = "Number of records to skip")]
    pub offset: Option<i32>,
}
