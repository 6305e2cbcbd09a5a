use crate::{
    cli::{OutputArgs, PageArgs, QueryCommands},
    output::{
        self, OutputFormat,
        rows::{TaskRow, TaskRowFull, TaskSlotRow, UserRow, UserRowFull},
    },
};
use anyhow::{Result, anyhow};
use libtask::{
    Database,
    core::{
        model::{Collection, Model},
        query::{
            DynFilterPart, LimitSpec,
            filter::{Cmp, or},
        },
    },
    task::{self, Task},
    user::{self, User},
};

async fn load<M: Model>(
    collection: Collection<'_, M>,
    filter: Option<DynFilterPart>,
    page: PageArgs,
) -> libtask::Result<Vec<M>> {
    match page.limit {
        Some(count) => {
            collection
                .find_page(
                    filter,
                    LimitSpec {
                        count,
                        offset: page.offset,
                    },
                )
                .await
        }
        None => collection.find_all(filter).await,
    }
}

fn task_filter(text: String) -> DynFilterPart {
    or().push(task::Filter::Title(Cmp::Like, text.clone()))
        .push(task::Filter::Description(Cmp::Like, text))
        .build()
}

fn user_filter(text: String) -> DynFilterPart {
    or().push(user::Filter::FirstName(Cmp::Like, text.clone()))
        .push(user::Filter::LastName(Cmp::Like, text.clone()))
        .push(user::Filter::Email(Cmp::Like, text.clone()))
        .push(user::Filter::JobTitle(Cmp::Like, text))
        .build()
}

pub(crate) async fn handle_command(command: Option<QueryCommands>, db: &Database) -> Result<()> {
    let command = command.unwrap_or(QueryCommands::UserWithTasks {
        output: OutputArgs::default(),
    });
    match command {
        QueryCommands::Tasks {
            filter,
            page,
            output,
        } => {
            let tasks = load(db.collection::<Task>(), filter.map(task_filter), page).await?;
            let str = match output.full {
                true => output::format_seq(tasks.iter().map(TaskRowFull::new), output.format)?,
                false => output::format_seq(tasks.iter().map(TaskRow::new), output.format)?,
            };
            println!("{str}");
            Ok(())
        }
        QueryCommands::Users {
            filter,
            page,
            output,
        } => {
            let users = load(db.collection::<User>(), filter.map(user_filter), page).await?;
            let str = match output.full {
                true => output::format_seq(users.iter().map(UserRowFull::new), output.format)?,
                false => output::format_seq(users.iter().map(UserRow::new), output.format)?,
            };
            println!("{str}");
            Ok(())
        }
        QueryCommands::UserWithTasks { output } => match output.format {
            OutputFormat::Table => {
                let Some(user) = db.collection::<User>().find_one(None).await? else {
                    println!("No users found");
                    return Ok(());
                };
                let details = match output.full {
                    true => output::format_one(UserRowFull::new(&user), OutputFormat::Table)?,
                    false => output::format_one(UserRow::new(&user), OutputFormat::Table)?,
                };
                let refs = user.tasks.clone();
                let populated = user.populate(db).await?;
                let slots = refs
                    .iter()
                    .zip(populated.tasks.iter())
                    .enumerate()
                    .map(|(pos, (id, task))| TaskSlotRow::new(pos, *id, task.as_ref()));
                println!("{details}\n");
                println!("{}", output::format_seq(slots, OutputFormat::Table)?);
                Ok(())
            }
            OutputFormat::Csv => Err(anyhow!("CSV format is not valid for nested documents")),
            fmt => match db.collection::<User>().find_one_populated(None).await? {
                Some(populated) => {
                    println!("{}", output::format_document(&populated, fmt)?);
                    Ok(())
                }
                None => {
                    println!("No users found");
                    Ok(())
                }
            },
        },
    }
}
