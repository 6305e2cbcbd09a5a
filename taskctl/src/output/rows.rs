use libtask::{
    core::schema::{FieldSpec, Schema},
    task::Task,
    user::User,
};
use serde::Serialize;
use tabled::Tabled;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

fn display_time(t: Option<OffsetDateTime>) -> String {
    t.and_then(|t| t.format(&Rfc3339).ok()).unwrap_or_default()
}

fn ellipsize(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct TaskRow {
    id: i64,
    title: String,
}

impl TaskRow {
    pub(crate) fn new(task: &Task) -> Self {
        Self {
            id: task.id,
            title: ellipsize(&task.title, 60),
        }
    }
}

#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct TaskRowFull {
    id: i64,
    title: String,
    description: String,
    created: String,
    updated: String,
}

impl TaskRowFull {
    pub(crate) fn new(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            created: display_time(task.created_at),
            updated: display_time(task.updated_at),
        }
    }
}

#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct UserRow {
    id: i64,
    name: String,
    email: String,
    job_title: String,
    tasks: usize,
}

impl UserRow {
    pub(crate) fn new(user: &User) -> Self {
        Self {
            id: user.id,
            name: format!("{} {}", user.first_name, user.last_name),
            email: user.email.clone(),
            job_title: user.job_title.clone(),
            tasks: user.tasks.len(),
        }
    }
}

#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct UserRowFull {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    job_title: String,
    tasks: String,
    created: String,
    updated: String,
}

impl UserRowFull {
    pub(crate) fn new(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            job_title: user.job_title.clone(),
            tasks: user
                .tasks
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(" "),
            created: display_time(user.created_at),
            updated: display_time(user.updated_at),
        }
    }
}

/// One entry of a user's ordered task list after the references were resolved
#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct TaskSlotRow {
    position: usize,
    task: i64,
    title: String,
}

impl TaskSlotRow {
    pub(crate) fn new(position: usize, taskid: i64, task: Option<&Task>) -> Self {
        Self {
            position,
            task: taskid,
            title: match task {
                Some(task) => ellipsize(&task.title, 60),
                None => "(missing)".to_string(),
            },
        }
    }
}

#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct FieldRow {
    document: &'static str,
    field: &'static str,
    #[tabled(rename = "Type")]
    #[serde(rename = "type")]
    kind: String,
    required: bool,
}

impl FieldRow {
    pub(crate) fn new(schema: &Schema, field: &FieldSpec) -> Self {
        Self {
            document: schema.name,
            field: field.name,
            kind: field.kind.to_string(),
            required: field.required,
        }
    }

    /// The bookkeeping timestamps that the store adds to every document of a
    /// schema that asks for them
    pub(crate) fn timestamps(schema: &Schema) -> Vec<Self> {
        if !schema.timestamps {
            return Vec::new();
        }
        ["created_at", "updated_at"]
            .into_iter()
            .map(|field| Self {
                document: schema.name,
                field,
                kind: "timestamp".to_string(),
                required: false,
            })
            .collect()
    }
}
