//! Objects to manage tasks, the documents that users are assigned to work on
use crate::{
    Database, Result,
    core::{
        model::Model,
        query::{DynFilterPart, LimitSpec, ToSql, filter::Cmp, filter::FilterPart, filter::push_id_list},
        schema::{Document, FieldKind, FieldSpec, Schema},
    },
};
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use time::OffsetDateTime;

/// A type for specifying fields that can be used for filtering a database query
/// for tasks
#[derive(Clone)]
pub enum Filter {
    /// Match tasks whose ID is any of the given values
    Ids(Vec<i64>),

    /// Compare the title of the task to the given value
    Title(Cmp, String),

    /// Compare the description of the task to the given value
    Description(Cmp, String),
}

impl FilterPart for Filter {
    fn add_to_query(&self, builder: &mut QueryBuilder<Sqlite>) {
        match self {
            Self::Ids(ids) => push_id_list(builder, "T.taskid", ids),
            Self::Title(cmp, frag) => {
                builder.push(" T.title ").push(cmp).push_bind(cmp.pattern(frag));
            }
            Self::Description(cmp, frag) => {
                builder
                    .push(" T.description ")
                    .push(cmp)
                    .push_bind(cmp.pattern(frag));
            }
        }
    }
}

/// A unit of work with a short title and a longer description. Tasks are
/// created without an owner; users refer to them by id.
#[derive(Debug, sqlx::FromRow, Serialize, PartialEq, Clone)]
pub struct Task {
    /// A unique ID that identifies this task in the database
    #[sqlx(rename = "taskid")]
    pub id: i64,

    /// A short summary of the task
    pub title: String,

    /// A longer description of the task
    pub description: String,

    /// When the task was stored. `None` until it is inserted.
    #[serde(serialize_with = "time::serde::rfc3339::option::serialize")]
    pub created_at: Option<OffsetDateTime>,

    #[serde(serialize_with = "time::serde::rfc3339::option::serialize")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Document for Task {
    fn text_field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => Some(&self.title),
            "description" => Some(&self.description),
            _ => None,
        }
    }
}

#[async_trait]
impl Model for Task {
    const SCHEMA: Schema = Schema {
        name: "Task",
        collection: "tasks",
        fields: &[
            FieldSpec::required("title", FieldKind::Text),
            FieldSpec::required("description", FieldKind::Text),
        ],
        timestamps: true,
    };

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id
    }

    fn set_timestamps(&mut self, at: OffsetDateTime) {
        self.created_at = Some(at);
        self.updated_at = Some(at);
    }

    fn id_filter(ids: &[i64]) -> DynFilterPart {
        Filter::Ids(ids.to_vec()).into()
    }

    async fn fetch(
        filter: Option<DynFilterPart>,
        limit: Option<LimitSpec>,
        db: &Database,
    ) -> Result<Vec<Self>> {
        Self::build_query(filter, limit)
            .build_query_as()
            .fetch_all(db.pool())
            .await
            .map_err(|e| e.into())
    }

    async fn insert_row(&self, at: OffsetDateTime, conn: &mut SqliteConnection) -> Result<i64> {
        sqlx::query(
            r#"INSERT INTO tasks (title, description, created_at, updated_at)
            VALUES (?, ?, ?, ?)"#,
        )
        .bind(&self.title)
        .bind(&self.description)
        .bind(at)
        .bind(at)
        .execute(conn)
        .await
        .map(|r| r.last_insert_rowid())
        .map_err(|e| e.into())
    }
}

impl Task {
    fn build_query(
        filter: Option<DynFilterPart>,
        limit: Option<LimitSpec>,
    ) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(
            "SELECT T.taskid, T.title, T.description, T.created_at, T.updated_at FROM tasks T",
        );
        if let Some(f) = filter {
            qb.push(" WHERE ");
            f.add_to_query(&mut qb);
        }
        qb.push(" ORDER BY T.taskid ASC");
        if let Some(l) = limit {
            qb.push(" ");
            qb.push(l.to_sql());
        }
        qb
    }

    /// Creates a new task object with the given data. It will initially have
    /// an invalid ID until it is inserted into the database
    pub fn new(title: String, description: String) -> Self {
        Self {
            id: Self::invalid_id(),
            title,
            description,
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, core::query::filter::or};
    use sqlx::Pool;
    use test_log::test;

    #[test(sqlx::test(migrations = "../db/migrations/"))]
    async fn test_insert_tasks(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let tasks = db.collection::<Task>();

        let mut task = Task::new("Repot the ferns".to_string(), "Use the big pots".to_string());
        let id = tasks.insert(&mut task).await.expect("failed to insert");
        assert_eq!(task.id, id);
        assert!(task.created_at.is_some());
        assert_eq!(task.created_at, task.updated_at);

        let loaded = tasks
            .find_by_id(id)
            .await
            .expect("Failed to load inserted task")
            .expect("Inserted task not found");
        assert_eq!(task, loaded);

        // already inserted
        match tasks.insert(&mut task).await {
            Err(Error::InvalidInsertObjectAlreadyExists(existing)) => assert_eq!(existing, id),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test(sqlx::test(migrations = "../db/migrations/"))]
    async fn test_insert_many_validates_first(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let tasks = db.collection::<Task>();
        let mut batch = vec![
            Task::new("first".to_string(), "ok".to_string()),
            Task::new("".to_string(), "no title".to_string()),
            Task::new("third".to_string(), "ok".to_string()),
        ];

        match tasks.insert_many(&mut batch).await {
            Err(Error::Validation {
                collection,
                missing,
            }) => {
                assert_eq!(collection, "tasks");
                assert_eq!(missing, vec!["title"]);
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert!(batch.iter().all(|t| t.id == Task::invalid_id()));
        assert!(tasks.find_all(None).await.unwrap().is_empty());

        batch[1].title = "second".to_string();
        tasks.insert_many(&mut batch).await.expect("failed to insert");
        let ids: Vec<i64> = batch.iter().map(|t| t.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(tasks.find_all(None).await.unwrap(), batch);
    }

    #[test(sqlx::test(
        migrations = "../db/migrations/",
        fixtures(path = "../../db/fixtures", scripts("tasks"))
    ))]
    async fn test_find_tasks(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let tasks = db.collection::<Task>();

        let all = tasks.find_all(None).await.expect("Failed to load tasks");
        assert_eq!(all.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);

        let first = tasks.find_one(None).await.unwrap().expect("No tasks found");
        assert_eq!(first.title, "Water the seedlings");

        let filter = or()
            .push(Filter::Title(Cmp::Like, "tray".to_string()))
            .push(Filter::Description(Cmp::Like, "benches".to_string()))
            .build();
        let found = tasks.find_all(Some(filter)).await.unwrap();
        assert_eq!(found.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 4]);

        let found = tasks.find_by_ids(&[4, 2, 42]).await.unwrap();
        assert_eq!(found.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 4]);
        let found = tasks.find_by_ids(&[4, 2, 4]).await.unwrap();
        assert_eq!(found.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 4]);
        assert!(tasks.find_by_ids(&[]).await.unwrap().is_empty());
        assert!(tasks.find_by_id(42).await.unwrap().is_none());

        let page = tasks
            .find_page(
                None,
                LimitSpec {
                    count: 2,
                    offset: Some(1),
                },
            )
            .await
            .unwrap();
        assert_eq!(page.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 3]);

        let bad_page = LimitSpec {
            count: 2,
            offset: Some(-1),
        };
        assert!(matches!(
            tasks.find_page(None, bad_page).await,
            Err(Error::InvalidOperation(_))
        ));
    }
}
