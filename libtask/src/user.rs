//! Objects to manage users and the tasks assigned to them
use crate::{
    Database, Result,
    core::{
        model::{Collection, Model},
        query::{
            DynFilterPart, LimitSpec, MAX_BATCH, ToSql, filter::Cmp, filter::FilterPart,
            filter::push_id_list,
        },
        schema::{Document, FieldKind, FieldSpec, Schema},
    },
    task::Task,
};
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use std::collections::HashMap;
use time::OffsetDateTime;
use tracing::debug;

/// A type for specifying fields that can be used for filtering a database query
/// for users
#[derive(Clone)]
pub enum Filter {
    /// Match users whose ID is any of the given values
    Ids(Vec<i64>),

    FirstName(Cmp, String),

    LastName(Cmp, String),

    Email(Cmp, String),

    JobTitle(Cmp, String),
}

impl FilterPart for Filter {
    fn add_to_query(&self, builder: &mut QueryBuilder<Sqlite>) {
        let (column, cmp, frag) = match self {
            Self::Ids(ids) => return push_id_list(builder, "U.userid", ids),
            Self::FirstName(cmp, frag) => ("U.first_name", cmp, frag),
            Self::LastName(cmp, frag) => ("U.last_name", cmp, frag),
            Self::Email(cmp, frag) => ("U.email", cmp, frag),
            Self::JobTitle(cmp, frag) => ("U.job_title", cmp, frag),
        };
        builder
            .push(format!(" {column} "))
            .push(cmp)
            .push_bind(cmp.pattern(frag));
    }
}

/// A person who may be assigned any number of tasks
#[derive(Debug, sqlx::FromRow, Serialize, PartialEq, Clone)]
pub struct User {
    /// A unique ID that identifies this user in the database
    #[sqlx(rename = "userid")]
    pub id: i64,

    pub first_name: String,

    pub last_name: String,

    pub email: String,

    pub job_title: String,

    /// The ids of the tasks assigned to this user, in order. These are not
    /// checked against the task collection and may refer to tasks that no
    /// longer exist.
    #[sqlx(skip)]
    pub tasks: Vec<i64>,

    #[serde(serialize_with = "time::serde::rfc3339::option::serialize")]
    pub created_at: Option<OffsetDateTime>,

    #[serde(serialize_with = "time::serde::rfc3339::option::serialize")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Document for User {
    fn text_field(&self, name: &str) -> Option<&str> {
        match name {
            "first_name" => Some(&self.first_name),
            "last_name" => Some(&self.last_name),
            "email" => Some(&self.email),
            "job_title" => Some(&self.job_title),
            _ => None,
        }
    }
}

#[async_trait]
impl Model for User {
    const SCHEMA: Schema = Schema {
        name: "User",
        collection: "users",
        fields: &[
            FieldSpec::required("first_name", FieldKind::Text),
            FieldSpec::required("last_name", FieldKind::Text),
            FieldSpec::required("email", FieldKind::Text),
            FieldSpec::required("job_title", FieldKind::Text),
            FieldSpec::optional("tasks", FieldKind::References("tasks")),
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
        let mut users: Vec<User> = Self::build_query(filter, limit)
            .build_query_as()
            .fetch_all(db.pool())
            .await?;
        Self::load_task_refs(&mut users, db).await?;
        Ok(users)
    }

    async fn insert_row(&self, at: OffsetDateTime, conn: &mut SqliteConnection) -> Result<i64> {
        let userid = sqlx::query(
            r#"INSERT INTO users
            (first_name, last_name, email, job_title, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(&self.email)
        .bind(&self.job_title)
        .bind(at)
        .bind(at)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        let refs: Vec<(usize, &i64)> = self.tasks.iter().enumerate().collect();
        for batch in refs.chunks(MAX_BATCH) {
            let mut qb = QueryBuilder::new("INSERT INTO user_tasks (userid, position, taskid) ");
            qb.push_values(batch, |mut b, (pos, taskid)| {
                b.push_bind(userid).push_bind(*pos as i64).push_bind(**taskid);
            });
            qb.build().execute(&mut *conn).await?;
        }
        Ok(userid)
    }
}

impl User {
    fn build_query(
        filter: Option<DynFilterPart>,
        limit: Option<LimitSpec>,
    ) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(
            r#"SELECT U.userid, U.first_name, U.last_name, U.email, U.job_title,
            U.created_at, U.updated_at FROM users U"#,
        );
        if let Some(f) = filter {
            qb.push(" WHERE ");
            f.add_to_query(&mut qb);
        }
        qb.push(" ORDER BY U.userid ASC");
        if let Some(l) = limit {
            qb.push(" ");
            qb.push(l.to_sql());
        }
        qb
    }

    /// Fill in the `tasks` reference lists for the given users, one batch of
    /// users per query
    async fn load_task_refs(users: &mut [User], db: &Database) -> Result<()> {
        for batch in users.chunks_mut(MAX_BATCH) {
            let userids: Vec<i64> = batch.iter().map(|u| u.id).collect();
            let mut qb = QueryBuilder::new("SELECT userid, taskid FROM user_tasks WHERE");
            push_id_list(&mut qb, "userid", &userids);
            qb.push(" ORDER BY userid, position");
            let rows: Vec<(i64, i64)> = qb.build_query_as().fetch_all(db.pool()).await?;

            let mut refs: HashMap<i64, Vec<i64>> = HashMap::new();
            for (userid, taskid) in rows {
                refs.entry(userid).or_default().push(taskid);
            }
            for user in batch.iter_mut() {
                user.tasks = refs.remove(&user.id).unwrap_or_default();
            }
        }
        Ok(())
    }

    /// Creates a new user object with the given data. It will initially have
    /// an invalid ID until it is inserted into the database
    pub fn new(
        first_name: String,
        last_name: String,
        email: String,
        job_title: String,
        tasks: Vec<i64>,
    ) -> Self {
        Self {
            id: Self::invalid_id(),
            first_name,
            last_name,
            email,
            job_title,
            tasks,
            created_at: None,
            updated_at: None,
        }
    }

    /// Resolve this user's task references into the tasks themselves. The
    /// referenced tasks are fetched in a single query. A reference to a task
    /// that doesn't exist results in a `None` in that position rather than an
    /// error.
    pub async fn populate(self, db: &Database) -> Result<PopulatedUser> {
        let found = db.collection::<Task>().find_by_ids(&self.tasks).await?;
        let by_id: HashMap<i64, Task> = found.into_iter().map(|t| (t.id, t)).collect();
        let tasks: Vec<Option<Task>> = self.tasks.iter().map(|id| by_id.get(id).cloned()).collect();
        let missing = tasks.iter().filter(|t| t.is_none()).count();
        if missing > 0 {
            debug!(userid = self.id, missing, "user refers to tasks that don't exist");
        }
        Ok(PopulatedUser {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            job_title: self.job_title,
            tasks,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// A user with its task references replaced by the referenced tasks
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct PopulatedUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub job_title: String,
    /// The referenced tasks, in reference order. `None` marks a reference to a
    /// task that couldn't be found.
    pub tasks: Vec<Option<Task>>,
    #[serde(serialize_with = "time::serde::rfc3339::option::serialize")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(serialize_with = "time::serde::rfc3339::option::serialize")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Collection<'_, User> {
    /// Load the first matching user in natural order with its task references
    /// resolved
    pub async fn find_one_populated(
        &self,
        filter: Option<DynFilterPart>,
    ) -> Result<Option<PopulatedUser>> {
        match self.find_one(filter).await? {
            Some(user) => user.populate(self.database()).await.map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use sqlx::Pool;
    use test_log::test;

    fn user(first: &str, tasks: Vec<i64>) -> User {
        User::new(
            first.to_string(),
            "Tester".to_string(),
            format!("{}@example.com", first.to_lowercase()),
            "Inspector".to_string(),
            tasks,
        )
    }

    #[test(sqlx::test(
        migrations = "../db/migrations/",
        fixtures(path = "../../db/fixtures", scripts("tasks"))
    ))]
    async fn test_insert_users(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let users = db.collection::<User>();
        let mut batch = vec![user("Ana", vec![4, 2]), user("Bo", vec![]), user("Cy", vec![1])];
        users.insert_many(&mut batch).await.expect("failed to insert");

        let loaded = users.find_all(None).await.expect("failed to load users");
        assert_eq!(loaded, batch);
        assert_eq!(loaded[0].tasks, vec![4, 2]);
        assert!(loaded[1].tasks.is_empty());

        let mut invalid = user("", vec![3]);
        invalid.job_title.clear();
        match users.insert(&mut invalid).await {
            Err(Error::Validation {
                collection,
                missing,
            }) => {
                assert_eq!(collection, "users");
                assert_eq!(missing, vec!["first_name", "job_title"]);
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert_eq!(users.find_all(None).await.unwrap().len(), 3);
    }

    #[test(sqlx::test(
        migrations = "../db/migrations/",
        fixtures(path = "../../db/fixtures", scripts("tasks", "users"))
    ))]
    async fn test_find_users(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let users = db.collection::<User>();

        let all = users.find_all(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].tasks, vec![3, 1]);
        assert_eq!(all[1].tasks, vec![2]);
        assert!(all[2].tasks.is_empty());

        let found = users
            .find_all(Some(Filter::JobTitle(Cmp::Equal, "Botanist".to_string()).into()))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_name, "Lin");
        assert_eq!(found[0].tasks, vec![2]);
    }

    #[test(sqlx::test(
        migrations = "../db/migrations/",
        fixtures(path = "../../db/fixtures", scripts("tasks", "users"))
    ))]
    async fn test_populate(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let populated = db
            .collection::<User>()
            .find_one_populated(None)
            .await
            .expect("failed to populate")
            .expect("no users found");
        assert_eq!(populated.id, 1);
        assert_eq!(populated.first_name, "Ada");

        let tasks = db.collection::<Task>();
        let expected = vec![
            tasks.find_by_id(3).await.unwrap(),
            tasks.find_by_id(1).await.unwrap(),
        ];
        assert_eq!(populated.tasks, expected);
        assert!(populated.tasks.iter().all(Option::is_some));
    }

    #[test(sqlx::test(
        migrations = "../db/migrations/",
        fixtures(path = "../../db/fixtures", scripts("tasks", "users", "dangling"))
    ))]
    async fn test_populate_missing_task(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let sam = db
            .collection::<User>()
            .find_by_id(3)
            .await
            .unwrap()
            .expect("user 3 not found");
        assert_eq!(sam.tasks, vec![4, 999, 2]);

        let populated = sam.populate(&db).await.expect("populate should not fail");
        assert_eq!(populated.tasks.len(), 3);
        assert_eq!(populated.tasks[0].as_ref().map(|t| t.id), Some(4));
        assert_eq!(populated.tasks[1], None);
        assert_eq!(populated.tasks[2].as_ref().map(|t| t.id), Some(2));
    }

    #[test(sqlx::test(
        migrations = "../db/migrations/",
        fixtures(path = "../../db/fixtures", scripts("tasks"))
    ))]
    async fn test_populate_repeated_reference(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let mut u = user("Dee", vec![2, 2]);
        db.collection::<User>().insert(&mut u).await.unwrap();
        let populated = u.populate(&db).await.unwrap();
        assert_eq!(populated.tasks[0], populated.tasks[1]);
        assert!(populated.tasks[0].is_some());
    }

    #[test(sqlx::test(migrations = "../db/migrations/"))]
    async fn test_populate_empty_collection(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let none = db.collection::<User>().find_one_populated(None).await.unwrap();
        assert!(none.is_none());
    }

    #[test(sqlx::test(migrations = "../db/migrations/"))]
    async fn test_more_users_than_bind_variables(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let users = db.collection::<User>();
        let mut batch: Vec<User> = (0..33_000)
            .map(|i| user(&format!("User{i}"), Vec::new()))
            .collect();
        // one long reference list, none of which exist as tasks
        batch[0].tasks = (1..=12_000).collect();
        users.insert_many(&mut batch).await.expect("failed to insert");

        let loaded = users.find_all(None).await.expect("failed to load users");
        assert_eq!(loaded.len(), 33_000);
        assert_eq!(loaded[0].tasks, batch[0].tasks);
        assert!(loaded[1..].iter().all(|u| u.tasks.is_empty()));

        let ids: Vec<i64> = batch.iter().rev().map(|u| u.id).collect();
        let found = users.find_by_ids(&ids).await.expect("failed to load by ids");
        assert_eq!(found.len(), 33_000);
        assert!(found.windows(2).all(|w| w[0].id < w[1].id));

        let populated = loaded[0].clone().populate(&db).await.unwrap();
        assert_eq!(populated.tasks.len(), 12_000);
        assert!(populated.tasks.iter().all(Option::is_none));
    }
}
