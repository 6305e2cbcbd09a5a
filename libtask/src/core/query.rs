//! utilities related to database queries
//!
use std::{ops::Deref, sync::Arc};

pub mod filter {
    use super::DynFilterPart;

    /// An operator for combining filter parts to form a more complex filter expression
    #[derive(Clone)]
    pub enum Op {
        Or,
        And,
    }

    #[derive(Clone)]
    /// An object that allows you easily build compound filters that can be applied to SQL queries
    pub struct CompoundFilterBuilder {
        pub(crate) top: CompoundFilter,
    }

    pub fn and() -> CompoundFilterBuilder {
        CompoundFilterBuilder::new(Op::And)
    }

    pub fn or() -> CompoundFilterBuilder {
        CompoundFilterBuilder::new(Op::Or)
    }

    impl CompoundFilterBuilder {
        /// Create a new [CompoundFilterBuilder] object that will combine all filter
        /// expressions using the given operator
        pub fn new(op: Op) -> Self {
            Self {
                top: CompoundFilter::new(op),
            }
        }

        /// Add a new filter expression to this compound filter. It will be combined
        /// with all existing filter expressions using the operator that was specified in
        /// the constructor.
        pub fn push<F: Into<DynFilterPart>>(mut self, filter: F) -> Self {
            self.top.add_filter(filter.into());
            self
        }

        /// Generate a new [CompoundFilter] object from this builder object
        pub fn build(self) -> DynFilterPart {
            self.top.into()
        }
    }

    /// A Trait implemented by anything that can be a filter. It could be a single field or a
    /// multi-level compound filter condition.
    pub trait FilterPart: Send {
        /// convert the given filter part to SQL syntax and add it to the given [sqlx::QueryBuilder] object
        fn add_to_query(&self, builder: &mut sqlx::QueryBuilder<sqlx::Sqlite>);
    }

    #[derive(Clone)]
    /// An object that represents one or more filter conditions that are combined by a single logical
    /// operator ([Op]). Multiple compound filters can be combined together into larger filter
    /// conditions
    pub struct CompoundFilter {
        pub(crate) conditions: Vec<DynFilterPart>,
        pub(crate) op: Op,
    }

    impl CompoundFilter {
        /// Create a new compound filter object
        pub fn new(op: Op) -> Self {
            Self {
                conditions: Default::default(),
                op,
            }
        }

        /// Add a new filter expression to the current filter. It will be combined
        /// with the operator [Op] that was specified in [CompoundFilter::new()]
        pub fn add_filter(&mut self, filter: DynFilterPart) {
            self.conditions.push(filter);
        }
    }

    impl FilterPart for CompoundFilter {
        fn add_to_query(&self, builder: &mut sqlx::QueryBuilder<sqlx::Sqlite>) {
            if self.conditions.is_empty() {
                builder.push("TRUE");
                return;
            }

            let mut first = true;
            builder.push(" (");
            let separator = match self.op {
                Op::And => " AND ",
                Op::Or => " OR ",
            };

            for cond in &self.conditions {
                if first {
                    first = false;
                } else {
                    builder.push(separator);
                }
                cond.add_to_query(builder);
            }
            builder.push(")");
        }
    }

    #[derive(Clone, Debug)]
    /// An object representing the comparison operator that is used in a filter expression
    pub enum Cmp {
        Equal,
        Like,
    }

    impl Cmp {
        /// The value that should be bound for `value` when comparing with this operator.
        /// [Cmp::Like] matches the value anywhere in the field.
        pub fn pattern(&self, value: &str) -> String {
            match self {
                Cmp::Like => format!("%{value}%"),
                _ => value.to_string(),
            }
        }
    }

    impl std::fmt::Display for Cmp {
        fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            match self {
                Cmp::Equal => write!(f, " IS "),
                Cmp::Like => write!(f, " LIKE "),
            }
        }
    }

    /// Add an `column IN (...)` expression for the given ids. An empty list of ids
    /// matches nothing.
    pub(crate) fn push_id_list(
        builder: &mut sqlx::QueryBuilder<sqlx::Sqlite>,
        column: &str,
        ids: &[i64],
    ) {
        if ids.is_empty() {
            builder.push(" FALSE");
            return;
        }
        builder.push(format!(" {column} IN ("));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
    }
}

/// The largest number of ids (or rows) bound in a single batched statement.
/// SQLite rejects statements with more than 32766 bound variables, so longer
/// lists are split into batches of this size.
pub(crate) const MAX_BATCH: usize = 1000;

/// A type for specifying the number of rows to return for an SQL query
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct LimitSpec {
    /// The number of items to return
    pub count: i32,
    /// An optional offset of rows to return. For example, if this value is
    /// `Some(10)`, it means to start returning items starting with the 10th
    /// row.
    pub offset: Option<i32>,
}

impl From<i32> for LimitSpec {
    fn from(count: i32) -> Self {
        LimitSpec {
            count,
            offset: None,
        }
    }
}

impl ToSql for LimitSpec {
    fn to_sql(&self) -> String {
        match self.offset {
            None => format!("LIMIT {}", self.count),
            Some(offset) => format!("LIMIT {} OFFSET {offset}", self.count),
        }
    }
}

/// a trait that generates an sql respresentation of the implementing type
pub trait ToSql {
    fn to_sql(&self) -> String;
}

#[derive(Clone)]
pub struct DynFilterPart(Arc<dyn filter::FilterPart + Sync>);

impl Deref for DynFilterPart {
    type Target = Arc<dyn filter::FilterPart + Sync>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<F> From<F> for DynFilterPart
where
    F: filter::FilterPart + Send + Sync + 'static,
{
    fn from(value: F) -> Self {
        DynFilterPart(Arc::new(value))
    }
}
