//! PostgreSQL search repository.
//!
//! Translates the search pipeline onto a single `SELECT`:
//! - the predicate is a `sea_query::Condition` (`WHERE`)
//! - ordering keys map to flat columns (`OrderKey::column`), ascending keys
//!   sort `NULLS FIRST` and descending keys `NULLS LAST`, matching the
//!   in-memory ordering of [`SortValue::Null`](crate::SortValue)
//! - skip/take become `OFFSET`/`LIMIT`
//! - a [`SqlProjection`] becomes the select list (`source AS alias`)
//!
//! Statements are built eagerly and executed through a [`StoreExecutor`].

use crate::error::SearchError;
use crate::executor::StoreExecutor;
use crate::projection::Projector;
use crate::query::ordering::SortDirection;
use crate::query::selector::OrderKey;
use crate::repository::{compose_skip, compose_take, BoxFuture, Queryable, SearchRepository};
use crate::store::value_conversion::with_converted_params;
use may_postgres::Row;
use sea_query::{Condition, Expr, Iden, NullOrdering, Order, PostgresQueryBuilder, Query, SelectStatement, Values};
use std::marker::PhantomData;
use std::sync::Arc;

/// Decode a record from a result row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self, may_postgres::Error>;
}

/// Runtime table/column identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlName(String);

impl SqlName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl Iden for SqlName {
    fn unquoted(&self) -> &str {
        &self.0
    }
}

/// One entry of a store-side projection: `source AS alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnProjection {
    pub source: String,
    pub alias: String,
}

impl ColumnProjection {
    pub fn new(source: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            alias: alias.into(),
        }
    }
}

fn run_select<T, Ex>(executor: &Ex, sql: &str, values: &Values) -> Result<Vec<T>, SearchError>
where
    T: FromRow,
    Ex: StoreExecutor + ?Sized,
{
    with_converted_params(values, |params| {
        let rows = executor.query_all(sql, params)?;
        rows.iter()
            .map(|row| T::from_row(row).map_err(|e| SearchError::Parse(format!("Failed to parse row: {e}"))))
            .collect()
    })
}

fn run_count<Ex>(executor: &Ex, sql: &str, values: &Values) -> Result<u64, SearchError>
where
    Ex: StoreExecutor + ?Sized,
{
    with_converted_params(values, |params| {
        let row = executor.query_one(sql, params)?;
        let count: i64 = row
            .try_get(0)
            .map_err(|e| SearchError::Parse(format!("Failed to read count: {e}")))?;
        u64::try_from(count).map_err(|_| SearchError::Parse(format!("Count cannot be negative: {count}")))
    })
}

/// Search repository over one PostgreSQL table.
///
/// The `*_async` forms run the `may_postgres` call when first polled and do
/// not yield. Await them from a `may` coroutine; on an async runtime worker
/// they block the thread for the whole round trip.
pub struct SqlRepository<S, Ex> {
    executor: Arc<Ex>,
    table: String,
    _model: PhantomData<fn() -> S>,
}

impl<S, Ex> SqlRepository<S, Ex> {
    pub fn new(executor: Arc<Ex>, table: impl Into<String>) -> Self {
        Self {
            executor,
            table: table.into(),
            _model: PhantomData,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// `SELECT COUNT(*)` for `predicate`.
    pub fn count_statement(&self, predicate: &Condition) -> SelectStatement {
        let mut statement = Query::select();
        statement
            .expr(Expr::cust("COUNT(*)"))
            .from(SqlName::new(&self.table))
            .cond_where(predicate.clone());
        statement
    }
}

impl<S, Ex> SearchRepository<S> for SqlRepository<S, Ex>
where
    S: FromRow + Send + 'static,
    Ex: StoreExecutor + Send + Sync + 'static,
{
    type Predicate = Condition;
    type Query = SqlQuery<S, Ex>;

    fn count(&self, predicate: &Self::Predicate) -> Result<u64, SearchError> {
        let (sql, values) = self.count_statement(predicate).build(PostgresQueryBuilder);
        run_count(&*self.executor, &sql, &values)
    }

    fn count_async<'a>(&'a self, predicate: &'a Self::Predicate) -> BoxFuture<'a, Result<u64, SearchError>> {
        let (sql, values) = self.count_statement(predicate).build(PostgresQueryBuilder);
        let executor = Arc::clone(&self.executor);
        Box::pin(async move { run_count(&*executor, &sql, &values) })
    }

    fn query(&self, predicate: &Self::Predicate) -> Self::Query {
        SqlQuery {
            executor: Arc::clone(&self.executor),
            table: self.table.clone(),
            condition: predicate.clone(),
            orders: Vec::new(),
            skip: 0,
            take: None,
            _model: PhantomData,
        }
    }
}

/// Lazy `SELECT` over a [`SqlRepository`] table.
pub struct SqlQuery<S, Ex> {
    executor: Arc<Ex>,
    table: String,
    condition: Condition,
    orders: Vec<(String, SortDirection)>,
    skip: u64,
    take: Option<u64>,
    _model: PhantomData<fn() -> S>,
}

impl<S, Ex> SqlQuery<S, Ex> {
    /// Statement selecting every column.
    pub fn statement(&self) -> SelectStatement {
        self.build_statement(None)
    }

    /// Statement selecting only the projected columns.
    pub fn projected_statement(&self, columns: &[ColumnProjection]) -> SelectStatement {
        self.build_statement(Some(columns))
    }

    /// SQL with values inlined, for logging and tests.
    pub fn to_sql(&self) -> String {
        self.statement().to_string(PostgresQueryBuilder)
    }

    fn build_statement(&self, columns: Option<&[ColumnProjection]>) -> SelectStatement {
        let mut statement = Query::select();

        match columns {
            Some(columns) => {
                for column in columns {
                    statement.expr_as(Expr::col(SqlName::new(&column.source)), SqlName::new(&column.alias));
                }
            }
            None => {
                statement.column(sea_query::Asterisk);
            }
        }

        statement
            .from(SqlName::new(&self.table))
            .cond_where(self.condition.clone());

        for (column, direction) in &self.orders {
            let (order, nulls) = match direction {
                SortDirection::Ascending => (Order::Asc, NullOrdering::First),
                SortDirection::Descending => (Order::Desc, NullOrdering::Last),
            };
            statement.order_by_with_nulls(SqlName::new(column), order, nulls);
        }

        if self.skip > 0 {
            statement.offset(self.skip);
        }
        if let Some(take) = self.take {
            statement.limit(take);
        }

        statement
    }
}

impl<S, Ex> SqlQuery<S, Ex>
where
    Ex: StoreExecutor + Send + Sync + 'static,
{
    /// Execute with a store-side projection, decoding rows as `D`.
    pub fn fetch_projected<D: FromRow>(self, columns: &[ColumnProjection]) -> Result<Vec<D>, SearchError> {
        let (sql, values) = self.projected_statement(columns).build(PostgresQueryBuilder);
        log::debug!("projected select: {sql}");
        run_select(&*self.executor, &sql, &values)
    }

    /// Future form of [`fetch_projected`](Self::fetch_projected); the
    /// statement runs on first poll, so await it from a `may` coroutine.
    pub fn fetch_projected_async<D>(self, columns: &[ColumnProjection]) -> BoxFuture<'static, Result<Vec<D>, SearchError>>
    where
        D: FromRow + Send + 'static,
    {
        let (sql, values) = self.projected_statement(columns).build(PostgresQueryBuilder);
        let executor = self.executor;
        Box::pin(async move { run_select(&*executor, &sql, &values) })
    }
}

impl<S, Ex> Queryable<S> for SqlQuery<S, Ex>
where
    S: FromRow + Send + 'static,
    Ex: StoreExecutor + Send + Sync + 'static,
{
    fn order_by(mut self, keys: &[OrderKey<S>], direction: SortDirection) -> Self {
        self.orders = keys.iter().map(|key| (key.column(), direction)).collect();
        self
    }

    fn skip(mut self, count: u64) -> Self {
        (self.skip, self.take) = compose_skip(self.skip, self.take, count);
        self
    }

    fn take(mut self, count: u64) -> Self {
        self.take = compose_take(self.take, count);
        self
    }

    fn fetch(self) -> Result<Vec<S>, SearchError> {
        let (sql, values) = self.statement().build(PostgresQueryBuilder);
        log::debug!("select: {sql}");
        run_select(&*self.executor, &sql, &values)
    }

    fn fetch_async(self) -> BoxFuture<'static, Result<Vec<S>, SearchError>> {
        let (sql, values) = self.statement().build(PostgresQueryBuilder);
        let executor = self.executor;
        Box::pin(async move { run_select(&*executor, &sql, &values) })
    }
}

/// Projection translated into the select list of the store query.
///
/// `convert` is used when the caller asks for in-memory projection; the
/// column list is used otherwise, and `D` is decoded straight from the
/// projected rows.
pub struct SqlProjection<S, D> {
    columns: Vec<ColumnProjection>,
    convert: Arc<dyn Fn(S) -> D + Send + Sync>,
}

impl<S, D> SqlProjection<S, D> {
    pub fn new<F>(convert: F) -> Self
    where
        F: Fn(S) -> D + Send + Sync + 'static,
    {
        Self {
            columns: Vec::new(),
            convert: Arc::new(convert),
        }
    }

    /// Select `source` as `alias`.
    pub fn column(mut self, source: impl Into<String>, alias: impl Into<String>) -> Self {
        self.columns.push(ColumnProjection::new(source, alias));
        self
    }

    pub fn columns(&self) -> &[ColumnProjection] {
        &self.columns
    }
}

impl<S, D, Ex> Projector<S, D, SqlQuery<S, Ex>> for SqlProjection<S, D>
where
    S: FromRow + Send + 'static,
    D: FromRow + Send + 'static,
    Ex: StoreExecutor + Send + Sync + 'static,
{
    fn map(&self, source: S) -> D {
        (*self.convert)(source)
    }

    fn project(&self, query: SqlQuery<S, Ex>) -> Result<Vec<D>, SearchError> {
        query.fetch_projected(&self.columns)
    }

    fn project_async<'a>(&'a self, query: SqlQuery<S, Ex>) -> BoxFuture<'a, Result<Vec<D>, SearchError>> {
        query.fetch_projected_async(&self.columns)
    }
}
