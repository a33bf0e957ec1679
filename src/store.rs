use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool, Postgres, Statement};

use crate::models::{NewStudent, Student};

const SELECT_STUDENTS: &str =
    "SELECT student_number, full_name, birthday, course, email, cp_number FROM students";

const COUNT_MATCHING: &str =
    "SELECT COUNT(*) FROM students WHERE student_number = $1 OR email = $2";

const INSERT_STUDENT: &str = "INSERT INTO students \
    (student_number, full_name, birthday, course, email, cp_number, password_hash) \
    VALUES ($1, $2, $3, $4, $5, $6, $7)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No connection could be obtained.
    Connection(String),
    /// The statement could not be prepared; it was never executed.
    Prepare(String),
    /// The storage engine rejected the statement.
    Execution(String),
    /// A read query was rejected by the storage engine.
    Query(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Connection(cause) => write!(f, "connection failure: {}", cause),
            StoreError::Prepare(cause) => write!(f, "prepare failure: {}", cause),
            StoreError::Execution(cause) => write!(f, "execution failure: {}", cause),
            StoreError::Query(cause) => write!(f, "query failure: {}", cause),
        }
    }
}

impl std::error::Error for StoreError {}

impl StoreError {
    /// Reclassifies a rejected statement as a failed read.
    fn on_read(self) -> Self {
        match self {
            StoreError::Execution(cause) => StoreError::Query(cause),
            other => other,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Connection(err.to_string()),
            sqlx::Error::Database(db) => StoreError::Execution(db.message().to_string()),
            other => StoreError::Execution(other.to_string()),
        }
    }
}

/// Persistence seam of the registry. Handlers only ever see this trait, so
/// the backing pool is injected rather than global.
#[async_trait]
pub trait StudentStore: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<Student>, StoreError>;

    /// True when any row matches `student_number` OR `email`.
    async fn exists(&self, student_number: &str, email: &str) -> Result<bool, StoreError>;

    async fn insert(&self, student: &NewStudent) -> Result<(), StoreError>;
}

pub type SharedStore = Arc<dyn StudentStore>;

#[derive(Debug, Clone)]
pub struct PgStudentStore {
    pool: PgPool,
}

impl PgStudentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a lazily connecting pool; nothing touches the network until
    /// the first request acquires a connection.
    pub fn connect_lazy(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(url)?;
        Ok(Self::new(pool))
    }

    async fn connection(&self) -> Result<PoolConnection<Postgres>, StoreError> {
        self.pool
            .acquire()
            .await
            .map_err(|err| StoreError::Connection(err.to_string()))
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        let mut conn = self.connection().await?;
        let students = sqlx::query_as::<_, Student>(SELECT_STUDENTS)
            .fetch_all(&mut *conn)
            .await
            .map_err(|err| StoreError::from(err).on_read())?;
        Ok(students)
    }

    async fn exists(&self, student_number: &str, email: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;
        let count = sqlx::query_scalar::<_, i64>(COUNT_MATCHING)
            .bind(student_number)
            .bind(email)
            .fetch_one(&mut *conn)
            .await
            .map_err(|err| StoreError::from(err).on_read())?;
        Ok(count > 0)
    }

    async fn insert(&self, new: &NewStudent) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let statement = (&mut *conn)
            .prepare(INSERT_STUDENT)
            .await
            .map_err(|err| StoreError::Prepare(err.to_string()))?;

        let student = &new.student;
        let res = statement
            .query()
            .bind(&student.student_number)
            .bind(&student.full_name)
            .bind(student.birthday)
            .bind(&student.course)
            .bind(&student.email)
            .bind(&student.cp_number)
            .bind(&new.password_hash)
            .execute(&mut *conn)
            .await?;

        if res.rows_affected() < 1 {
            return Err(StoreError::Execution(
                "Could not save data to database!".to_string(),
            ));
        }
        Ok(())
    }
}
