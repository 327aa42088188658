use crate::{
    config::DbConfig,
    data::{NewStudent, Page, Student, StudentStore},
    error::{GetDatabaseConnectionSnafu, MakeQuerySnafu, MigrateSnafu, OpenDatabaseSnafu, StudentsResult},
};
use futures::TryStreamExt;
use snafu::ResultExt;
use sqlx::{Pool, Postgres, pool::PoolConnection, postgres::PgPoolOptions};

const COLUMNS: &str = "id, first_name, last_name, course, year, enrolled";

#[derive(Clone, Debug)]
pub struct PgStudentStore {
    pool: Pool<Postgres>,
}

impl PgStudentStore {
    pub async fn new(options: PgPoolOptions, db_config: &DbConfig) -> StudentsResult<Self> {
        let pool = options
            .connect(&db_config.get_db_path())
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        Ok(Self { pool })
    }

    /// The connection goes back to the pool when the returned guard is dropped.
    async fn get_connection(&self) -> StudentsResult<PoolConnection<Postgres>> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl StudentStore for PgStudentStore {
    async fn get_page(&self, page: Page) -> StudentsResult<Vec<Student>> {
        let mut conn = self.get_connection().await?;

        sqlx::query_as::<_, Student>(&format!(
            "SELECT {COLUMNS} FROM public.students ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch(&mut *conn)
        .try_collect::<Vec<_>>()
        .await
        .context(MakeQuerySnafu)
    }

    async fn get_by_id(&self, id: i64) -> StudentsResult<Option<Student>> {
        let mut conn = self.get_connection().await?;

        sqlx::query_as::<_, Student>(&format!(
            "SELECT {COLUMNS} FROM public.students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn insert(&self, to_be_added: NewStudent) -> StudentsResult<Student> {
        let NewStudent {
            first_name,
            last_name,
            course,
            year,
            enrolled,
        } = to_be_added;
        let mut conn = self.get_connection().await?;

        sqlx::query_as::<_, Student>(&format!(
            "INSERT INTO public.students (first_name, last_name, course, year, enrolled) VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        ))
        .bind(first_name)
        .bind(last_name)
        .bind(course)
        .bind(year)
        .bind(enrolled)
        .fetch_one(&mut *conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn update(&self, id: i64, replacement: NewStudent) -> StudentsResult<Option<Student>> {
        let NewStudent {
            first_name,
            last_name,
            course,
            year,
            enrolled,
        } = replacement;
        let mut conn = self.get_connection().await?;

        //rows already holding these values don't count as changed
        sqlx::query_as::<_, Student>(&format!(
            "UPDATE public.students SET first_name = $1, last_name = $2, course = $3, year = $4, enrolled = $5 WHERE id = $6 AND (first_name, last_name, course, year, enrolled) IS DISTINCT FROM ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        ))
        .bind(first_name)
        .bind(last_name)
        .bind(course)
        .bind(year)
        .bind(enrolled)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn remove(&self, id: i64) -> StudentsResult<bool> {
        let mut conn = self.get_connection().await?;

        let result = sqlx::query("DELETE FROM public.students WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .context(MakeQuerySnafu)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lovelace(course: &str) -> NewStudent {
        NewStudent {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            course: course.to_owned(),
            year: "Second Year".to_owned(),
            enrolled: 1,
        }
    }

    #[tokio::test]
    #[ignore = "needs a live Postgres configured through the DB_* env vars"]
    async fn statements_round_trip_against_postgres() {
        let _ = dotenvy::dotenv();
        let db_config = DbConfig::new().unwrap();
        let store = PgStudentStore::new(PgPoolOptions::new().max_connections(2), &db_config)
            .await
            .unwrap();

        let inserted = store.insert(lovelace("Mathematics")).await.unwrap();
        assert!(inserted.id > 0);
        assert_eq!(inserted.course, "Mathematics");
        assert_eq!(store.get_by_id(inserted.id).await.unwrap(), Some(inserted.clone()));

        assert_eq!(
            store.update(inserted.id, lovelace("Mathematics")).await.unwrap(),
            None
        );

        let updated = store
            .update(inserted.id, lovelace("Computer Science"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, inserted.id);
        assert_eq!(updated.course, "Computer Science");

        let page = store
            .get_page(Page::new(1, i64::MAX))
            .await
            .unwrap();
        assert!(page.iter().any(|student| student.id == inserted.id));

        assert!(store.remove(inserted.id).await.unwrap());
        assert!(!store.remove(inserted.id).await.unwrap());
        assert_eq!(store.get_by_id(inserted.id).await.unwrap(), None);

        store.close().await;
    }
}
