use crate::model::{Grade, Project, Student};
use futures_util::stream::BoxStream;
use sqlx::any::{AnyConnectOptions, AnyRow};
use sqlx::{AnyConnection, Connection, Row};
use std::str::FromStr;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("insert rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    /// Errors reported by the database itself (constraints, types, …),
    /// when inserting or when committing, mean that the write was refused. Everything else is a transport or
    /// driver problem.
    fn from_insert(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(e) => Self::Rejected(e.message().to_owned()),
            e => Self::Sqlx(e),
        }
    }
}

pub struct Database {
    conn: AnyConnection,
}

impl Database {
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        sqlx::any::install_default_drivers();
        Ok(Self {
            conn: AnyConnection::connect_with(&AnyConnectOptions::from_str(url)?).await?,
        })
    }

    pub async fn close(self) -> Result<(), sqlx::Error> {
        self.conn.close().await
    }

    pub async fn student_by_github(&mut self, github: &str) -> Result<Option<Student>, StoreError> {
        debug!(github, "looking up student");
        Ok(
            sqlx::query("SELECT first_name, last_name, github FROM students WHERE github = $1")
                .bind(github)
                .try_map(|row: AnyRow| {
                    Ok(Student {
                        first_name: row.try_get("first_name")?,
                        last_name: row.try_get("last_name")?,
                        github: row.try_get("github")?,
                    })
                })
                .fetch_optional(&mut self.conn)
                .await?,
        )
    }

    pub async fn create_student(
        &mut self,
        first_name: &str,
        last_name: &str,
        github: &str,
    ) -> Result<(), StoreError> {
        let mut trans = self.conn.begin().await?;
        sqlx::query("INSERT INTO students (first_name, last_name, github) VALUES ($1, $2, $3)")
            .bind(first_name)
            .bind(last_name)
            .bind(github)
            .execute(&mut *trans)
            .await
            .map_err(|e| {
                warn!(github, error = %e, "cannot create student");
                StoreError::from_insert(e)
            })?;
        trans.commit().await.map_err(StoreError::from_insert)?;
        info!(first_name, last_name, github, "student created");
        Ok(())
    }

    pub async fn project_by_title(&mut self, title: &str) -> Result<Option<Project>, StoreError> {
        debug!(title, "looking up project");
        Ok(
            sqlx::query("SELECT title, description, max_grade FROM projects WHERE title = $1")
                .bind(title)
                .try_map(|row: AnyRow| {
                    Ok(Project {
                        title: row.try_get("title")?,
                        description: row.try_get("description")?,
                        max_grade: row.try_get("max_grade")?,
                    })
                })
                .fetch_optional(&mut self.conn)
                .await?,
        )
    }

    pub async fn create_project(
        &mut self,
        title: &str,
        description: &str,
        max_grade: i64,
    ) -> Result<(), StoreError> {
        let mut trans = self.conn.begin().await?;
        sqlx::query("INSERT INTO projects (title, description, max_grade) VALUES ($1, $2, $3)")
            .bind(title)
            .bind(description)
            .bind(max_grade)
            .execute(&mut *trans)
            .await
            .map_err(|e| {
                warn!(title, error = %e, "cannot create project");
                StoreError::from_insert(e)
            })?;
        trans.commit().await.map_err(StoreError::from_insert)?;
        info!(title, max_grade, "project created");
        Ok(())
    }

    /// Grade of a student on a project. If the same pair has been graded
    /// several times, the first row returned by the store wins.
    pub async fn grade_for(
        &mut self,
        github: &str,
        title: &str,
    ) -> Result<Option<Grade>, StoreError> {
        debug!(github, title, "looking up grade");
        Ok(sqlx::query(
            "SELECT project_title, grade FROM grades WHERE student_github = $1 AND project_title = $2",
        )
        .bind(github)
        .bind(title)
        .try_map(grade_from_row)
        .fetch_optional(&mut self.conn)
        .await?)
    }

    /// Insert a new grade. Existing grades for the same student and project
    /// are left untouched.
    pub async fn assign_grade(
        &mut self,
        github: &str,
        title: &str,
        grade: i64,
    ) -> Result<(), StoreError> {
        let mut trans = self.conn.begin().await?;
        sqlx::query(
            "INSERT INTO grades (student_github, project_title, grade) VALUES ($1, $2, $3)",
        )
        .bind(github)
        .bind(title)
        .bind(grade)
        .execute(&mut *trans)
        .await
        .map_err(|e| {
            warn!(github, title, error = %e, "cannot assign grade");
            StoreError::from_insert(e)
        })?;
        trans.commit().await.map_err(StoreError::from_insert)?;
        info!(github, title, grade, "grade assigned");
        Ok(())
    }

    /// Stream all grades of a student, in the order chosen by the store.
    pub fn grades_for<'a>(
        &'a mut self,
        github: &'a str,
    ) -> BoxStream<'a, Result<Grade, sqlx::Error>> {
        debug!(github, "listing grades");
        sqlx::query("SELECT project_title, grade FROM grades WHERE student_github = $1")
            .bind(github)
            .try_map(grade_from_row)
            .fetch(&mut self.conn)
    }
}

fn grade_from_row(row: AnyRow) -> Result<Grade, sqlx::Error> {
    Ok(Grade {
        project_title: row.try_get("project_title")?,
        grade: row.try_get("grade")?,
    })
}
