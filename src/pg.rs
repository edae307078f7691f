use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::address::Address;
use crate::err::Error;
use crate::models::{AddressRow, StudentRow};
use crate::store::StudentStore;
use crate::student::Student;

const SELECT_STUDENTS: &str =
    "SELECT id, name, email, birthday, created_at, updated_at FROM students";

const SELECT_ADDRESSES: &str =
    "SELECT student_id, street, number, complement, district, city, state, zip_code FROM addresses";

/// Students stored in Postgres, one `addresses` row per student at most.
pub struct PgStudentStore {
    pg: PgPool,
}

impl PgStudentStore {
    pub fn new(pg: PgPool) -> Self {
        Self { pg }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pg).await?;
        Ok(())
    }

    async fn insert(&self, mut student: Student) -> Result<Student, Error> {
        student.on_before_create();
        let id = student.id().ok_or_else(|| Error::InternalError {
            kind: "LifecycleError",
            message: "create hook did not assign an id".to_string(),
        })?;

        let mut tx = self.pg.begin().await?;
        sqlx::query(
            "INSERT INTO students (id, name, email, birthday, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(student.name())
        .bind(student.email())
        .bind(student.birthday())
        .bind(student.created_at())
        .bind(student.updated_at())
        .execute(&mut tx)
        .await?;

        if let Some(address) = student.address() {
            insert_address(&mut tx, id, address).await?;
        }
        tx.commit().await?;
        Ok(student)
    }

    async fn update(&self, id: Uuid, mut student: Student) -> Result<Student, Error> {
        student.on_before_update();

        let mut tx = self.pg.begin().await?;
        let res = sqlx::query(
            "UPDATE students SET name = $2, email = $3, birthday = $4, updated_at = $5 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(student.name())
        .bind(student.email())
        .bind(student.birthday())
        .bind(student.updated_at())
        .execute(&mut tx)
        .await?;

        if res.rows_affected() < 1 {
            return Err(Error::student_not_found(id));
        }

        // Whatever address was linked before is an orphan now.
        sqlx::query("DELETE FROM addresses WHERE student_id = $1")
            .bind(id)
            .execute(&mut tx)
            .await?;
        if let Some(address) = student.address() {
            insert_address(&mut tx, id, address).await?;
        }
        tx.commit().await?;
        Ok(student)
    }
}

async fn insert_address(
    tx: &mut Transaction<'_, Postgres>,
    student_id: Uuid,
    address: &Address,
) -> Result<(), Error> {
    sqlx::query(
        "INSERT INTO addresses (student_id, street, number, complement, district, city, state, zip_code) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(student_id)
    .bind(&address.street)
    .bind(&address.number)
    .bind(&address.complement)
    .bind(&address.district)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.zip_code)
    .execute(&mut *tx)
    .await?;
    Ok(())
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn find_all(&self) -> Result<Vec<Student>, Error> {
        let rows = sqlx::query_as::<_, StudentRow>(&format!(
            "{} ORDER BY created_at",
            SELECT_STUDENTS
        ))
        .fetch_all(&self.pg)
        .await?;

        let mut addresses: HashMap<Uuid, AddressRow> =
            sqlx::query_as::<_, AddressRow>(SELECT_ADDRESSES)
                .fetch_all(&self.pg)
                .await?
                .into_iter()
                .map(|row| (row.student_id, row))
                .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let address = addresses.remove(&row.id);
                row.into_student(address)
            })
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Student>, Error> {
        let row = sqlx::query_as::<_, StudentRow>(&format!("{} WHERE id = $1", SELECT_STUDENTS))
            .bind(id)
            .fetch_optional(&self.pg)
            .await?;

        let row = if let Some(row) = row {
            row
        } else {
            return Ok(None);
        };

        let address = sqlx::query_as::<_, AddressRow>(&format!(
            "{} WHERE student_id = $1",
            SELECT_ADDRESSES
        ))
        .bind(id)
        .fetch_optional(&self.pg)
        .await?;

        Ok(Some(row.into_student(address)))
    }

    async fn save(&self, student: Student) -> Result<Student, Error> {
        student.ensure_complete()?;
        match student.id() {
            None => self.insert(student).await,
            Some(id) => self.update(id, student).await,
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, Error> {
        // addresses.student_id cascades
        let affected = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pg)
            .await?;
        Ok(affected.rows_affected() >= 1)
    }
}
