use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::address::Address;
use crate::student::Student;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub birthday: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AddressRow {
    pub student_id: Uuid,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl StudentRow {
    pub fn into_student(self, address: Option<AddressRow>) -> Student {
        Student::from_parts(
            self.id,
            self.name,
            self.email,
            self.birthday,
            self.created_at,
            self.updated_at,
            address.map(Address::from),
        )
    }
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Address {
            street: row.street,
            number: row.number,
            complement: row.complement,
            district: row.district,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
        }
    }
}
