use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::address::Address;
use crate::err::Error;
use crate::store::SharedStore;
use crate::student::Student;
use crate::validation::ValidationError;
use crate::{breaks, proceeds, Payload};

pub async fn list_students(Extension(store): Extension<SharedStore>) -> Payload<StudentList> {
    let students = store.find_all().await?;
    proceeds(StudentList { students })
}

pub async fn read_student(
    Path(id): Path<String>,
    Extension(store): Extension<SharedStore>,
) -> Payload<StudentResponse> {
    let id = Uuid::parse_str(&id)?;
    return if let Some(student) = store.find_by_id(id).await? {
        proceeds(StudentResponse { student })
    } else {
        breaks(Error::student_not_found(id))
    };
}

pub async fn create_student(
    Extension(store): Extension<SharedStore>,
    form: Result<Json<StudentForm>, JsonRejection>,
) -> Payload<StudentResponse> {
    let Json(form) = form?;
    let mut student = Student::new();
    form.apply(&mut student)?;

    let student = store.save(student).await?;
    log::debug!("Registered student {:?}", student.id());
    proceeds(StudentResponse { student })
}

pub async fn update_student(
    Path(id): Path<String>,
    Extension(store): Extension<SharedStore>,
    form: Result<Json<StudentForm>, JsonRejection>,
) -> Payload<StudentResponse> {
    let id = Uuid::parse_str(&id)?;
    let Json(form) = form?;
    let mut student = if let Some(student) = store.find_by_id(id).await? {
        student
    } else {
        return breaks(Error::student_not_found(id));
    };
    form.apply(&mut student)?;

    proceeds(StudentResponse {
        student: store.save(student).await?,
    })
}

pub async fn delete_student(
    Path(id): Path<String>,
    Extension(store): Extension<SharedStore>,
) -> Payload<StudentDeleted> {
    let id = Uuid::parse_str(&id)?;
    let deleted = store.delete(id).await?;
    if !deleted {
        return breaks(Error::student_not_found(id));
    }
    log::info!("Deleted student {}", id);
    proceeds(StudentDeleted {
        student_id: id,
        deleted,
    })
}

/// Submitted student fields. Every field goes through the matching
/// validating mutator, absent ones included; the first rejection aborts
/// the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<Address>,
}

impl StudentForm {
    fn apply(self, student: &mut Student) -> Result<(), ValidationError> {
        // An absent value is blank.
        student.set_name(self.name.unwrap_or_default())?;
        student.set_email(self.email.unwrap_or_default())?;
        student.set_birthday(self.birthday)?;
        if let Some(orphan) = student.set_address(self.address) {
            log::debug!("Unlinked address {}", orphan);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentList {
    pub students: Vec<Student>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentResponse {
    pub student: Student,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentDeleted {
    pub student_id: Uuid,
    pub deleted: bool,
}
