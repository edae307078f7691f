use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::err::Error;
use crate::student::Student;

pub type SharedStore = Arc<dyn StudentStore>;

/// Persistence collaborator for students.
///
/// Implementations own the lifecycle hooks: `save` fires
/// [`Student::on_before_create`] before the first insert and
/// [`Student::on_before_update`] before every later write. Dropping or
/// replacing a student's address must delete the previous address record.
/// A student with an unset name, email or birthday is refused before any
/// hook fires.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// All students, oldest first.
    async fn find_all(&self) -> Result<Vec<Student>, Error>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Student>, Error>;

    /// Inserts a transient student or updates a stored one, returning the
    /// student as stored.
    async fn save(&self, student: Student) -> Result<Student, Error>;

    /// Removes the student along with its address.
    async fn delete(&self, id: Uuid) -> Result<bool, Error>;
}

#[derive(Default)]
pub struct MemoryStudentStore {
    students: RwLock<HashMap<Uuid, Student>>,
}

impl MemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn find_all(&self) -> Result<Vec<Student>, Error> {
        let mut students: Vec<Student> = self.students.read().await.values().cloned().collect();
        students.sort_by_key(|s| s.created_at());
        Ok(students)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Student>, Error> {
        Ok(self.students.read().await.get(&id).cloned())
    }

    async fn save(&self, mut student: Student) -> Result<Student, Error> {
        student.ensure_complete()?;
        let mut students = self.students.write().await;
        let id = match student.id() {
            None => {
                student.on_before_create();
                student.id().ok_or_else(|| Error::InternalError {
                    kind: "LifecycleError",
                    message: "create hook did not assign an id".to_string(),
                })?
            }
            Some(id) => {
                if !students.contains_key(&id) {
                    return Err(Error::student_not_found(id));
                }
                student.on_before_update();
                id
            }
        };
        log::debug!("Saving {:?} student {}", student.state(), id);
        // The previous entry, address included, is dropped here.
        students.insert(id, student.clone());
        Ok(student)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, Error> {
        Ok(self.students.write().await.remove(&id).is_some())
    }
}
