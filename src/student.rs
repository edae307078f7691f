use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::address::Address;
use crate::validation::{self, ValidationError};

/// Where a student sits in its storage lifecycle.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LifecycleState {
    /// Constructed in memory, never stored.
    Transient,
    /// Stored once, never updated since.
    Persisted,
    /// Stored and updated at least once.
    Modified,
}

/// A student record.
///
/// Every field write goes through a validating mutator: the value is checked
/// in full first and only then assigned, so a rejected write leaves the
/// student exactly as it was. `id`, `created_at` and `updated_at` are owned
/// by the lifecycle hooks which the store fires around inserts and updates.
///
/// Two students are equal when their ids are equal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Student {
    id: Option<Uuid>,
    name: Option<String>,
    email: Option<String>,
    birthday: Option<NaiveDate>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    address: Option<Address>,
}

impl Student {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a student that was already stored. Values are trusted as-is:
    /// a birthday accepted years ago may sit outside today's window.
    pub(crate) fn from_parts(
        id: Uuid,
        name: String,
        email: String,
        birthday: NaiveDate,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
        address: Option<Address>,
    ) -> Self {
        Self {
            id: Some(id),
            name: Some(name),
            email: Some(email),
            birthday: Some(birthday),
            created_at: Some(created_at),
            updated_at,
            address,
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn birthday(&self) -> Option<NaiveDate> {
        self.birthday
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn state(&self) -> LifecycleState {
        match (self.id, self.updated_at) {
            (None, _) => LifecycleState::Transient,
            (Some(_), None) => LifecycleState::Persisted,
            (Some(_), Some(_)) => LifecycleState::Modified,
        }
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) -> Result<(), ValidationError> {
        let name = name.into();
        validation::validate_name(&name)?;
        self.name = Some(name);
        Ok(())
    }

    pub fn set_email<S: Into<String>>(&mut self, email: S) -> Result<(), ValidationError> {
        let email = email.into();
        validation::validate_email(&email)?;
        self.email = Some(email);
        Ok(())
    }

    pub fn set_birthday(&mut self, birthday: Option<NaiveDate>) -> Result<(), ValidationError> {
        let today = Local::now().date_naive();
        self.birthday = Some(validation::validate_birthday(birthday, today)?);
        Ok(())
    }

    /// Checks that every validated field has been assigned, which a store
    /// requires before writing the student.
    pub fn ensure_complete(&self) -> Result<(), ValidationError> {
        if self.name.is_none() {
            return Err(ValidationError::Missing { field: "Name" });
        }
        if self.email.is_none() {
            return Err(ValidationError::Missing { field: "Email" });
        }
        if self.birthday.is_none() {
            return Err(ValidationError::Missing { field: "Birthday" });
        }
        Ok(())
    }

    /// Replaces the owned address and hands back the one it displaced.
    /// The caller's store must delete the returned record.
    pub fn set_address(&mut self, address: Option<Address>) -> Option<Address> {
        std::mem::replace(&mut self.address, address)
    }

    /// Fired by the store right before the first insert.
    pub fn on_before_create(&mut self) {
        if let Some(id) = self.id {
            log::warn!("Create hook fired again for stored student {}, ignoring", id);
            return;
        }
        self.id = Some(Uuid::new_v4());
        self.created_at = Some(Utc::now());
        log::info!("Created student {}", self);
    }

    /// Fired by the store right before every update of a stored student.
    pub fn on_before_update(&mut self) {
        if self.id.is_none() {
            log::warn!("Update hook fired for transient student, ignoring");
            return;
        }
        self.updated_at = Some(Utc::now());
    }
}

impl PartialEq for Student {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Student {}

impl Hash for Student {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

struct Field<'a, T>(&'a Option<T>);

impl<T: fmt::Display> fmt::Display for Field<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{}", value),
            None => f.write_str("null"),
        }
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Student{{id='{}', name='{}', email='{}', birthday={}, createdAt={}, updatedAt={}, address={}}}",
            Field(&self.id),
            Field(&self.name),
            Field(&self.email),
            Field(&self.birthday),
            Field(&self.created_at),
            Field(&self.updated_at),
            Field(&self.address),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Months};

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn address() -> Address {
        Address {
            street: "Baker Street".to_string(),
            number: "221B".to_string(),
            complement: None,
            district: "Marylebone".to_string(),
            city: "London".to_string(),
            state: "LND".to_string(),
            zip_code: "NW1 6XE".to_string(),
        }
    }

    const VALID_NAMES: &[&str] = &[
        "John",
        "Jo",
        "JsoafmsdaofnjsdanfisadfdsJsoafmsdaofnjsdanfisadfds",
    ];

    const INVALID_NAMES: &[&str] = &[
        "",
        " ",
        "   ",
        "J",
        "JsoafmsdaofnjsdanfisadfdsJsoafmsdaofnjsdanfisadfdsfasdfsdaf",
    ];

    const VALID_EMAILS: &[&str] = &[
        "john.doe@example.com",
        "jane_smith123@gmail.com",
        "info@companywebsite.com",
        "support@techcompany.net",
        "myname1234@yahoo.co.uk",
        "sales_department@business.co.in",
        "firstname.lastname@organization.org",
        "user1234@emailprovider.com",
        "marketing-team@consultancyfirm.net",
        "contact_us@startup.io",
    ];

    const INVALID_EMAILS: &[&str] = &[
        "john.doe@example",
        "jane_smith123@gmailcom",
        "@companywebsite.com",
        "support@techcompany",
        "myname1234@yahoo",
        "sales_department@.co.in",
        "firstname.lastname@organization",
        "user1234emailprovider.com",
        "marketing-team@consultancyfirm.",
        "contact_us@startupio",
        "contact us@startupio.com",
    ];

    #[test]
    fn accepts_valid_names() {
        for name in VALID_NAMES {
            let mut s = Student::new();
            assert!(s.set_name(*name).is_ok(), "rejected {:?}", name);
            assert_eq!(s.name(), Some(*name));
        }
    }

    #[test]
    fn rejects_invalid_names() {
        for name in INVALID_NAMES {
            let mut s = Student::new();
            assert!(s.set_name(*name).is_err(), "accepted {:?}", name);
            assert_eq!(s.name(), None);
        }
    }

    #[test]
    fn accepts_valid_emails() {
        for email in VALID_EMAILS {
            let mut s = Student::new();
            assert!(s.set_email(*email).is_ok(), "rejected {:?}", email);
            assert_eq!(s.email(), Some(*email));
        }
    }

    #[test]
    fn rejects_invalid_emails() {
        for email in INVALID_EMAILS {
            let mut s = Student::new();
            assert!(s.set_email(*email).is_err(), "accepted {:?}", email);
            assert_eq!(s.email(), None);
        }
    }

    #[test]
    fn accepts_past_birthday() {
        let mut s = Student::new();
        let birthday = today() - Duration::days(20);
        assert!(s.set_birthday(Some(birthday)).is_ok());
        assert_eq!(s.birthday(), Some(birthday));
    }

    #[test]
    fn rejects_future_birthday() {
        let mut s = Student::new();
        let birthday = today() + Duration::days(20);
        assert_eq!(
            s.set_birthday(Some(birthday)),
            Err(ValidationError::InFuture { field: "Birthday" })
        );
        assert_eq!(s.birthday(), None);
    }

    #[test]
    fn rejects_missing_birthday() {
        let mut s = Student::new();
        assert!(s.set_birthday(None).is_err());
        assert_eq!(s.birthday(), None);
    }

    #[test]
    fn rejects_far_away_birthdays() {
        for years in [1_000u32, 10_000, 100_000] {
            let months = Months::new(years * 12);
            let dates = [
                today().checked_add_months(months).unwrap(),
                today().checked_sub_months(months).unwrap(),
            ];
            for birthday in dates {
                let mut s = Student::new();
                assert!(s.set_birthday(Some(birthday)).is_err(), "accepted {}", birthday);
                assert_eq!(s.birthday(), None);
            }
        }
    }

    #[test]
    fn rejects_huge_values() {
        for len in [1_000, 10_000, 100_000, 1_000_000] {
            let name = "X".repeat(len);
            let mut s = Student::new();
            assert!(s.set_name(name.as_str()).is_err());
            assert!(s.set_email(format!("{}@gmail.com", name)).is_err());
            assert_eq!(s.name(), None);
            assert_eq!(s.email(), None);
        }
    }

    #[test]
    fn injection_payloads_are_stored_verbatim() {
        let mut s = Student::new();
        assert!(s.set_name("' OR 1=1 --").is_ok());
        assert!(s.set_name("<script>alert(\"Hello\");</script>").is_ok());
        assert_eq!(s.name(), Some("<script>alert(\"Hello\");</script>"));
    }

    #[test]
    fn failed_mutation_keeps_previous_value() {
        let mut s = Student::new();
        s.set_name("Jo").unwrap();
        assert!(s.set_name("J").is_err());
        assert_eq!(s.name(), Some("Jo"));

        s.set_email("contact_us@startup.io").unwrap();
        assert!(s.set_email("contact_us@startupio").is_err());
        assert_eq!(s.email(), Some("contact_us@startup.io"));

        let birthday = today() - Duration::days(20);
        s.set_birthday(Some(birthday)).unwrap();
        assert!(s.set_birthday(Some(today() + Duration::days(20))).is_err());
        assert!(s.set_birthday(None).is_err());
        assert_eq!(s.birthday(), Some(birthday));
    }

    #[test]
    fn name_is_stored_untrimmed() {
        let mut s = Student::new();
        s.set_name("  Ada  ").unwrap();
        assert_eq!(s.name(), Some("  Ada  "));
    }

    #[test]
    fn create_hook_assigns_identity_once() {
        let mut s = Student::new();
        assert_eq!(s.id(), None);
        assert_eq!(s.state(), LifecycleState::Transient);

        s.on_before_create();
        let id = s.id().expect("create hook assigns an id");
        let created_at = s.created_at().expect("create hook stamps created_at");
        assert_eq!(s.updated_at(), None);
        assert_eq!(s.state(), LifecycleState::Persisted);

        s.on_before_create();
        assert_eq!(s.id(), Some(id));
        assert_eq!(s.created_at(), Some(created_at));

        s.on_before_update();
        s.on_before_update();
        assert_eq!(s.id(), Some(id));
        assert_eq!(s.state(), LifecycleState::Modified);
        assert!(s.updated_at().unwrap() >= created_at);
    }

    #[test]
    fn completeness_names_the_first_unset_field() {
        let mut s = Student::new();
        assert_eq!(
            s.ensure_complete(),
            Err(ValidationError::Missing { field: "Name" })
        );
        s.set_name("Jo").unwrap();
        assert_eq!(
            s.ensure_complete(),
            Err(ValidationError::Missing { field: "Email" })
        );
        s.set_email("contact_us@startup.io").unwrap();
        assert_eq!(
            s.ensure_complete(),
            Err(ValidationError::Missing { field: "Birthday" })
        );
        s.set_birthday(Some(today() - Duration::days(20))).unwrap();
        assert_eq!(s.ensure_complete(), Ok(()));
    }

    #[test]
    fn update_hook_ignores_transient_student() {
        let mut s = Student::new();
        s.on_before_update();
        assert_eq!(s.updated_at(), None);
        assert_eq!(s.state(), LifecycleState::Transient);
    }

    #[test]
    fn equality_follows_id_only() {
        let mut a = Student::new();
        a.set_name("Alice").unwrap();
        a.on_before_create();

        let mut b = a.clone();
        b.set_name("Bob").unwrap();
        assert_eq!(a, b);

        let mut c = Student::new();
        c.set_name("Alice").unwrap();
        c.on_before_create();
        assert_ne!(a, c);
    }

    #[test]
    fn set_address_returns_the_orphan() {
        let mut s = Student::new();
        assert_eq!(s.set_address(Some(address())), None);

        let mut moved = address();
        moved.number = "10".to_string();
        assert_eq!(s.set_address(Some(moved.clone())), Some(address()));
        assert_eq!(s.address(), Some(&moved));
        assert_eq!(s.set_address(None), Some(moved));
        assert_eq!(s.address(), None);
    }

    #[test]
    fn display_lists_every_field() {
        let mut s = Student::new();
        s.set_name("Jo").unwrap();
        assert_eq!(
            s.to_string(),
            "Student{id='null', name='Jo', email='null', birthday=null, createdAt=null, updatedAt=null, address=null}"
        );

        s.set_address(Some(address()));
        s.on_before_create();
        let shown = s.to_string();
        assert!(shown.contains(&s.id().unwrap().to_string()));
        assert!(shown.contains("address=Baker Street, 221B"));
    }
}
