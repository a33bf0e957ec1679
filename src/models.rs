use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::err::Error;

/// A registered student as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub student_number: String,
    pub full_name: String,
    pub birthday: NaiveDate,
    pub course: String,
    pub email: String,
    pub cp_number: String,
}

/// Body of a registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterStudent {
    pub student_number: String,
    pub full_name: String,
    pub birthday: NaiveDate,
    pub course: String,
    pub email: String,
    pub cp_number: String,
    #[serde(default)]
    pub password: Option<String>,
}

impl RegisterStudent {
    /// Rejects blank required fields and an explicitly empty password.
    pub fn validate(&self) -> Result<(), Error> {
        let required = [
            ("student_number", &self.student_number),
            ("full_name", &self.full_name),
            ("course", &self.course),
            ("email", &self.email),
            ("cp_number", &self.cp_number),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::malformed(format!("`{}` field was empty", field)));
            }
        }
        if matches!(&self.password, Some(password) if password.is_empty()) {
            return Err(Error::malformed("Provided password was empty!"));
        }
        Ok(())
    }
}

/// Row handed to the store: the public fields plus the hashed credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub student: Student,
    pub password_hash: Option<String>,
}

/// Query string of `GET` on the registry path. The presence of `check`
/// switches from listing to an existence probe.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryQuery {
    pub check: Option<String>,
    pub student_number: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Existence {
    pub exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registered {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> serde_json::Value {
        serde_json::json!({
            "student_number": "2021-0001",
            "full_name": "Jane Doe",
            "birthday": "2000-01-01",
            "course": "CS",
            "email": "jane@example.com",
            "cp_number": "09171234567"
        })
    }

    #[test]
    fn password_is_optional() {
        let student: RegisterStudent = serde_json::from_value(body()).unwrap();
        assert_eq!(student.password, None);
        assert_eq!(student.birthday, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        assert!(student.validate().is_ok());
    }

    #[test]
    fn rejects_bad_dates() {
        let mut json = body();
        json["birthday"] = "2000-13-40".into();
        assert!(serde_json::from_value::<RegisterStudent>(json).is_err());
    }

    #[test]
    fn rejects_blank_fields_and_empty_password() {
        let mut json = body();
        json["course"] = "   ".into();
        let student: RegisterStudent = serde_json::from_value(json).unwrap();
        assert_eq!(
            student.validate(),
            Err(Error::malformed("`course` field was empty"))
        );

        let mut json = body();
        json["password"] = "".into();
        let student: RegisterStudent = serde_json::from_value(json).unwrap();
        assert!(student.validate().is_err());
    }
}
