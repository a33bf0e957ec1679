use pbkdf2::password_hash::{PasswordHasher, SaltString};
use pbkdf2::Pbkdf2;
use rand_core::OsRng;

use crate::err::Error;
use crate::models::{NewStudent, RegisterStudent, Student};

/// Hashes a plain-text password into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Pbkdf2.hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Turns a validated registration into the row that gets stored. The
/// plain-text password, if any, does not survive this step.
pub fn seal_registration(request: RegisterStudent) -> Result<NewStudent, Error> {
    let password_hash = match request.password {
        Some(password) => Some(hash_password(&password)?),
        None => None,
    };

    Ok(NewStudent {
        student: Student {
            student_number: request.student_number,
            full_name: request.full_name,
            birthday: request.birthday,
            course: request.course,
            email: request.email,
            cp_number: request.cp_number,
        },
        password_hash,
    })
}
