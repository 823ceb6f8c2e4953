use crate::error::StoreError;
use crate::schema::{courses, enrollments, users};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub level: String /* beginner | intermediate | advanced */
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = enrollments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Enrollment {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub role: String /* student | professor */
}

/// An enrollment with the user and course rows it points at.
#[derive(Serialize, Debug, Clone)]
pub struct EnrollmentDetails {
    pub enrollment: Enrollment,
    pub user: User,
    pub course: Course
}

impl From<(Enrollment, User, Course)> for EnrollmentDetails {
    fn from((enrollment, user, course): (Enrollment, User, Course)) -> Self {
        EnrollmentDetails { enrollment, user, course }
    }
}

/// Requested course edits. `None` leaves the column as it is.
#[derive(Debug, Clone, Default)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub level: Option<Level>
}

impl CourseUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.level.is_none()
    }

    pub fn as_changeset(&self) -> CourseChanges<'_> {
        CourseChanges {
            title: self.title.as_deref(),
            description: self.description.as_deref(),
            level: self.level.map(|level| level.as_str()),
        }
    }
}

// `None` fields are left out of the `SET` clause.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = courses)]
pub struct CourseChanges<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub level: Option<&'static str>
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Professor
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Professor => "professor",
        }
    }
}

impl FromStr for Role {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "professor" => Ok(Role::Professor),
            _ => Err(StoreError::ConstraintViolation(format!(
                "role must be one of student, professor (got `{}`)",
                s
            ))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

impl FromStr for Level {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" => Ok(Level::Advanced),
            _ => Err(StoreError::ConstraintViolation(format!(
                "level must be one of beginner, intermediate, advanced (got `{}`)",
                s
            ))),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
