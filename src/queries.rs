use diesel::prelude::*;
use diesel::SqliteConnection;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{Course, CourseUpdate, Enrollment, EnrollmentDetails, Role, User};
use crate::schema::{courses, enrollments, users};

pub fn get_courses_from_db(conn: &mut SqliteConnection) -> StoreResult<Vec<Course>> {
    Ok(courses::table.select(Course::as_select()).load(conn)?)
}

/// Returns `None` when no course has this id.
pub fn get_course_from_db(conn: &mut SqliteConnection, course_id: &str) -> StoreResult<Option<Course>> {
    Ok(courses::table
        .find(course_id)
        .select(Course::as_select())
        .first(conn)
        .optional()?)
}

pub fn get_users_from_db(conn: &mut SqliteConnection) -> StoreResult<Vec<User>> {
    Ok(users::table.select(User::as_select()).load(conn)?)
}

pub fn get_user_from_db(conn: &mut SqliteConnection, user_id: &str) -> StoreResult<Option<User>> {
    Ok(users::table
        .find(user_id)
        .select(User::as_select())
        .first(conn)
        .optional()?)
}

// Every enrollment references a user and a course, so the inner joins drop nothing.
pub fn get_enrollments_from_db(conn: &mut SqliteConnection) -> StoreResult<Vec<EnrollmentDetails>> {
    let rows = enrollments::table
        .inner_join(users::table)
        .inner_join(courses::table)
        .select((Enrollment::as_select(), User::as_select(), Course::as_select()))
        .load::<(Enrollment, User, Course)>(conn)?;

    Ok(rows.into_iter().map(EnrollmentDetails::from).collect())
}

pub fn get_enrollment_from_db(conn: &mut SqliteConnection, enrollment_id: &str) -> StoreResult<Option<EnrollmentDetails>> {
    let row = enrollments::table
        .inner_join(users::table)
        .inner_join(courses::table)
        .filter(enrollments::id.eq(enrollment_id))
        .select((Enrollment::as_select(), User::as_select(), Course::as_select()))
        .first::<(Enrollment, User, Course)>(conn)
        .optional()?;

    Ok(row.map(EnrollmentDetails::from))
}

/// Inserts a new enrollment. Repeating the same user, course and role
/// creates another row; unknown user or course ids fail the foreign key.
pub fn insert_enrollment_into_db(conn: &mut SqliteConnection, user_id: &str, course_id: &str, role: Role) -> StoreResult<EnrollmentDetails> {
    let new_enrollment = Enrollment {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        course_id: course_id.to_string(),
        role: role.as_str().to_string(),
    };

    conn.transaction::<_, StoreError, _>(|conn| {
        let enrollment = diesel::insert_into(enrollments::table)
            .values(&new_enrollment)
            .returning(Enrollment::as_returning())
            .get_result(conn)?;

        tracing::info!(
            enrollment_id = %enrollment.id,
            user_id = %enrollment.user_id,
            course_id = %enrollment.course_id,
            role = %enrollment.role,
            "Created enrollment"
        );

        get_enrollment_from_db(conn, &enrollment.id)?
            .ok_or_else(|| StoreError::NotFound(format!("Enrollment with id {}", enrollment.id)))
    })
}

/// Applies the fields present in `update` to one course and returns the
/// full row. Fails with `NotFound` and writes nothing if the id is unknown.
pub fn update_course_in_db(conn: &mut SqliteConnection, course_id: &str, update: CourseUpdate) -> StoreResult<Course> {
    let updated = if update.is_empty() {
        get_course_from_db(conn, course_id)?
    } else {
        diesel::update(courses::table.find(course_id))
            .set(update.as_changeset())
            .returning(Course::as_returning())
            .get_result(conn)
            .optional()?
    };

    match updated {
        Some(course) => {
            tracing::info!(course_id = %course.id, "Updated course");
            Ok(course)
        }
        None => Err(StoreError::NotFound(format!("Course with id {}", course_id))),
    }
}

pub fn count_users_in_db(conn: &mut SqliteConnection) -> StoreResult<i64> {
    Ok(users::table.count().get_result(conn)?)
}
