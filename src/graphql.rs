//! GraphQL schema: course, user and enrollment queries plus the two mutations.
//!
//! Every resolver is a single store call. Missing rows come back as `null`
//! from queries; the mutations surface store errors as GraphQL errors.

use async_graphql::{Context, EmptySubscription, Object, Result, Schema, ID};

use crate::connection::Store;
use crate::models::{Course, CourseUpdate, EnrollmentDetails, Level, Role, User};
use crate::queries::{
    get_course_from_db, get_courses_from_db, get_enrollment_from_db, get_enrollments_from_db,
    get_user_from_db, get_users_from_db, insert_enrollment_into_db, update_course_in_db,
};

pub type CourseSchema = Schema<Query, Mutation, EmptySubscription>;

/// Builds the schema with `store` available to every resolver.
pub fn build_schema(store: Store) -> CourseSchema {
    Schema::build(Query, Mutation, EmptySubscription)
        .data(store)
        .finish()
}

#[Object]
impl Course {
    async fn id(&self) -> ID {
        ID::from(&self.id)
    }

    async fn title(&self) -> &str {
        &self.title
    }

    async fn description(&self) -> &str {
        &self.description
    }

    async fn level(&self) -> &str {
        &self.level
    }
}

#[Object]
impl User {
    async fn id(&self) -> ID {
        ID::from(&self.id)
    }

    async fn name(&self) -> &str {
        &self.name
    }

    async fn email(&self) -> &str {
        &self.email
    }
}

#[Object(name = "Enrollment")]
impl EnrollmentDetails {
    async fn id(&self) -> ID {
        ID::from(&self.enrollment.id)
    }

    async fn user(&self) -> &User {
        &self.user
    }

    async fn course(&self) -> &Course {
        &self.course
    }

    async fn role(&self) -> &str {
        &self.enrollment.role
    }
}

pub struct Query;

#[Object]
impl Query {
    async fn courses(&self, ctx: &Context<'_>) -> Result<Vec<Course>> {
        let store = ctx.data::<Store>()?;
        Ok(store.interact(get_courses_from_db).await?)
    }

    async fn course(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Course>> {
        let store = ctx.data::<Store>()?;
        Ok(store.interact(move |conn| get_course_from_db(conn, &id)).await?)
    }

    async fn enrollments(&self, ctx: &Context<'_>) -> Result<Vec<EnrollmentDetails>> {
        let store = ctx.data::<Store>()?;
        Ok(store.interact(get_enrollments_from_db).await?)
    }

    async fn enrollment(&self, ctx: &Context<'_>, id: ID) -> Result<Option<EnrollmentDetails>> {
        let store = ctx.data::<Store>()?;
        Ok(store.interact(move |conn| get_enrollment_from_db(conn, &id)).await?)
    }

    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let store = ctx.data::<Store>()?;
        Ok(store.interact(get_users_from_db).await?)
    }

    async fn user(&self, ctx: &Context<'_>, id: ID) -> Result<Option<User>> {
        let store = ctx.data::<Store>()?;
        Ok(store.interact(move |conn| get_user_from_db(conn, &id)).await?)
    }
}

pub struct Mutation;

#[Object]
impl Mutation {
    /// Enrolls a user in a course. Repeated calls create repeated enrollments.
    async fn enroll_user(
        &self,
        ctx: &Context<'_>,
        user_id: ID,
        course_id: ID,
        role: String,
    ) -> Result<EnrollmentDetails> {
        let store = ctx.data::<Store>()?;
        let role: Role = role.parse()?;

        let result = store
            .interact(move |conn| insert_enrollment_into_db(conn, &user_id, &course_id, role))
            .await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "enrollUser failed");
        }
        Ok(result?)
    }

    /// Overwrites only the course fields that are provided.
    async fn update_course(
        &self,
        ctx: &Context<'_>,
        id: ID,
        title: Option<String>,
        description: Option<String>,
        level: Option<String>,
    ) -> Result<Course> {
        let store = ctx.data::<Store>()?;
        let level = level.map(|level| level.parse::<Level>()).transpose()?;
        let update = CourseUpdate { title, description, level };

        let result = store
            .interact(move |conn| update_course_in_db(conn, &id, update))
            .await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "updateCourse failed");
        }
        Ok(result?)
    }
}
