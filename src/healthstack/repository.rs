// HealthStack persistence

use sqlx::PgPool;

use crate::healthstack::{
    error::StackError,
    models::{CreateHealthStack, HealthStack},
};

const STACK_COLUMNS: &str =
    "id, custom_name, domains, delay_between_checks, emails_to_alert, user_id, worker_id";

#[derive(Clone)]
pub struct HealthStackRepository {
    pool: PgPool,
}

impl HealthStackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        owner_id: i32,
        stack: &CreateHealthStack,
    ) -> Result<HealthStack, StackError> {
        let created = sqlx::query_as::<_, HealthStack>(&format!(
            "INSERT INTO healthstacks (custom_name, domains, delay_between_checks, emails_to_alert, user_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            STACK_COLUMNS
        ))
        .bind(&stack.custom_name)
        .bind(&stack.domains)
        .bind(stack.delay_between_checks)
        .bind(&stack.emails_to_alert)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// All stacks, maintainer overview.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<HealthStack>, StackError> {
        let stacks = sqlx::query_as::<_, HealthStack>(&format!(
            "SELECT {} FROM healthstacks ORDER BY id OFFSET $1 LIMIT $2",
            STACK_COLUMNS
        ))
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(stacks)
    }

    /// Stacks owned by one user.
    pub async fn list_for_owner(
        &self,
        owner_id: i32,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<HealthStack>, StackError> {
        let stacks = sqlx::query_as::<_, HealthStack>(&format!(
            "SELECT {} FROM healthstacks WHERE user_id = $1 ORDER BY id OFFSET $2 LIMIT $3",
            STACK_COLUMNS
        ))
        .bind(owner_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(stacks)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<HealthStack>, StackError> {
        let stack = sqlx::query_as::<_, HealthStack>(&format!(
            "SELECT {} FROM healthstacks WHERE id = $1",
            STACK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stack)
    }

    pub async fn find_owned_by_id(
        &self,
        id: i32,
        owner_id: i32,
    ) -> Result<Option<HealthStack>, StackError> {
        let stack = sqlx::query_as::<_, HealthStack>(&format!(
            "SELECT {} FROM healthstacks WHERE id = $1 AND user_id = $2",
            STACK_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stack)
    }

    pub async fn find_assigned_by_id(
        &self,
        id: i32,
        worker_id: i32,
    ) -> Result<Option<HealthStack>, StackError> {
        let stack = sqlx::query_as::<_, HealthStack>(&format!(
            "SELECT {} FROM healthstacks WHERE id = $1 AND worker_id = $2",
            STACK_COLUMNS
        ))
        .bind(id)
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stack)
    }

    /// Assign a worker to a stack that does not have one yet.
    ///
    /// The `worker_id IS NULL` predicate makes the assignment atomic: when
    /// two worker registrations race, exactly one sees a row updated.
    pub async fn assign_worker(&self, stack_id: i32, worker_id: i32) -> Result<bool, StackError> {
        let result = sqlx::query(
            "UPDATE healthstacks SET worker_id = $1 WHERE id = $2 AND worker_id IS NULL",
        )
        .bind(worker_id)
        .bind(stack_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
