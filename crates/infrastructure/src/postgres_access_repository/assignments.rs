use super::*;

impl PostgresAccessRepository {
    pub(super) async fn list_active_assignments_impl(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<RoleAssignment>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT user_id, role_name, assigned_by, assigned_at, is_active
            FROM rbac_role_assignments
            WHERE user_id = $1 AND is_active
            ORDER BY role_name
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list active assignments: {error}"))
        })?;

        rows.into_iter().map(AssignmentRow::into_assignment).collect()
    }

    pub(super) async fn create_assignment_impl(
        &self,
        input: NewRoleAssignment,
    ) -> AppResult<RoleAssignment> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let existing = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT user_id, role_name, assigned_by, assigned_at, is_active
            FROM rbac_role_assignments
            WHERE user_id = $1 AND role_name = $2
            FOR UPDATE
            "#,
        )
        .bind(input.user_id.as_uuid())
        .bind(input.role_name.as_str())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find assignment: {error}")))?;

        let row = match existing {
            Some(existing) if existing.is_active => {
                return Err(AppError::Conflict(format!(
                    "user '{}' already holds role '{}'",
                    input.user_id, input.role_name
                )));
            }
            Some(_) => sqlx::query_as::<_, AssignmentRow>(
                r#"
                UPDATE rbac_role_assignments
                SET is_active = TRUE,
                    assigned_by = $3,
                    assigned_at = now()
                WHERE user_id = $1 AND role_name = $2
                RETURNING user_id, role_name, assigned_by, assigned_at, is_active
                "#,
            )
            .bind(input.user_id.as_uuid())
            .bind(input.role_name.as_str())
            .bind(input.assigned_by.map(|user_id| user_id.as_uuid()))
            .fetch_one(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to reactivate assignment: {error}"))
            })?,
            None => sqlx::query_as::<_, AssignmentRow>(
                r#"
                INSERT INTO rbac_role_assignments (user_id, role_name, assigned_by)
                VALUES ($1, $2, $3)
                RETURNING user_id, role_name, assigned_by, assigned_at, is_active
                "#,
            )
            .bind(input.user_id.as_uuid())
            .bind(input.role_name.as_str())
            .bind(input.assigned_by.map(|user_id| user_id.as_uuid()))
            .fetch_one(&mut *transaction)
            .await
            .map_err(|error| {
                if is_foreign_key_violation(&error) {
                    AppError::NotFound(format!("role '{}' was not found", input.role_name))
                } else {
                    AppError::Internal(format!("failed to create assignment: {error}"))
                }
            })?,
        };

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        row.into_assignment()
    }

    pub(super) async fn list_assignments_for_user_impl(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<RoleAssignment>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT user_id, role_name, assigned_by, assigned_at, is_active
            FROM rbac_role_assignments
            WHERE user_id = $1
            ORDER BY role_name
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list assignments: {error}")))?;

        rows.into_iter().map(AssignmentRow::into_assignment).collect()
    }

    pub(super) async fn deactivate_assignment_impl(
        &self,
        user_id: UserId,
        role_name: &RoleName,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE rbac_role_assignments
            SET is_active = FALSE
            WHERE user_id = $1 AND role_name = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_name.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to deactivate assignment: {error}"))
        })?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "assignment '{user_id}:{role_name}' was not found"
            )));
        }

        Ok(())
    }

    pub(super) async fn purge_assignment_impl(
        &self,
        user_id: UserId,
        role_name: &RoleName,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM rbac_role_assignments
            WHERE user_id = $1 AND role_name = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_name.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to purge assignment: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "assignment '{user_id}:{role_name}' was not found"
            )));
        }

        Ok(())
    }
}
