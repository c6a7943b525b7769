use super::*;

impl PostgresAccessRepository {
    pub(super) async fn find_role_impl(&self, name: &RoleName) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT name, description, is_default, created_at
            FROM rbac_roles
            WHERE name = $1
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?;

        row.map(RoleRow::into_role).transpose()
    }

    pub(super) async fn create_role_impl(&self, input: CreateRoleInput) -> AppResult<Role> {
        let name = RoleName::new(input.name.as_str())?;

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        if input.is_default {
            sqlx::query(
                r#"
                UPDATE rbac_roles
                SET is_default = FALSE
                WHERE is_default
                "#,
            )
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to clear default role flag: {error}"))
            })?;
        }

        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO rbac_roles (name, description, is_default)
            VALUES ($1, $2, $3)
            RETURNING name, description, is_default, created_at
            "#,
        )
        .bind(name.as_str())
        .bind(input.description.as_str())
        .bind(input.is_default)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                AppError::Conflict(format!("role '{name}' already exists"))
            } else {
                AppError::Internal(format!("failed to create role: {error}"))
            }
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        row.into_role()
    }

    pub(super) async fn list_roles_impl(&self) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT name, description, is_default, created_at
            FROM rbac_roles
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        rows.into_iter().map(RoleRow::into_role).collect()
    }

    pub(super) async fn mark_default_role_impl(&self, name: &RoleName) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        sqlx::query(
            r#"
            UPDATE rbac_roles
            SET is_default = FALSE
            WHERE is_default
            "#,
        )
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to clear default role flag: {error}"))
        })?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE rbac_roles
            SET is_default = TRUE
            WHERE name = $1
            "#,
        )
        .bind(name.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to mark default role: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!("role '{name}' was not found")));
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }
}
