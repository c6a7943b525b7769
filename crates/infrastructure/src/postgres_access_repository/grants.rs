use super::*;

impl PostgresAccessRepository {
    pub(super) async fn upsert_grant_impl(
        &self,
        role_name: &RoleName,
        resource_type: &ResourceTypeName,
        flags: PermissionFlags,
    ) -> AppResult<PermissionGrant> {
        let row = sqlx::query_as::<_, GrantRow>(
            r#"
            INSERT INTO rbac_role_grants (
                role_name,
                resource_type,
                can_create,
                can_read,
                can_update,
                can_delete,
                can_manage_others
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (role_name, resource_type) DO UPDATE SET
                can_create = EXCLUDED.can_create,
                can_read = EXCLUDED.can_read,
                can_update = EXCLUDED.can_update,
                can_delete = EXCLUDED.can_delete,
                can_manage_others = EXCLUDED.can_manage_others
            RETURNING
                role_name,
                resource_type,
                can_create,
                can_read,
                can_update,
                can_delete,
                can_manage_others,
                created_at
            "#,
        )
        .bind(role_name.as_str())
        .bind(resource_type.as_str())
        .bind(flags.can_create)
        .bind(flags.can_read)
        .bind(flags.can_update)
        .bind(flags.can_delete)
        .bind(flags.can_manage_others)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            if is_foreign_key_violation(&error) {
                AppError::NotFound(format!(
                    "role '{role_name}' or resource type '{resource_type}' was not found"
                ))
            } else {
                AppError::Internal(format!("failed to upsert grant: {error}"))
            }
        })?;

        row.into_grant()
    }

    pub(super) async fn create_grant_if_absent_impl(
        &self,
        role_name: &RoleName,
        resource_type: &ResourceTypeName,
        flags: PermissionFlags,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rbac_role_grants (
                role_name,
                resource_type,
                can_create,
                can_read,
                can_update,
                can_delete,
                can_manage_others
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (role_name, resource_type) DO NOTHING
            "#,
        )
        .bind(role_name.as_str())
        .bind(resource_type.as_str())
        .bind(flags.can_create)
        .bind(flags.can_read)
        .bind(flags.can_update)
        .bind(flags.can_delete)
        .bind(flags.can_manage_others)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if is_foreign_key_violation(&error) {
                AppError::NotFound(format!(
                    "role '{role_name}' or resource type '{resource_type}' was not found"
                ))
            } else {
                AppError::Internal(format!("failed to provision grant: {error}"))
            }
        })?;

        Ok(())
    }

    pub(super) async fn find_grant_impl(
        &self,
        role_name: &RoleName,
        resource_type: &ResourceTypeName,
    ) -> AppResult<Option<PermissionGrant>> {
        let row = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT
                role_name,
                resource_type,
                can_create,
                can_read,
                can_update,
                can_delete,
                can_manage_others,
                created_at
            FROM rbac_role_grants
            WHERE role_name = $1 AND resource_type = $2
            "#,
        )
        .bind(role_name.as_str())
        .bind(resource_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find grant: {error}")))?;

        row.map(GrantRow::into_grant).transpose()
    }

    pub(super) async fn list_grants_for_role_impl(
        &self,
        role_name: &RoleName,
    ) -> AppResult<Vec<PermissionGrant>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT
                role_name,
                resource_type,
                can_create,
                can_read,
                can_update,
                can_delete,
                can_manage_others,
                created_at
            FROM rbac_role_grants
            WHERE role_name = $1
            ORDER BY resource_type
            "#,
        )
        .bind(role_name.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list grants: {error}")))?;

        rows.into_iter().map(GrantRow::into_grant).collect()
    }
}
