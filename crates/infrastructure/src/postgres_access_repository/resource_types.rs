use super::*;

impl PostgresAccessRepository {
    pub(super) async fn find_resource_type_impl(
        &self,
        name: &ResourceTypeName,
    ) -> AppResult<Option<ResourceType>> {
        let row = sqlx::query_as::<_, ResourceTypeRow>(
            r#"
            SELECT name, description, is_active, created_at
            FROM rbac_resource_types
            WHERE name = $1
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find resource type: {error}")))?;

        row.map(ResourceTypeRow::into_resource_type).transpose()
    }

    pub(super) async fn create_resource_type_impl(
        &self,
        input: CreateResourceTypeInput,
    ) -> AppResult<ResourceType> {
        let name = ResourceTypeName::new(input.name.as_str())?;

        let row = sqlx::query_as::<_, ResourceTypeRow>(
            r#"
            INSERT INTO rbac_resource_types (name, description)
            VALUES ($1, $2)
            RETURNING name, description, is_active, created_at
            "#,
        )
        .bind(name.as_str())
        .bind(input.description.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                AppError::Conflict(format!("resource type '{name}' already exists"))
            } else {
                AppError::Internal(format!("failed to create resource type: {error}"))
            }
        })?;

        row.into_resource_type()
    }

    pub(super) async fn list_resource_types_impl(&self) -> AppResult<Vec<ResourceType>> {
        let rows = sqlx::query_as::<_, ResourceTypeRow>(
            r#"
            SELECT name, description, is_active, created_at
            FROM rbac_resource_types
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list resource types: {error}")))?;

        rows.into_iter()
            .map(ResourceTypeRow::into_resource_type)
            .collect()
    }

    pub(super) async fn list_active_resource_types_impl(&self) -> AppResult<Vec<ResourceType>> {
        let rows = sqlx::query_as::<_, ResourceTypeRow>(
            r#"
            SELECT name, description, is_active, created_at
            FROM rbac_resource_types
            WHERE is_active
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list active resource types: {error}"))
        })?;

        rows.into_iter()
            .map(ResourceTypeRow::into_resource_type)
            .collect()
    }

    pub(super) async fn deactivate_resource_type_impl(
        &self,
        name: &ResourceTypeName,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE rbac_resource_types
            SET is_active = FALSE
            WHERE name = $1
            "#,
        )
        .bind(name.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to deactivate resource type: {error}"))
        })?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "resource type '{name}' was not found"
            )));
        }

        Ok(())
    }
}
