//! Namespace CRUD.
//!
//! Functions take any `ConnectionTrait` so handlers can pass either the pool
//! (reads) or the request transaction (writes).

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{info, instrument};
use uuid::Uuid;

use models::{hwm, namespace, user};

use crate::auth::domain::AuthUser;
use crate::errors::ServiceError;
use crate::filters::contains_literal;
use crate::pagination::{paginate, Page, PageParams};

const ENTITY: &str = "Namespace";

/// Namespace together with the name of the user who changed it last.
#[derive(Clone, Debug, PartialEq)]
pub struct NamespaceRecord {
    pub namespace: namespace::Model,
    pub changed_by: Option<String>,
}

impl From<(namespace::Model, Option<user::Model>)> for NamespaceRecord {
    fn from((namespace, changed_by): (namespace::Model, Option<user::Model>)) -> Self {
        Self { namespace, changed_by: changed_by.map(|u| u.username) }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CreateNamespace {
    pub name: String,
    pub description: String,
}

/// Fields left as `None` keep their stored value.
#[derive(Clone, Debug, Default)]
pub struct UpdateNamespace {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Page of namespaces ordered by name, optionally filtered by a name substring.
pub async fn list_namespaces<C: ConnectionTrait>(
    db: &C,
    name: Option<&str>,
    params: PageParams,
) -> Result<Page<NamespaceRecord>, ServiceError> {
    let mut query = namespace::Entity::find();
    if let Some(name) = name.filter(|n| !n.is_empty()) {
        query = query.filter(namespace::Column::Name.like(contains_literal(name)));
    }
    let query = query.order_by_asc(namespace::Column::Name).find_also_related(user::Entity);
    let page = paginate(query, db, params).await?;
    Ok(page.map(NamespaceRecord::from))
}

pub async fn get_namespace<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<NamespaceRecord, ServiceError> {
    namespace::Entity::find_by_id(id)
        .find_also_related(user::Entity)
        .one(db)
        .await?
        .map(NamespaceRecord::from)
        .ok_or_else(|| ServiceError::not_found(ENTITY, "id", id.to_string()))
}

async fn ensure_name_free<C: ConnectionTrait>(db: &C, name: &str) -> Result<(), ServiceError> {
    let taken = namespace::Entity::find()
        .filter(namespace::Column::Name.eq(name))
        .count(db)
        .await?;
    if taken > 0 {
        return Err(ServiceError::already_exists(ENTITY, "name", name));
    }
    Ok(())
}

fn write_error(name: &str, e: models::errors::ModelError) -> ServiceError {
    if e.is_unique_violation() {
        ServiceError::already_exists(ENTITY, "name", name)
    } else {
        ServiceError::from_model(ENTITY, e)
    }
}

fn ensure_can_modify(ns: &namespace::Model, user: &AuthUser) -> Result<(), ServiceError> {
    if ns.owner_id == user.id || user.is_admin {
        Ok(())
    } else {
        Err(ServiceError::PermissionDenied(format!(
            "only the owner of namespace {:?} or an admin may change it",
            ns.name
        )))
    }
}

#[instrument(skip(db, input), fields(name = %input.name, user = %user.username))]
pub async fn create_namespace<C: ConnectionTrait>(
    db: &C,
    user: &AuthUser,
    input: CreateNamespace,
) -> Result<NamespaceRecord, ServiceError> {
    namespace::validate_name(&input.name).map_err(|e| ServiceError::from_model(ENTITY, e))?;
    ensure_name_free(db, &input.name).await?;
    let created = namespace::create(db, &input.name, &input.description, user.id)
        .await
        .map_err(|e| write_error(&input.name, e))?;
    info!(event = "namespace_created", namespace_id = %created.id);
    Ok(NamespaceRecord { namespace: created, changed_by: Some(user.username.clone()) })
}

#[instrument(skip(db, input), fields(user = %user.username))]
pub async fn update_namespace<C: ConnectionTrait>(
    db: &C,
    user: &AuthUser,
    id: Uuid,
    input: UpdateNamespace,
) -> Result<NamespaceRecord, ServiceError> {
    let current = namespace::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found(ENTITY, "id", id.to_string()))?;
    ensure_can_modify(&current, user)?;

    let new_name = input.name.filter(|n| *n != current.name);
    if let Some(name) = &new_name {
        namespace::validate_name(name).map_err(|e| ServiceError::from_model(ENTITY, e))?;
        ensure_name_free(db, name).await?;
    }

    let name_for_errors = new_name.clone().unwrap_or_else(|| current.name.clone());
    let mut am: namespace::ActiveModel = current.into();
    if let Some(name) = new_name {
        am.name = Set(name);
    }
    if let Some(description) = input.description {
        am.description = Set(description);
    }
    am.changed_at = Set(Utc::now().into());
    am.changed_by_user_id = Set(Some(user.id));
    let updated = am
        .update(db)
        .await
        .map_err(|e| write_error(&name_for_errors, e.into()))?;
    info!(event = "namespace_updated", namespace_id = %updated.id);
    Ok(NamespaceRecord { namespace: updated, changed_by: Some(user.username.clone()) })
}

/// Delete an empty namespace. Soft-deleted HWMs and their history go with it.
#[instrument(skip(db), fields(user = %user.username))]
pub async fn delete_namespace<C: ConnectionTrait>(
    db: &C,
    user: &AuthUser,
    id: Uuid,
) -> Result<NamespaceRecord, ServiceError> {
    let record = get_namespace(db, id).await?;
    ensure_can_modify(&record.namespace, user)?;

    let live = hwm::Entity::find()
        .filter(hwm::Column::NamespaceId.eq(id))
        .filter(hwm::Column::IsDeleted.eq(false))
        .count(db)
        .await?;
    if live > 0 {
        return Err(ServiceError::invalid(
            ENTITY,
            "hwm",
            format!("namespace still holds {live} HWM(s); delete them first"),
        ));
    }

    namespace::Entity::delete_by_id(id).exec(db).await?;
    info!(event = "namespace_deleted", namespace_id = %id);
    Ok(record)
}
