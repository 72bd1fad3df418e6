//! HWM CRUD plus copying between namespaces.
//!
//! Every mutation appends a history row through [`hwm_history::record`] on
//! the same connection, so passing a transaction keeps the HWM and its log
//! consistent.

use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    prelude::Json, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{info, instrument};
use uuid::Uuid;

use models::hwm::{self, NewHwm};
use models::hwm_history::{self, HwmAction};
use models::{namespace, user};

use crate::auth::domain::AuthUser;
use crate::errors::ServiceError;
use crate::filters::contains_literal;
use crate::pagination::{paginate, Page, PageParams};

const ENTITY: &str = "HWM";

#[derive(Clone, Debug, PartialEq)]
pub struct HwmRecord {
    pub hwm: hwm::Model,
    pub changed_by: Option<String>,
}

impl From<(hwm::Model, Option<user::Model>)> for HwmRecord {
    fn from((hwm, changed_by): (hwm::Model, Option<user::Model>)) -> Self {
        Self { hwm, changed_by: changed_by.map(|u| u.username) }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreateHwm {
    pub namespace_id: Uuid,
    pub name: String,
    pub description: String,
    pub hwm_type: String,
    pub value: Json,
    pub entity: Option<String>,
    pub expression: Option<String>,
}

/// Partial update. For the nullable fields `Some(None)` clears the column;
/// a cleared `value` is stored as JSON `null`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateHwm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub hwm_type: Option<String>,
    pub value: Option<Option<Json>>,
    pub entity: Option<Option<String>>,
    pub expression: Option<Option<String>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CopyHwms {
    pub source_namespace_id: Uuid,
    pub target_namespace_id: Uuid,
    pub hwm_ids: Vec<Uuid>,
    pub with_history: bool,
}

async fn ensure_namespace<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<namespace::Model, ServiceError> {
    namespace::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Namespace", "id", id.to_string()))
}

async fn find_live<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<hwm::Model, ServiceError> {
    hwm::Entity::find_by_id(id)
        .filter(hwm::Column::IsDeleted.eq(false))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found(ENTITY, "id", id.to_string()))
}

async fn ensure_name_free<C: ConnectionTrait>(db: &C, namespace_id: Uuid, name: &str) -> Result<(), ServiceError> {
    let taken = hwm::Entity::find()
        .filter(hwm::Column::NamespaceId.eq(namespace_id))
        .filter(hwm::Column::Name.eq(name))
        .filter(hwm::Column::IsDeleted.eq(false))
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

/// Live HWMs of one namespace ordered by name. An unknown namespace yields an
/// empty page.
pub async fn list_hwms<C: ConnectionTrait>(
    db: &C,
    namespace_id: Uuid,
    name: Option<&str>,
    params: PageParams,
) -> Result<Page<HwmRecord>, ServiceError> {
    let mut query = hwm::Entity::find()
        .filter(hwm::Column::NamespaceId.eq(namespace_id))
        .filter(hwm::Column::IsDeleted.eq(false));
    if let Some(name) = name.filter(|n| !n.is_empty()) {
        query = query.filter(hwm::Column::Name.like(contains_literal(name)));
    }
    let query = query.order_by_asc(hwm::Column::Name).find_also_related(user::Entity);
    let page = paginate(query, db, params).await?;
    Ok(page.map(HwmRecord::from))
}

pub async fn get_hwm<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<HwmRecord, ServiceError> {
    hwm::Entity::find_by_id(id)
        .filter(hwm::Column::IsDeleted.eq(false))
        .find_also_related(user::Entity)
        .one(db)
        .await?
        .map(HwmRecord::from)
        .ok_or_else(|| ServiceError::not_found(ENTITY, "id", id.to_string()))
}

#[instrument(skip(db, input), fields(namespace_id = %input.namespace_id, name = %input.name, user = %user.username))]
pub async fn create_hwm<C: ConnectionTrait>(
    db: &C,
    user: &AuthUser,
    input: CreateHwm,
) -> Result<HwmRecord, ServiceError> {
    hwm::validate_name(&input.name).map_err(|e| ServiceError::from_model(ENTITY, e))?;
    hwm::validate_type(&input.hwm_type).map_err(|e| ServiceError::from_model(ENTITY, e))?;
    ensure_namespace(db, input.namespace_id).await?;
    ensure_name_free(db, input.namespace_id, &input.name).await?;

    let name = input.name.clone();
    let new = NewHwm {
        namespace_id: input.namespace_id,
        name: input.name,
        description: input.description,
        hwm_type: input.hwm_type,
        value: input.value,
        entity: input.entity,
        expression: input.expression,
    };
    let created = hwm::create(db, new, user.id).await.map_err(|e| write_error(&name, e))?;
    hwm_history::record(db, &created, HwmAction::Created, Some(user.id))
        .await
        .map_err(|e| ServiceError::from_model("HWMHistory", e))?;
    info!(event = "hwm_created", hwm_id = %created.id);
    Ok(HwmRecord { hwm: created, changed_by: Some(user.username.clone()) })
}

#[instrument(skip(db, input), fields(user = %user.username))]
pub async fn update_hwm<C: ConnectionTrait>(
    db: &C,
    user: &AuthUser,
    id: Uuid,
    input: UpdateHwm,
) -> Result<HwmRecord, ServiceError> {
    let current = find_live(db, id).await?;

    let new_name = input.name.filter(|n| *n != current.name);
    if let Some(name) = &new_name {
        hwm::validate_name(name).map_err(|e| ServiceError::from_model(ENTITY, e))?;
        ensure_name_free(db, current.namespace_id, name).await?;
    }
    if let Some(hwm_type) = &input.hwm_type {
        hwm::validate_type(hwm_type).map_err(|e| ServiceError::from_model(ENTITY, e))?;
    }

    let name_for_errors = new_name.clone().unwrap_or_else(|| current.name.clone());
    let mut am: hwm::ActiveModel = current.into();
    if let Some(name) = new_name {
        am.name = Set(name);
    }
    if let Some(description) = input.description {
        am.description = Set(description);
    }
    if let Some(hwm_type) = input.hwm_type {
        am.hwm_type = Set(hwm_type);
    }
    if let Some(value) = input.value {
        am.value = Set(value.unwrap_or(Json::Null));
    }
    if let Some(entity) = input.entity {
        am.entity = Set(entity);
    }
    if let Some(expression) = input.expression {
        am.expression = Set(expression);
    }
    am.changed_at = Set(Utc::now().into());
    am.changed_by_user_id = Set(Some(user.id));

    let updated = am
        .update(db)
        .await
        .map_err(|e| write_error(&name_for_errors, e.into()))?;
    hwm_history::record(db, &updated, HwmAction::Updated, Some(user.id))
        .await
        .map_err(|e| ServiceError::from_model("HWMHistory", e))?;
    info!(event = "hwm_updated", hwm_id = %updated.id);
    Ok(HwmRecord { hwm: updated, changed_by: Some(user.username.clone()) })
}

/// Soft delete: the row stays for history, its name becomes reusable.
#[instrument(skip(db), fields(user = %user.username))]
pub async fn delete_hwm<C: ConnectionTrait>(db: &C, user: &AuthUser, id: Uuid) -> Result<HwmRecord, ServiceError> {
    let current = find_live(db, id).await?;
    let mut am: hwm::ActiveModel = current.into();
    am.is_deleted = Set(true);
    am.changed_at = Set(Utc::now().into());
    am.changed_by_user_id = Set(Some(user.id));
    let deleted = am.update(db).await?;
    hwm_history::record(db, &deleted, HwmAction::Deleted, Some(user.id))
        .await
        .map_err(|e| ServiceError::from_model("HWMHistory", e))?;
    info!(event = "hwm_deleted", hwm_id = %deleted.id);
    Ok(HwmRecord { hwm: deleted, changed_by: Some(user.username.clone()) })
}

/// Copy live HWMs into another namespace. With `with_history` the source
/// history rows are duplicated onto each copy before its `Created` row.
#[instrument(skip(db, input), fields(
    source = %input.source_namespace_id,
    target = %input.target_namespace_id,
    user = %user.username,
))]
pub async fn copy_hwms<C: ConnectionTrait>(
    db: &C,
    user: &AuthUser,
    input: CopyHwms,
) -> Result<Vec<HwmRecord>, ServiceError> {
    if input.source_namespace_id == input.target_namespace_id {
        return Err(ServiceError::invalid(
            ENTITY,
            "target_namespace_id",
            "source and target namespace must differ",
        ));
    }
    let mut seen = HashSet::new();
    let ids: Vec<Uuid> = input.hwm_ids.into_iter().filter(|id| seen.insert(*id)).collect();
    if ids.is_empty() {
        return Err(ServiceError::invalid(ENTITY, "hwm_ids", "at least one HWM id required"));
    }

    ensure_namespace(db, input.source_namespace_id).await?;
    ensure_namespace(db, input.target_namespace_id).await?;

    let sources = hwm::Entity::find()
        .filter(hwm::Column::Id.is_in(ids.clone()))
        .filter(hwm::Column::NamespaceId.eq(input.source_namespace_id))
        .filter(hwm::Column::IsDeleted.eq(false))
        .order_by_asc(hwm::Column::Name)
        .all(db)
        .await?;
    if let Some(missing) = ids.iter().find(|id| !sources.iter().any(|h| h.id == **id)) {
        return Err(ServiceError::not_found(ENTITY, "id", missing.to_string()));
    }

    let mut copies = Vec::with_capacity(sources.len());
    for source in sources {
        ensure_name_free(db, input.target_namespace_id, &source.name).await?;
        let name = source.name.clone();
        let new = NewHwm {
            namespace_id: input.target_namespace_id,
            name: source.name,
            description: source.description,
            hwm_type: source.hwm_type,
            value: source.value,
            entity: source.entity,
            expression: source.expression,
        };
        let copy = hwm::create(db, new, user.id).await.map_err(|e| write_error(&name, e))?;

        if input.with_history {
            copy_history(db, source.id, &copy).await?;
        }
        hwm_history::record(db, &copy, HwmAction::Created, Some(user.id))
            .await
            .map_err(|e| ServiceError::from_model("HWMHistory", e))?;
        info!(event = "hwm_copied", from = %source.id, to = %copy.id);
        copies.push(HwmRecord { hwm: copy, changed_by: Some(user.username.clone()) });
    }
    Ok(copies)
}

async fn copy_history<C: ConnectionTrait>(db: &C, from: Uuid, to: &hwm::Model) -> Result<(), ServiceError> {
    let rows = hwm_history::Entity::find()
        .filter(hwm_history::Column::HwmId.eq(from))
        .order_by_asc(hwm_history::Column::ChangedAt)
        .order_by_asc(hwm_history::Column::Id)
        .all(db)
        .await?;
    for row in rows {
        let am = hwm_history::ActiveModel {
            id: Set(Uuid::new_v4()),
            hwm_id: Set(to.id),
            namespace_id: Set(to.namespace_id),
            name: Set(row.name),
            description: Set(row.description),
            hwm_type: Set(row.hwm_type),
            value: Set(row.value),
            entity: Set(row.entity),
            expression: Set(row.expression),
            action: Set(row.action),
            changed_at: Set(row.changed_at),
            changed_by_user_id: Set(row.changed_by_user_id),
        };
        am.insert(db).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace_service::{create_namespace, CreateNamespace};
    use crate::test_support::{create_user, get_db, unique};
    use serde_json::json;

    fn new_hwm(namespace_id: Uuid, name: &str) -> CreateHwm {
        CreateHwm {
            namespace_id,
            name: name.to_string(),
            description: String::new(),
            hwm_type: "column_int".into(),
            value: json!(1),
            entity: Some("orders".into()),
            expression: Some("updated_at".into()),
        }
    }

    async fn history_actions<C: ConnectionTrait>(db: &C, hwm_id: Uuid) -> Result<Vec<String>, ServiceError> {
        Ok(hwm_history::Entity::find()
            .filter(hwm_history::Column::HwmId.eq(hwm_id))
            .order_by_asc(hwm_history::Column::ChangedAt)
            .order_by_asc(hwm_history::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(|r| r.action)
            .collect())
    }

    #[tokio::test]
    async fn hwm_lifecycle_writes_history() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let user = create_user(&db, false).await?;
        let ns = create_namespace(&db, &user, CreateNamespace { name: unique("svc_hwm_ns"), ..Default::default() }).await?;
        let ns_id = ns.namespace.id;

        let created = create_hwm(&db, &user, new_hwm(ns_id, "orders_hwm")).await?;
        assert_eq!(created.hwm.value, json!(1));

        let dup = create_hwm(&db, &user, new_hwm(ns_id, "orders_hwm")).await;
        assert!(matches!(dup, Err(ServiceError::EntityAlreadyExists(_))));

        let patch = UpdateHwm { value: Some(Some(json!(5))), entity: Some(None), ..Default::default() };
        let updated = update_hwm(&db, &user, created.hwm.id, patch).await?;
        assert_eq!(updated.hwm.value, json!(5));
        assert_eq!(updated.hwm.entity, None);
        assert_eq!(updated.hwm.expression.as_deref(), Some("updated_at"));

        let page = list_hwms(&db, ns_id, None, PageParams::default()).await?;
        assert_eq!(page.meta.total_count, 1);

        delete_hwm(&db, &user, created.hwm.id).await?;
        assert!(matches!(get_hwm(&db, created.hwm.id).await, Err(ServiceError::EntityNotFound(_))));
        assert_eq!(history_actions(&db, created.hwm.id).await?, vec!["Created", "Updated", "Deleted"]);

        // name is reusable after soft delete
        let again = create_hwm(&db, &user, new_hwm(ns_id, "orders_hwm")).await?;
        assert_ne!(again.hwm.id, created.hwm.id);
        Ok(())
    }

    #[tokio::test]
    async fn create_in_unknown_namespace_fails() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let user = create_user(&db, false).await?;
        let res = create_hwm(&db, &user, new_hwm(Uuid::new_v4(), "x")).await;
        assert!(matches!(res, Err(ServiceError::EntityNotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn copy_between_namespaces() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let user = create_user(&db, false).await?;
        let src = create_namespace(&db, &user, CreateNamespace { name: unique("svc_copy_src"), ..Default::default() }).await?;
        let dst = create_namespace(&db, &user, CreateNamespace { name: unique("svc_copy_dst"), ..Default::default() }).await?;
        let src_id = src.namespace.id;
        let dst_id = dst.namespace.id;

        let a = create_hwm(&db, &user, new_hwm(src_id, "a")).await?;
        update_hwm(&db, &user, a.hwm.id, UpdateHwm { value: Some(Some(json!(2))), ..Default::default() }).await?;

        let same = copy_hwms(&db, &user, CopyHwms {
            source_namespace_id: src_id,
            target_namespace_id: src_id,
            hwm_ids: vec![a.hwm.id],
            with_history: false,
        })
        .await;
        assert!(matches!(same, Err(ServiceError::EntityInvalid { .. })));

        let copies = copy_hwms(&db, &user, CopyHwms {
            source_namespace_id: src_id,
            target_namespace_id: dst_id,
            hwm_ids: vec![a.hwm.id, a.hwm.id],
            with_history: true,
        })
        .await?;
        assert_eq!(copies.len(), 1);
        assert_eq!(copies[0].hwm.namespace_id, dst_id);
        assert_eq!(copies[0].hwm.value, json!(2));
        assert_eq!(history_actions(&db, copies[0].hwm.id).await?, vec!["Created", "Updated", "Created"]);

        let collision = copy_hwms(&db, &user, CopyHwms {
            source_namespace_id: src_id,
            target_namespace_id: dst_id,
            hwm_ids: vec![a.hwm.id],
            with_history: false,
        })
        .await;
        assert!(matches!(collision, Err(ServiceError::EntityAlreadyExists(_))));
        Ok(())
    }
}
