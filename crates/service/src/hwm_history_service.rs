use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use models::{hwm, hwm_history, user};

use crate::errors::ServiceError;
use crate::pagination::{paginate, Page, PageParams};

#[derive(Clone, Debug, PartialEq)]
pub struct HwmHistoryRecord {
    pub history: hwm_history::Model,
    pub changed_by: Option<String>,
}

impl From<(hwm_history::Model, Option<user::Model>)> for HwmHistoryRecord {
    fn from((history, changed_by): (hwm_history::Model, Option<user::Model>)) -> Self {
        Self { history, changed_by: changed_by.map(|u| u.username) }
    }
}

/// History of one HWM, newest first. Soft-deleted HWMs keep their history
/// readable; an id that never existed is `EntityNotFound`.
pub async fn list_history<C: ConnectionTrait>(
    db: &C,
    hwm_id: Uuid,
    params: PageParams,
) -> Result<Page<HwmHistoryRecord>, ServiceError> {
    if hwm::Entity::find_by_id(hwm_id).one(db).await?.is_none() {
        return Err(ServiceError::not_found("HWM", "id", hwm_id.to_string()));
    }
    let query = hwm_history::Entity::find()
        .filter(hwm_history::Column::HwmId.eq(hwm_id))
        .order_by_desc(hwm_history::Column::ChangedAt)
        .order_by_desc(hwm_history::Column::Id)
        .find_also_related(user::Entity);
    let page = paginate(query, db, params).await?;
    Ok(page.map(HwmHistoryRecord::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwm_service::{create_hwm, delete_hwm, update_hwm, CreateHwm, UpdateHwm};
    use crate::namespace_service::{create_namespace, CreateNamespace};
    use crate::test_support::{create_user, get_db, unique};
    use serde_json::json;

    #[tokio::test]
    async fn history_is_newest_first_and_paginated() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let user = create_user(&db, false).await?;
        let ns = create_namespace(&db, &user, CreateNamespace { name: unique("svc_hist"), ..Default::default() }).await?;
        let created = create_hwm(&db, &user, CreateHwm {
            namespace_id: ns.namespace.id,
            name: "h".into(),
            description: String::new(),
            hwm_type: "column_int".into(),
            value: json!(1),
            entity: None,
            expression: None,
        })
        .await?;
        let id = created.hwm.id;
        update_hwm(&db, &user, id, UpdateHwm { value: Some(Some(json!(2))), ..Default::default() }).await?;
        delete_hwm(&db, &user, id).await?;

        let page = list_history(&db, id, PageParams { page: 1, page_size: 2 }).await?;
        assert_eq!(page.meta.total_count, 3);
        assert_eq!(page.meta.pages_count, 2);
        assert!(page.meta.has_next);
        let actions: Vec<_> = page.items.iter().map(|r| r.history.action.as_str()).collect();
        assert_eq!(actions, vec!["Deleted", "Updated"]);
        assert_eq!(page.items[0].changed_by.as_deref(), Some(user.username.as_str()));

        let missing = list_history(&db, Uuid::new_v4(), PageParams::default()).await;
        assert!(matches!(missing, Err(ServiceError::EntityNotFound(_))));
        Ok(())
    }
}
