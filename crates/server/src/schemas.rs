//! Request and response bodies of the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use service::auth::domain::{AuthUser, TokenResponse};
use service::hwm_history_service::HwmHistoryRecord;
use service::hwm_service::{CopyHwms, CreateHwm, HwmRecord, UpdateHwm};
use service::namespace_service::{CreateNamespace, NamespaceRecord, UpdateNamespace};
use service::pagination::{Page, PageMeta, PageParams};

fn default_page() -> u64 {
    PageParams::default().page
}

fn default_page_size() -> u64 {
    PageParams::default().page_size
}

// ---- monitoring ----

#[derive(Serialize, ToSchema)]
pub struct PingResponse {
    #[schema(example = "ok")]
    pub status: String,
}

// ---- pagination ----

macro_rules! page_response {
    ($name:ident, $item:ty) => {
        #[derive(Debug, Serialize, ToSchema)]
        pub struct $name {
            pub meta: PageMeta,
            pub items: Vec<$item>,
        }

        impl $name {
            pub fn from_page<R>(page: Page<R>) -> Self
            where
                $item: From<R>,
            {
                let page = page.map(<$item>::from);
                Self { meta: page.meta, items: page.items }
            }
        }
    };
}

page_response!(NamespacePageResponse, NamespaceResponse);
page_response!(HwmPageResponse, HwmResponse);
page_response!(HwmHistoryPageResponse, HwmHistoryResponse);

// ---- auth / users ----

/// OAuth2 password-grant form.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthTokenResponse {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl From<TokenResponse> for AuthTokenResponse {
    fn from(t: TokenResponse) -> Self {
        Self { access_token: t.access_token, token_type: t.token_type, expires_at: t.expires_at }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
}

impl From<AuthUser> for UserResponse {
    fn from(u: AuthUser) -> Self {
        Self { id: u.id, username: u.username, is_admin: u.is_admin }
    }
}

// ---- namespaces ----

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NamespaceListQuery {
    #[serde(default = "default_page")]
    #[param(minimum = 1, default = 1)]
    pub page: u64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 50, default = 20)]
    pub page_size: u64,
    /// Substring of the namespace name.
    pub name: Option<String>,
}

impl NamespaceListQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams { page: self.page, page_size: self.page_size }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NamespaceResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner_id: Uuid,
    pub changed_at: DateTime<Utc>,
    pub changed_by: Option<String>,
}

impl From<NamespaceRecord> for NamespaceResponse {
    fn from(r: NamespaceRecord) -> Self {
        let ns = r.namespace;
        Self {
            id: ns.id,
            name: ns.name,
            description: ns.description,
            owner_id: ns.owner_id,
            changed_at: ns.changed_at.with_timezone(&Utc),
            changed_by: r.changed_by,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateNamespaceRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl From<CreateNamespaceRequest> for CreateNamespace {
    fn from(r: CreateNamespaceRequest) -> Self {
        Self { name: r.name, description: r.description }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateNamespaceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl From<UpdateNamespaceRequest> for UpdateNamespace {
    fn from(r: UpdateNamespaceRequest) -> Self {
        Self { name: r.name, description: r.description }
    }
}

// ---- HWM ----

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HwmListQuery {
    pub namespace_id: Uuid,
    #[serde(default = "default_page")]
    #[param(minimum = 1, default = 1)]
    pub page: u64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 50, default = 20)]
    pub page_size: u64,
    /// Substring of the HWM name.
    pub name: Option<String>,
}

impl HwmListQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams { page: self.page, page_size: self.page_size }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HwmResponse {
    pub id: Uuid,
    pub namespace_id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub hwm_type: String,
    #[schema(value_type = Object)]
    pub value: Value,
    pub entity: Option<String>,
    pub expression: Option<String>,
    pub changed_at: DateTime<Utc>,
    pub changed_by: Option<String>,
}

impl From<HwmRecord> for HwmResponse {
    fn from(r: HwmRecord) -> Self {
        let h = r.hwm;
        Self {
            id: h.id,
            namespace_id: h.namespace_id,
            name: h.name,
            description: h.description,
            hwm_type: h.hwm_type,
            value: h.value,
            entity: h.entity,
            expression: h.expression,
            changed_at: h.changed_at.with_timezone(&Utc),
            changed_by: r.changed_by,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateHwmRequest {
    pub namespace_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub hwm_type: String,
    #[schema(value_type = Object)]
    pub value: Value,
    #[serde(default)]
    pub description: String,
    pub entity: Option<String>,
    pub expression: Option<String>,
}

impl From<CreateHwmRequest> for CreateHwm {
    fn from(r: CreateHwmRequest) -> Self {
        Self {
            namespace_id: r.namespace_id,
            name: r.name,
            description: r.description,
            hwm_type: r.hwm_type,
            value: r.value,
            entity: r.entity,
            expression: r.expression,
        }
    }
}

/// Omitted fields are left unchanged; `null` clears `entity`, `expression`
/// and `value`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateHwmRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub hwm_type: Option<String>,
    #[serde(default, deserialize_with = "common::serde_ext::double_option")]
    #[schema(value_type = Option<Object>)]
    pub value: Option<Option<Value>>,
    #[serde(default, deserialize_with = "common::serde_ext::double_option")]
    #[schema(value_type = Option<String>)]
    pub entity: Option<Option<String>>,
    #[serde(default, deserialize_with = "common::serde_ext::double_option")]
    #[schema(value_type = Option<String>)]
    pub expression: Option<Option<String>>,
}

impl From<UpdateHwmRequest> for UpdateHwm {
    fn from(r: UpdateHwmRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            hwm_type: r.hwm_type,
            value: r.value,
            entity: r.entity,
            expression: r.expression,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CopyHwmRequest {
    pub source_namespace_id: Uuid,
    pub target_namespace_id: Uuid,
    pub hwm_ids: Vec<Uuid>,
    #[serde(default)]
    pub with_history: bool,
}

impl From<CopyHwmRequest> for CopyHwms {
    fn from(r: CopyHwmRequest) -> Self {
        Self {
            source_namespace_id: r.source_namespace_id,
            target_namespace_id: r.target_namespace_id,
            hwm_ids: r.hwm_ids,
            with_history: r.with_history,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CopiedHwmsResponse {
    pub items: Vec<HwmResponse>,
}

// ---- HWM history ----

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HwmHistoryQuery {
    pub hwm_id: Uuid,
    #[serde(default = "default_page")]
    #[param(minimum = 1, default = 1)]
    pub page: u64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 50, default = 20)]
    pub page_size: u64,
}

impl HwmHistoryQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams { page: self.page, page_size: self.page_size }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HwmHistoryResponse {
    pub id: Uuid,
    pub hwm_id: Uuid,
    pub namespace_id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub hwm_type: String,
    #[schema(value_type = Object)]
    pub value: Value,
    pub entity: Option<String>,
    pub expression: Option<String>,
    #[schema(example = "Updated")]
    pub action: String,
    pub changed_at: DateTime<Utc>,
    pub changed_by: Option<String>,
}

impl From<HwmHistoryRecord> for HwmHistoryResponse {
    fn from(r: HwmHistoryRecord) -> Self {
        let h = r.history;
        Self {
            id: h.id,
            hwm_id: h.hwm_id,
            namespace_id: h.namespace_id,
            name: h.name,
            description: h.description,
            hwm_type: h.hwm_type,
            value: h.value,
            entity: h.entity,
            expression: h.expression,
            action: h.action,
            changed_at: h.changed_at.with_timezone(&Utc),
            changed_by: r.changed_by,
        }
    }
}
