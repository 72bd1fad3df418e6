use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::errors::ErrorBody;
use crate::schemas::*;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Horizon", description = "Namespaces, high-water-marks and their history"),
    paths(
        crate::routes::monitoring::ping,
        crate::routes::auth::token,
        crate::routes::auth::register,
        crate::routes::auth::me,
        crate::routes::namespaces::list,
        crate::routes::namespaces::get,
        crate::routes::namespaces::create,
        crate::routes::namespaces::update,
        crate::routes::namespaces::delete,
        crate::routes::hwm::list,
        crate::routes::hwm::get,
        crate::routes::hwm::create,
        crate::routes::hwm::update,
        crate::routes::hwm::delete,
        crate::routes::hwm::copy,
        crate::routes::hwm_history::list,
    ),
    components(
        schemas(
            ErrorBody,
            PingResponse,
            service::pagination::PageMeta,
            TokenRequest,
            AuthTokenResponse,
            RegisterRequest,
            UserResponse,
            NamespaceResponse,
            NamespacePageResponse,
            CreateNamespaceRequest,
            UpdateNamespaceRequest,
            HwmResponse,
            HwmPageResponse,
            CreateHwmRequest,
            UpdateHwmRequest,
            CopyHwmRequest,
            CopiedHwmsResponse,
            HwmHistoryResponse,
            HwmHistoryPageResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "monitoring"),
        (name = "auth"),
        (name = "users"),
        (name = "namespaces"),
        (name = "hwm"),
        (name = "hwm-history")
    )
)]
pub struct ApiDoc;
