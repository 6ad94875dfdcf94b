//! OpenAPI document for the bridge's HTTP surface.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::dto::CommandSuccessResponse;
use super::handlers::{command, system};
use crate::error::ErrorResponse;

/// Generated OpenAPI description of every route.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "vcp-bridge",
        description = "Signs vehicle commands and relays them to the remote command gateway."
    ),
    paths(
        command::send_command,
        system::root_handler,
        system::health_handler,
        system::public_key_handler,
    ),
    components(schemas(CommandSuccessResponse, ErrorResponse, system::HealthResponse)),
    modifiers(&BearerAuth),
    tags(
        (name = "Commands", description = "Signed command relay"),
        (name = "System", description = "Liveness, health and key distribution"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme referenced by the command route.
#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}
