use utoipa::OpenApi;

use crate::handlers::health::{HealthStatus, ServiceHealth};
use crate::models::{Account, CreateAccountRequest};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Simple Bank API",
        description = "Account service for Simple Bank",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        // Health
        crate::handlers::health::health_check,

        // Accounts
        crate::handlers::accounts::get_account,
        crate::handlers::accounts::list_accounts,
        crate::handlers::accounts::create_account,
    ),
    components(schemas(Account, CreateAccountRequest, HealthStatus, ServiceHealth)),
    tags(
        (name = "accounts", description = "Bank account lookup and creation"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
