use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ordershop API",
        version = "0.1.0",
        description = r#"
# Ordershop API

Order management backend whose listing endpoints exist in several versions,
each exercising a different query-shaping strategy against the same data:

- **v1** — entity-shaped payloads, associations resolved per row
- **v2** — flattened response records, associations still resolved per row
- **v3** — joined round trips (to-one joins; collection join with in-memory de-dup)
- **v3.1** — paged to-one join plus batched IN-clause collection loads
- **v4 / v5** — projections built directly at the query level

All versions of an endpoint family return the same logical result set; they
differ only in query count and transfer volume.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    tags(
        (name = "Members", description = "Member registration and lookup"),
        (name = "Orders", description = "Order lifecycle and full listings"),
        (name = "Simple Orders", description = "Listings over the to-one associations"),
        (name = "Items", description = "Catalog items")
    ),
    paths(
        // Members
        crate::handlers::members::create_member_v2,
        crate::handlers::members::update_member_v2,

        // Orders
        crate::handlers::orders::create_order,
        crate::handlers::orders::cancel_order,
        crate::handlers::orders::orders_v2,
        crate::handlers::orders::orders_v3,
        crate::handlers::orders::orders_v3_paged,
        crate::handlers::orders::orders_v4,
        crate::handlers::orders::orders_v5,

        // Simple orders
        crate::handlers::simple_orders::simple_orders_v2,
        crate::handlers::simple_orders::simple_orders_v3,
        crate::handlers::simple_orders::simple_orders_v4,

        // Items
        crate::handlers::items::create_item,
        crate::handlers::items::list_items,
        crate::handlers::items::update_item,

        // The v1 endpoints are intentionally absent: their payloads mirror
        // the persistence rows rather than a stable schema.
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,

            // Order types
            crate::dto::OrderDto,
            crate::dto::OrderItemDto,
            crate::dto::OrderQueryDto,
            crate::dto::OrderItemQueryDto,
            crate::dto::OrderSimpleQueryDto,
            crate::dto::PlaceOrderRequest,
            crate::dto::OrderLineRequest,
            crate::dto::PlaceOrderResponse,
            crate::entities::address::Address,
            crate::entities::order::OrderStatus,
            crate::entities::delivery::DeliveryStatus,

            // Member types
            crate::dto::CreateMemberV1Request,
            crate::dto::CreateMemberRequest,
            crate::dto::UpdateMemberRequest,
            crate::dto::CreateMemberResponse,
            crate::dto::UpdateMemberResponse,

            // Item types
            crate::dto::CreateItemRequest,
            crate::dto::UpdateItemRequest,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_includes_the_version_ladder() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string(&openapi).unwrap();
        assert!(json.contains("/api/v2/orders"));
        assert!(json.contains("/api/v3.1/orders"));
        assert!(json.contains("/api/v5/orders"));
        assert!(json.contains("/api/v4/simple-orders"));
    }
}
