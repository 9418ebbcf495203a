// src/docs.rs

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Catalog ---
        handlers::catalog::list_products,
        handlers::catalog::get_product,

        // --- Cart ---
        handlers::cart::get_cart,
        handlers::cart::add_to_cart,
        handlers::cart::update_cart_item,
        handlers::cart::remove_cart_item,
        handlers::cart::clear_cart,

        // --- Orders ---
        handlers::orders::place_order,
        handlers::orders::list_my_orders,
        handlers::orders::get_my_order,
        handlers::orders::invoice_pdf,

        // --- Repairs ---
        handlers::repairs::create_ticket,
        handlers::repairs::track_ticket,
        handlers::repairs::my_tickets,

        // --- Users ---
        handlers::users::get_me,

        // --- Webhooks ---
        handlers::webhooks::payment_webhook,

        // --- Admin ---
        handlers::admin::get_dashboard,
        handlers::admin::get_order,
        handlers::admin::update_order_status,
        handlers::admin::update_repair_status,
        handlers::catalog::create_product,
        handlers::catalog::update_product,
        handlers::catalog::adjust_stock,
    ),
    components(
        schemas(
            // --- Models ---
            models::auth::UserRole,
            models::auth::WholesaleTier,
            models::auth::User,
            models::catalog::Product,
            models::catalog::ProductListing,
            models::cart::CartItem,
            models::cart::CartLineView,
            models::cart::CartView,
            models::cart::CartMutation,
            models::orders::Address,
            models::orders::OrderStatus,
            models::orders::PaymentStatus,
            models::orders::Order,
            models::orders::OrderItem,
            models::orders::OrderDetail,
            models::orders::PlacedOrder,
            models::repairs::RepairStatus,
            models::repairs::RepairTicket,
            models::repairs::RepairTracking,
            models::dashboard::DashboardSummary,
            models::dashboard::LowStockProduct,

            // --- Payloads ---
            handlers::cart::AddToCartPayload,
            handlers::cart::UpdateCartItemPayload,
            handlers::catalog::CreateProductPayload,
            handlers::catalog::UpdateProductPayload,
            handlers::catalog::AdjustStockPayload,
            handlers::orders::PlaceOrderPayload,
            handlers::repairs::CreateRepairPayload,
            handlers::admin::UpdateOrderStatusPayload,
            handlers::admin::UpdateRepairStatusPayload,
            services::payment_webhook::PaymentEvent,
            services::payment_webhook::PaymentEventData,
        )
    ),
    tags(
        (name = "Catalog", description = "Vitrine de peças com preço por papel/faixa"),
        (name = "Cart", description = "Carrinho do usuário (visitante não persiste)"),
        (name = "Orders", description = "Checkout, histórico e faturas"),
        (name = "Repairs", description = "Chamados de reparo e rastreio público"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Webhooks", description = "Eventos do provedor de pagamento"),
        (name = "Admin", description = "Painel, pedidos, produtos e reparos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "user_header",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-user-id"))),
        );
        components.add_security_scheme(
            "payment_signature",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-payment-signature"))),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/orders",
            "/api/cart/{product_id}",
            "/api/webhooks/payments",
            "/api/admin/orders/{id}/status",
            "/api/repairs/track/{ticket_number}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "faltando {}", path);
        }
    }
}
