// src/routes.rs

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState, docs::ApiDoc, handlers, middleware::auth::USER_ID_HEADER,
    services::payment_webhook::SIGNATURE_HEADER,
};

/// Uma única política de CORS para a API inteira, montada da lista de origens permitidas.
/// Lista vazia = nenhuma origem externa.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("⚠️ Origem CORS inválida ignorada: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(SIGNATURE_HEADER),
        ])
}

pub fn app_router(app_state: AppState) -> Router {
    // Vitrine e carrinho (visitante ou usuário)
    let catalog_routes = Router::new()
        .route("/", get(handlers::catalog::list_products))
        .route("/{slug}", get(handlers::catalog::get_product));

    let cart_routes = Router::new()
        .route(
            "/",
            get(handlers::cart::get_cart)
                .post(handlers::cart::add_to_cart)
                .delete(handlers::cart::clear_cart),
        )
        .route(
            "/{product_id}",
            put(handlers::cart::update_cart_item).delete(handlers::cart::remove_cart_item),
        );

    let order_routes = Router::new()
        .route(
            "/",
            post(handlers::orders::place_order).get(handlers::orders::list_my_orders),
        )
        .route("/{id}", get(handlers::orders::get_my_order))
        .route("/{id}/invoice.pdf", get(handlers::orders::invoice_pdf));

    let repair_routes = Router::new()
        .route("/", post(handlers::repairs::create_ticket))
        .route("/mine", get(handlers::repairs::my_tickets))
        .route("/track/{ticket_number}", get(handlers::repairs::track_ticket));

    // Todas exigem papel ADMIN (extrator `AdminUser` em cada handler)
    let admin_routes = Router::new()
        .route("/dashboard", get(handlers::admin::get_dashboard))
        .route("/orders/{id}", get(handlers::admin::get_order))
        .route("/orders/{id}/status", put(handlers::admin::update_order_status))
        .route("/repairs/{id}/status", put(handlers::admin::update_repair_status))
        .route("/products", post(handlers::catalog::create_product))
        .route("/products/{id}", put(handlers::catalog::update_product))
        .route("/products/{id}/stock", post(handlers::catalog::adjust_stock));

    let cors = cors_layer(&app_state.settings.cors_allowed_origins);

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/users/me", get(handlers::users::get_me))
        .route("/api/webhooks/payments", post(handlers::webhooks::payment_webhook))
        .nest("/api/products", catalog_routes)
        .nest("/api/cart", cart_routes)
        .nest("/api/orders", order_routes)
        .nest("/api/repairs", repair_routes)
        .nest("/api/admin", admin_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
