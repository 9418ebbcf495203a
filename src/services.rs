pub mod pricing;
pub mod stock;
pub mod checkout;
pub mod mailer;
pub mod payment_webhook;
pub mod cart_service;
pub use cart_service::CartService;
pub mod catalog_service;
pub use catalog_service::CatalogService;
pub mod order_service;
pub use order_service::OrderService;
pub mod repair_service;
pub use repair_service::RepairService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
pub mod document_service;
pub use document_service::DocumentService;
