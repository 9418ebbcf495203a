pub mod user_repo;
pub use user_repo::UserRepository;
pub mod catalog_repo;
pub use catalog_repo::ProductRepository;
pub mod cart_repo;
pub use cart_repo::CartRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod repair_repo;
pub use repair_repo::RepairRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
