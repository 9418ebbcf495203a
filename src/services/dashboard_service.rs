// src/services/dashboard_service.rs

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::dashboard::DashboardSummary,
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    low_stock_threshold: i32,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, low_stock_threshold: i32) -> Self {
        Self { repo, low_stock_threshold }
    }

    pub async fn get_summary(&self) -> Result<DashboardSummary, AppError> {
        self.repo.get_summary(self.low_stock_threshold).await
    }
}
