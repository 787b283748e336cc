use std::sync::Arc;

use tabi_providers::exchange::CurrencyConverter;
use tabi_providers::object_store::ObjectStore;
use tabi_providers::payment::{GatewayKind, PaymentProcessor};
use tabi_providers::shopping::ShoppingSearch;
use tabi_providers::vision::VisionAnalyzer;

use crate::config::ServerConfig;

/// External collaborators, trait-fronted so tests can stub them.
pub struct Providers {
    pub vision: Arc<dyn VisionAnalyzer>,
    pub converter: Arc<dyn CurrencyConverter>,
    pub shopping: Arc<dyn ShoppingSearch>,
    pub object_store: Arc<dyn ObjectStore>,
    pub domestic_payments: Arc<dyn PaymentProcessor>,
    pub international_payments: Arc<dyn PaymentProcessor>,
}

impl Providers {
    /// The payment gateway for a buyer's country.
    pub fn payments_for(&self, country: Option<&str>) -> &Arc<dyn PaymentProcessor> {
        match tabi_providers::payment::processor_for_country(country) {
            GatewayKind::Domestic => &self.domestic_payments,
            GatewayKind::International => &self.international_payments,
        }
    }
}

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: tabi_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// External collaborators.
    pub providers: Arc<Providers>,
}
