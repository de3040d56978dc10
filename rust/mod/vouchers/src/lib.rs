pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use portal_core::Module;

use service::VoucherService;

/// Vouchers Module — captive portal access voucher management.
pub struct VouchersModule {
    service: Arc<VoucherService>,
}

impl VouchersModule {
    pub fn new(service: VoucherService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Guest-facing portal routes (`POST /login`), mounted at the server root
    /// rather than under the module prefix.
    pub fn portal_routes(&self) -> Router {
        api::portal_router(self.service.clone())
    }
}

impl Module for VouchersModule {
    fn name(&self) -> &str {
        "vouchers"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
