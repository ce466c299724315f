// ID Provider Port (run correlation ids)

/// ID provider interface (allows deterministic IDs in tests)
pub trait IdProvider: Send + Sync {
    /// Generate a new run ID
    fn generate_id(&self) -> String;
}

/// UUID v4 provider (production)
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Constant ID provider for tests
pub struct StaticIdProvider(pub &'static str);

impl IdProvider for StaticIdProvider {
    fn generate_id(&self) -> String {
        self.0.to_string()
    }
}
