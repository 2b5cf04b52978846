use quantlens_core::DataProvider;

/// Shared application state accessible by all route handlers.
pub struct AppState {
    /// Source of bars for every analysis request.
    pub provider: Box<dyn DataProvider>,
}

impl AppState {
    pub fn new(provider: Box<dyn DataProvider>) -> Self {
        Self { provider }
    }
}
