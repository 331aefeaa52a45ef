use mm_tensor::{DispatchConfig, MatmulDispatcher};

/// Opaque handle that owns a configured dispatcher.
pub struct MMDispatcher {
    pub dispatcher: MatmulDispatcher,
}

impl MMDispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            dispatcher: MatmulDispatcher::new(config),
        }
    }
}
