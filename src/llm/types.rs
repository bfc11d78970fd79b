use serde::{Deserialize, Serialize};

/// Generation parameters sent with every summary request. The values are
/// fixed by configuration, not per request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            temperature: 0.2,
            top_p: 0.50,
        }
    }
}
