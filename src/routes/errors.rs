use schemars::JsonSchema;
use serde::Serialize;

#[derive(Debug, Serialize, JsonSchema, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitedErrorType {
    #[default]
    Ratelimited,
}

/// Body of the 429 answer of the rate limiter
#[derive(Debug, Serialize, JsonSchema, Default)]
pub struct RateLimitedResponse {
    pub error: RateLimitedErrorType,
}
