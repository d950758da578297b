//! Platform constants
//!
//! Centralized location for endpoints, credential formats, and token renewal
//! timings used throughout the client.

// Endpoints
pub const DEFAULT_BASE_URL: &str = "https://api.watsonwork.ibm.com";
pub const GRAPHQL_ROUTE: &str = "graphql";
pub const PHOTOS_ROUTE: &str = "photos/";

// GraphQL negotiation
pub const GRAPHQL_VIEW_HEADER: &str = "x-graphql-view";
pub const GRAPHQL_VIEW: &str = "PUBLIC, BETA, EXPERIMENTAL";
pub const CONTENT_TYPE_GRAPHQL: &str = "application/graphql";
pub const CONTENT_TYPE_JSON: &str = "application/json";

// Transport
/// When set, HTTP clients ignore system proxy settings.
pub const DISABLE_PROXY_ENV: &str = "WWS_DISABLE_PROXY";

// Credential format
pub const APP_ID_LENGTH: usize = 36;
pub const APP_SECRET_LENGTH: usize = 28;

// Token renewal
pub const RENEW_BEFORE_EXPIRY_SECS: u64 = 60;
pub const ACQUISITION_RETRY_SECS: u64 = 10;
/// Consecutive failures tolerated before acquisition becomes terminal.
pub const MAX_ACQUISITION_FAILURES: u32 = 10;

// Message focus
pub const FOCUS_CONFIDENCE: f64 = 0.99;
pub const FOCUS_VERSION: u32 = 1;

