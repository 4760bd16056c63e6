//! Network URL constants for the Tumblr API.

/// Default REST API host.
pub const DEFAULT_API_URL: &str = "https://api.tumblr.com";

/// OAuth 1.0a temporary credential endpoint.
pub const OAUTH_REQUEST_TOKEN_URL: &str = "https://www.tumblr.com/oauth/request_token";

/// OAuth 1.0a user authorization page.
pub const OAUTH_AUTHORIZE_URL: &str = "https://www.tumblr.com/oauth/authorize";

/// OAuth 1.0a token exchange endpoint.
pub const OAUTH_ACCESS_TOKEN_URL: &str = "https://www.tumblr.com/oauth/access_token";
