use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Coordinates stamped on events created without a map pick.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DefaultLocation {
    pub lat: f64,
    pub lng: f64,
}

impl Default for DefaultLocation {
    fn default() -> Self {
        // San Francisco
        Self {
            lat: 37.7749,
            lng: -122.4194,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub default_location: DefaultLocation,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "playhard".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "playhard-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24 * 14),
        };
        let fallback = DefaultLocation::default();
        let default_location = DefaultLocation {
            lat: env_parse("DEFAULT_EVENT_LAT").unwrap_or(fallback.lat),
            lng: env_parse("DEFAULT_EVENT_LNG").unwrap_or(fallback.lng),
        };
        Ok(Self {
            database_url,
            jwt,
            default_location,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
