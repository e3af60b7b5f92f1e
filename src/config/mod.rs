//! Configuration management.

mod settings;

pub use settings::{
    CorsSettings, DatabaseSettings, JwtSettings, ServerSettings, Settings, SnowflakeSettings,
    MIN_JWT_SECRET_LENGTH,
};
