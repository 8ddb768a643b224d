use axum_helpers::JwtConfig;
use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_optional, server::ServerConfig};
use database::mongodb::MongoConfig;

pub use core_config::Environment;

/// Where product images are uploaded.
///
/// - `IMAGE_UPLOAD_URL`: upload endpoint; uploads are skipped when unset
/// - `IMAGE_UPLOAD_TOKEN`: optional bearer token for that endpoint
#[derive(Clone, Debug, Default)]
pub struct ImageStoreConfig {
    pub upload_url: Option<String>,
    pub token: Option<String>,
}

impl FromEnv for ImageStoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let upload_url = env_optional("IMAGE_UPLOAD_URL");
        if let Some(url) = upload_url
            .as_deref()
            .filter(|url| !(url.starts_with("http://") || url.starts_with("https://")))
        {
            return Err(ConfigError::ParseError {
                key: "IMAGE_UPLOAD_URL".to_string(),
                details: format!("expected an http(s) URL, got '{url}'"),
            });
        }

        Ok(Self {
            upload_url,
            token: env_optional("IMAGE_UPLOAD_TOKEN"),
        })
    }
}

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub images: ImageStoreConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let app = app_info!();
        let mongodb = MongoConfig::from_env()?.with_app_name(app.name);

        Ok(Self {
            app,
            mongodb,
            server: ServerConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            images: ImageStoreConfig::from_env()?,
            environment: Environment::from_env(),
        })
    }
}
