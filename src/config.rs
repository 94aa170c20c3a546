use thiserror::Error;

pub const BUCKET_NAME: &str = "BUCKET_NAME";
pub const SENDGRID_API_KEY: &str = "SENDGRID_API_KEY";
pub const FROM_EMAIL: &str = "FROM_EMAIL";
pub const TO_EMAIL: &str = "TO_EMAIL";
pub const STORAGE_ACCESS_TOKEN: &str = "STORAGE_ACCESS_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket_name: String,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_key: String,
    pub from_email: String,
    pub to_email: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    pub mail: MailConfig,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            bucket_name: require(&lookup, BUCKET_NAME)?,
            access_token: lookup(STORAGE_ACCESS_TOKEN),
        })
    }
}

impl MailConfig {
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api_key: require(&lookup, SENDGRID_API_KEY)?,
            from_email: require(&lookup, FROM_EMAIL)?,
            to_email: require(&lookup, TO_EMAIL)?,
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            storage: StorageConfig::from_lookup(&lookup)?,
            mail: MailConfig::from_lookup(&lookup)?,
        })
    }
}

fn require<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).ok_or(ConfigError::MissingVar(name))
}
