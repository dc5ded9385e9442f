use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Endpoint of the external analysis engine.
    pub endpoint_url: String,

    /// Request timeout for a single engine call, in seconds.
    pub timeout_secs: u64,

    /// Advisory completion estimate returned by the end-session call.
    pub estimated_completion_secs: u64,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "podium")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8000)?
            .set_default("database.path", "podium.db")?
            .set_default("analysis.endpoint_url", "http://localhost:9400/analyze")?
            .set_default("analysis.timeout_secs", 90)?
            .set_default("analysis.estimated_completion_secs", 120)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("PODIUM").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
