use dns_by_eye_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;

    info!(
        config_file = config_path.unwrap_or("default"),
        query_timeout_ms = config.tracer.query_timeout_ms,
        lifetime_ms = config.tracer.lifetime_ms,
        glue_resolvers = ?config.tracer.glue_resolvers,
        "Configuration loaded"
    );

    Ok(config)
}
