use crate::output::UserOutput;
use caller_shell::config::Config;
use std::path::Path;

pub fn run_check_config(config: &Config, config_path: &Path, out: &dyn UserOutput) -> anyhow::Result<()> {
    if config_path.exists() {
        out.status(&format!("Configuration loaded from {}", config_path.display()));
    } else {
        out.warning(&format!(
            "No configuration file at {}, using defaults",
            config_path.display()
        ));
    }

    let stop_timeout = config.process.stop_timeout()?;
    out.status(&format!("Caller executable: {}", config.process.exe_path.display()));
    out.status(&format!("Caller arguments:  {:?}", config.process.render_args()));
    out.status(&format!(
        "Start retries:     {} (delay {:?}), stop timeout {:?}",
        config.process.start_retry,
        config.process.retry_delay(),
        stop_timeout
    ));
    out.status(&format!("Storage prefix:    {}", config.storage.path.display()));
    out.status("");
    out.status(&serde_yaml::to_string(config)?);
    Ok(())
}
