mod check_config;
mod local;
mod run;

pub use check_config::run_check_config;
pub use local::{run_client_id, run_data, run_forward_url};
pub use run::run_shell;
