use crate::cli::DataCommands;
use crate::output::UserOutput;
use caller_shell::Shell;
use serde_json::Value;

pub async fn run_client_id(shell: &Shell, out: &dyn UserOutput) -> anyhow::Result<()> {
    let local = shell.open_store().await?;
    out.response(&local.load_client_id().await);
    local.store().close().await?;
    Ok(())
}

pub async fn run_forward_url(shell: &Shell, url: Option<&str>, out: &dyn UserOutput) -> anyhow::Result<()> {
    let local = shell.open_store().await?;
    let response = match url {
        Some(url) => local.save_forward_url(url).await,
        None => local.load_forward_url().await,
    };
    out.response(&response);
    local.store().close().await?;
    Ok(())
}

pub async fn run_data(shell: &Shell, cmd: &DataCommands, out: &dyn UserOutput) -> anyhow::Result<()> {
    let local = shell.open_store().await?;
    let response = match cmd {
        DataCommands::Get { id } => local.load_localdata(id).await,
        DataCommands::Set {
            id,
            value,
            entry_type,
        } => {
            local
                .save_localdata(id, entry_type, parse_value(value))
                .await
        }
        DataCommands::Delete { id } => local.delete_localdata(id).await,
        DataCommands::List => local.get_localdata_list().await,
    };
    out.response(&response);
    local.store().close().await?;
    Ok(())
}

/// JSON when it parses, otherwise the raw text as a string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_value_accepts_json_and_plain_text() {
        assert_eq!(parse_value(r#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("hello"), json!("hello"));
    }
}
