use caller_shell::Response;

/// Abstraction over user-facing output.
///
/// Command handlers use this trait instead of `println!`/`eprintln!` so tests
/// and quieter front ends can swap the sink.
pub trait UserOutput: Send + Sync {
    /// Informational status message (e.g., "Caller process running on port 21999")
    fn status(&self, message: &str);

    /// Warning message (e.g., "Caller process failed to start")
    fn warning(&self, message: &str);

    /// Error message
    fn error(&self, message: &str);

    /// A local data envelope, printed as JSON.
    fn response(&self, response: &Response);
}

/// Standard CLI output: stdout for results, stderr for diagnostics.
pub struct CliOutput;

impl UserOutput for CliOutput {
    fn status(&self, message: &str) {
        println!("{}", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("\x1b[31m{}\x1b[0m", message);
    }

    fn response(&self, response: &Response) {
        match serde_json::to_string_pretty(response) {
            Ok(json) => println!("{}", json),
            Err(e) => self.error(&format!("Failed to encode response: {}", e)),
        }
    }
}
