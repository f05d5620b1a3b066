// UI layer: runs the selected action against the API client and prints the
// outcome. Results go to stdout, errors and the spinner to stderr.

use crate::api::{ApiClient, OperationResult, UploadRequest};
use crate::cli::Action;
use crate::error::ClientError;
use crate::payment::PaymentClientFactory;
use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::future::Future;
use std::io::IsTerminal;
use std::time::Duration;

/// Run one action to completion. Non-success statuses on upload and get
/// become errors; inspect always succeeds once a response arrives.
pub async fn run<P: PaymentClientFactory>(
    api: &ApiClient<P>,
    action: Action,
    upload: impl Future<Output = Result<UploadRequest, ClientError>>,
) -> Result<(), ClientError> {
    match action {
        Action::GetNft(token_id) => {
            let result = api.get_nft_url(&token_id).await?;
            println!("GET /nfts/{} status: {}", token_id.trim(), result.status);
            println!("data: {}", pretty(&result.data));
            let result = result.error_for_status("GET nft")?;
            println!("{} - url: {}", ok_label(), result.url().unwrap_or("(none)"));
        }
        Action::Inspect => {
            let upload = upload.await?;
            let result = api.inspect_upload(&upload).await?;
            println!("status: {}", result.status);
            println!("headers: {}", pretty(&result.headers));
            println!("data: {}", pretty(&result.data));
        }
        Action::Upload => {
            let upload = upload.await?;
            // Prepare first so the URL line is printed before the spinner draws.
            let paid = api.prepare_upload(&upload)?;
            let result = with_spinner("Uploading...", paid.send()).await?;
            print_status(&result);
            result.error_for_status("Upload")?;
            println!("{}", ok_label());
        }
    }
    Ok(())
}

fn print_status(result: &OperationResult) {
    println!("status: {}", result.status);
    println!("data: {}", pretty(&result.data));
}

/// Show a spinner on stderr while `fut` runs. Hidden when stderr is not a
/// terminal.
pub async fn with_spinner<F: Future>(message: &str, fut: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let out = fut.await;
    spinner.finish_and_clear();
    out
}

/// Print a failure to stderr. A server payload carried by the error is shown
/// instead of the bare message.
pub fn report_error(err: &anyhow::Error) {
    let data = err
        .downcast_ref::<ClientError>()
        .and_then(ClientError::response_data);
    let text = match data {
        Some(data) => pretty(data),
        None => error_text(err),
    };
    if std::io::stderr().is_terminal() {
        eprintln!("{}", text.red());
    } else {
        eprintln!("{text}");
    }
}

/// The cause chain joined with ": ". Wrappers that repeat their inner
/// error's message (dotenvy over io) contribute it once.
pub fn error_text(err: &anyhow::Error) -> String {
    let mut parts: Vec<String> = Vec::new();
    for cause in err.chain() {
        let message = cause.to_string();
        if parts.last() != Some(&message) {
            parts.push(message);
        }
    }
    parts.join(": ")
}

fn ok_label() -> String {
    if std::io::stdout().is_terminal() {
        "OK".green().to_string()
    } else {
        "OK".to_string()
    }
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pretty_prints_two_space_json() {
        assert_eq!(pretty(&json!({"a": 1})), "{\n  \"a\": 1\n}");
        assert_eq!(pretty(&None::<u8>), "null");
    }

    #[test]
    fn error_text_lists_each_cause_once() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory");
        let err = anyhow::Error::new(ClientError::ReadFile {
            path: "/no/such.png".into(),
            source: io,
        });
        assert_eq!(error_text(&err), "failed to read /no/such.png: No such file or directory");
    }

    #[test]
    fn error_text_collapses_repeated_messages() {
        let err = anyhow::Error::new(ClientError::EnvFile {
            path: "/no/such/.env".into(),
            source: dotenvy::Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
        });
        assert_eq!(error_text(&err), "failed to load env file /no/such/.env: gone");
    }

    #[tokio::test]
    async fn spinner_passes_output_through() {
        assert_eq!(with_spinner("working", async { 41 + 1 }).await, 42);
    }
}
