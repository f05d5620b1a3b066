// Command-line surface. Exactly one operation runs per invocation:
// - `--get-nft <id>` (or `--command get --get-nft <id>`) looks up an NFT.
// - `--command inspect` posts the upload without paying and shows the challenge.
// - Otherwise (`--command upload` or nothing) pays for and performs the upload.

use crate::api::{UploadRequest, DEFAULT_CONTENT_TYPE};
use crate::error::ClientError;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Upload images to the nftitem API, paying per call over x402.
#[derive(Debug, Parser)]
#[command(name = "nftitem-upload")]
#[command(version, about = "Upload images to the nftitem API, paying per call over x402")]
pub struct Cli {
    /// Path to image file (overrides built-in green square)
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Path to .env file to load before anything else runs
    #[arg(long, value_name = "PATH")]
    pub env: Option<PathBuf>,

    /// GET /nfts/{id}: fetch NFT URL by token ID (e.g. 93)
    #[arg(long = "get-nft", value_name = "TOKEN_ID", allow_hyphen_values = true)]
    pub get_nft: Option<String>,

    /// Command to run
    #[arg(long = "command", visible_alias = "cmd", value_enum)]
    pub command: Option<Command>,

    /// Content type sent with the upload
    #[arg(long, value_name = "MIME", default_value = DEFAULT_CONTENT_TYPE)]
    pub content_type: String,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Command {
    /// Pay and upload
    Upload,
    /// Alias for --get-nft
    Get,
    /// Raw 402 response without payment
    Inspect,
}

/// The operation selected by the flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    GetNft(String),
    Inspect,
    Upload,
}

impl Cli {
    /// Resolve the flags into one action. `--get-nft` wins over any
    /// `--command`; `--command get` without it is an error.
    pub fn action(&self) -> Result<Action, ClientError> {
        match (&self.get_nft, self.command) {
            (None, Some(Command::Get)) => Err(ClientError::MissingTokenId),
            (Some(id), _) => Ok(Action::GetNft(id.clone())),
            (None, Some(Command::Inspect)) => Ok(Action::Inspect),
            (None, Some(Command::Upload) | None) => Ok(Action::Upload),
        }
    }

    /// Content for upload and inspect: the file if given, else the
    /// built-in square.
    pub async fn upload_request(&self) -> Result<UploadRequest, ClientError> {
        let upload = match &self.file {
            Some(path) => UploadRequest::from_file(path).await?,
            None => UploadRequest::green_square(),
        };
        Ok(upload.with_content_type(self.content_type.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GREEN_SQUARE_PNG_BASE64;
    use std::io::Write;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["nftitem-upload"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("should parse")
    }

    #[test]
    fn default_is_upload() {
        assert_eq!(parse(&[]).action().unwrap(), Action::Upload);
        assert_eq!(parse(&["--command", "upload"]).action().unwrap(), Action::Upload);
    }

    #[test]
    fn cmd_alias() {
        assert_eq!(parse(&["--cmd", "inspect"]).action().unwrap(), Action::Inspect);
    }

    #[test]
    fn get_nft_wins_over_command() {
        assert_eq!(
            parse(&["--get-nft", "93"]).action().unwrap(),
            Action::GetNft("93".into())
        );
        assert_eq!(
            parse(&["--command", "get", "--get-nft", "93"]).action().unwrap(),
            Action::GetNft("93".into())
        );
        assert_eq!(
            parse(&["--command", "inspect", "--get-nft", "7"]).action().unwrap(),
            Action::GetNft("7".into())
        );
    }

    #[test]
    fn get_requires_token_id() {
        let err = parse(&["--command", "get"]).action().unwrap_err();
        assert!(matches!(err, ClientError::MissingTokenId));
    }

    #[test]
    fn negative_token_reaches_validation() {
        assert_eq!(
            parse(&["--get-nft", "-1"]).action().unwrap(),
            Action::GetNft("-1".into())
        );
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["nftitem-upload", "--command", "delete"]).is_err());
    }

    #[tokio::test]
    async fn upload_request_defaults_to_green_square() {
        let upload = parse(&[]).upload_request().await.unwrap();
        assert_eq!(upload.content, GREEN_SQUARE_PNG_BASE64);
        assert_eq!(upload.content_type, "image/png");
    }

    #[tokio::test]
    async fn upload_request_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let upload = parse(&["--file", &path, "--content-type", "image/jpeg"])
            .upload_request()
            .await
            .unwrap();
        assert_eq!(upload.content, "aGVsbG8=");
        assert_eq!(upload.content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let err = parse(&["--file", "/no/such/image.png"])
            .upload_request()
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ReadFile { .. }));
    }
}
