use crate::error::CliError;
use tokio::io::{self, AsyncRead, AsyncWriteExt};

/// Opens `path` for reading, `-` meaning stdin.
pub async fn open_input(path: &str) -> Result<Box<dyn AsyncRead + Send + Unpin>, CliError> {
    if path == "-" {
        return Ok(Box::new(io::stdin()));
    }
    let file = tokio::fs::File::open(path).await?;
    Ok(Box::new(file))
}

/// Writes `payload` to `path`, or to stdout when no path is given.
pub async fn write_payload(payload: &[u8], path: Option<&str>) -> Result<(), CliError> {
    match path {
        Some(path) => tokio::fs::write(path, payload).await?,
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(payload).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
