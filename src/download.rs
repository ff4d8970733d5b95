use std::{env, path::Path};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("download of {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Fetch the model into `model_path` unless it is already there.
pub async fn ensure_model_file(model_path: &Path, model_url: &str) -> Result<(), DownloadError> {
    if model_path.exists() {
        return Ok(());
    }
    download_file(model_url, model_path).await
}

async fn download_file(url: &str, path: &Path) -> Result<(), DownloadError> {
    info!("Downloading {} from {}", path.display(), url);

    let mut header_map = HeaderMap::new();

    if let Ok(token) = env::var("GITHUB_TOKEN") {
        if let Ok(auth_value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
            header_map.insert(AUTHORIZATION, auth_value);
        }
    }
    header_map.insert(ACCEPT, HeaderValue::from_static("application/octet-stream"));

    let request_error = |source| DownloadError::Request {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .headers(header_map)
        .send()
        .await
        .map_err(request_error)?;

    if !response.status().is_success() {
        return Err(DownloadError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let bytes = response.bytes().await.map_err(request_error)?;

    let write_error = |source| DownloadError::Write {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
    }
    tokio::fs::write(path, &bytes).await.map_err(write_error)?;

    info!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
