//! Streaming PDF downloads with date-stamped file metadata.
//!
//! Each canonical document is materialized at most once: the deterministic
//! filename doubles as the resume state, so a file that already exists is
//! skipped and the filesystem itself carries deduplication across runs.
//! Transfers run strictly one at a time; a failed transfer is logged and the
//! run moves on to the next document.

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use std::fs::{FileTimes, OpenOptions};
use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, instrument};

use crate::models::CanonicalDocument;
use crate::utils::ensure_writable_dir;

/// What happened to one document.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Downloaded,
    Skipped,
}

/// Tallies for the end-of-run summary.
#[derive(Debug, Default)]
pub struct DownloadStats {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Materialize every canonical document, sequentially and best-effort.
///
/// The destination directory is created here, lazily, right before the first
/// transfer. Per-document failures are logged with the filename and do not
/// abort the remaining documents.
pub async fn materialize_all(
    client: &reqwest::Client,
    documents: Vec<CanonicalDocument>,
    dest_dir: &Path,
) -> Result<DownloadStats, Box<dyn Error>> {
    ensure_writable_dir(dest_dir).await?;

    let mut stats = DownloadStats::default();
    for doc in &documents {
        match materialize(client, doc, dest_dir).await {
            Ok(Outcome::Downloaded) => stats.downloaded += 1,
            Ok(Outcome::Skipped) => stats.skipped += 1,
            Err(e) => {
                stats.failed += 1;
                error!(file = %doc.file_name(), error = %e, "Download failed; continuing");
            }
        }
    }
    Ok(stats)
}

/// Download one document to its deterministic filename and stamp the file's
/// timestamps with the edition date. A no-op if the file already exists.
#[instrument(level = "info", skip_all, fields(file = %doc.file_name()))]
pub async fn materialize(
    client: &reqwest::Client,
    doc: &CanonicalDocument,
    dest_dir: &Path,
) -> Result<Outcome, Box<dyn Error>> {
    let path = dest_dir.join(doc.file_name());
    if fs::try_exists(&path).await? {
        info!("Already present; skipping");
        return Ok(Outcome::Skipped);
    }

    let response = client
        .get(doc.link.clone())
        .send()
        .await?
        .error_for_status()?;
    let bar = byte_bar(response.content_length(), &doc.file_name());

    // A truncated file would satisfy the exists-check on the next run, so a
    // failed transfer must not leave one behind.
    let written = match stream_to_file(response, &path, &bar).await {
        Ok(n) => n,
        Err(e) => {
            bar.finish_and_clear();
            let _ = fs::remove_file(&path).await;
            return Err(e);
        }
    };
    bar.finish_and_clear();

    stamp_times(&path, doc)?;
    info!(bytes = written, "Downloaded");
    Ok(Outcome::Downloaded)
}

async fn stream_to_file(
    response: reqwest::Response,
    path: &Path,
    bar: &ProgressBar,
) -> Result<u64, Box<dyn Error>> {
    let mut file = fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
        bar.set_position(written);
    }
    file.flush().await?;
    Ok(written)
}

/// Byte-progress bar for one transfer; a spinner when the server declares no
/// length, hidden entirely off-TTY.
fn byte_bar(total: Option<u64>, name: &str) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = match total {
        Some(len) => {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{prefix:<32.dim} {bar:30.green/dim} {percent:>3}% {binary_bytes:>9}/{binary_total_bytes:9}",
                    )
                    .expect("invalid template")
                    .progress_chars("--"),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{prefix:<32.dim} {spinner} {binary_bytes:>9}")
                    .expect("invalid template"),
            );
            pb.enable_steady_tick(Duration::from_millis(120));
            pb
        }
    };
    pb.set_prefix(name.to_string());
    pb
}

/// Set the file's modification and access times to the document key. On
/// macOS the creation time is additionally set through the external `SetFile`
/// tool; that step is allowed to fail.
fn stamp_times(path: &Path, doc: &CanonicalDocument) -> Result<(), Box<dyn Error>> {
    let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(u64::try_from(doc.key)?);
    let times = FileTimes::new().set_accessed(stamp).set_modified(stamp);
    OpenOptions::new().write(true).open(path)?.set_times(times)?;
    set_creation_time(path, doc);
    Ok(())
}

/// `SetFile` ships with the Xcode command-line tools; its absence, or any
/// failure, leaves only the creation time unstamped.
#[cfg(target_os = "macos")]
fn set_creation_time(path: &Path, doc: &CanonicalDocument) {
    use std::process::Command;
    let stamp = doc.date.format("%m/%d/%Y 00:00:00").to_string();
    let _ = Command::new("SetFile").arg("-d").arg(stamp).arg(path).status();
}

#[cfg(not(target_os = "macos"))]
fn set_creation_time(_path: &Path, _doc: &CanonicalDocument) {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use url::Url;

    fn doc(y: i32, m: u32, d: u32, link: &str) -> CanonicalDocument {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        CanonicalDocument {
            label: "Weekly Current Affairs".to_string(),
            link: Url::parse(link).unwrap(),
            date,
            key: date.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp(),
        }
    }

    #[tokio::test]
    async fn test_existing_file_is_skipped_without_transfer() {
        let tmp = tempfile::tempdir().unwrap();
        // Port 9 is unreachable; a skip must never touch the network.
        let doc = doc(2024, 11, 3, "http://127.0.0.1:9/weekly.pdf");
        std::fs::write(tmp.path().join(doc.file_name()), b"%PDF-1.4").unwrap();

        let client = reqwest::Client::new();
        let outcome = materialize(&client, &doc, tmp.path()).await.unwrap();
        assert_eq!(outcome, Outcome::Skipped);
    }

    #[tokio::test]
    async fn test_failed_transfer_is_counted_and_leaves_no_file() {
        let tmp = tempfile::tempdir().unwrap();
        let bad = doc(2024, 11, 3, "http://127.0.0.1:1/weekly.pdf");
        let present = doc(2024, 11, 10, "http://127.0.0.1:1/next.pdf");
        std::fs::write(tmp.path().join(present.file_name()), b"%PDF-1.4").unwrap();
        let bad_name = bad.file_name();

        let client = reqwest::Client::new();
        let stats = materialize_all(&client, vec![bad, present], tmp.path())
            .await
            .unwrap();

        assert_eq!(stats.failed, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.downloaded, 0);
        assert!(!tmp.path().join(bad_name).exists());
    }

    #[tokio::test]
    async fn test_materialize_all_creates_destination_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("Weekly Current Affairs");

        let client = reqwest::Client::new();
        let stats = materialize_all(&client, Vec::new(), &dest).await.unwrap();
        assert!(dest.is_dir());
        assert_eq!(stats.downloaded + stats.skipped + stats.failed, 0);
    }

    #[test]
    fn test_stamp_times_sets_mtime_to_key() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = doc(2024, 11, 3, "http://127.0.0.1:9/weekly.pdf");
        let path = tmp.path().join(doc.file_name());
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        stamp_times(&path, &doc).unwrap();

        let mtime = std::fs::metadata(&path).unwrap().modified().unwrap();
        let expected = SystemTime::UNIX_EPOCH + Duration::from_secs(doc.key as u64);
        assert_eq!(mtime, expected);
    }
}
