use anyhow::Result;
use url::Url;

use crate::FetchTagError;

/// Validate a link and return the parsed URL
pub fn validate_url(url: &str) -> std::result::Result<Url, FetchTagError> {
    let parsed = Url::parse(url).map_err(|_| FetchTagError::InvalidLink(url.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FetchTagError::InvalidLink(format!(
            "{} (link must use HTTP or HTTPS)",
            url
        )));
    }

    if parsed.host_str().is_none() {
        return Err(FetchTagError::InvalidLink(url.to_string()));
    }

    Ok(parsed)
}

/// Format file size in human-readable format
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let unit_index = (bytes_f.log10() / THRESHOLD.log10()).floor() as usize;
    let unit_index = unit_index.min(UNITS.len() - 1);

    let size = bytes_f / THRESHOLD.powi(unit_index as i32);

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Size of a file on disk, if it can be read
pub fn file_size(path: &std::path::Path) -> Result<u64> {
    Ok(fs_err::metadata(path)?.len())
}

/// Check if the current environment has the external tools a fetch needs
pub async fn check_dependencies(yt_dlp_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(yt_dlp_path, "--version").await {
        missing.push(format!("{} - required for downloading audio", yt_dlp_path));
    }

    // yt-dlp hands transcoding to ffmpeg
    if !check_command_available("ffmpeg", "-version").await {
        missing.push("ffmpeg - required for converting audio to m4a".to_string());
    }

    missing
}

/// Check if a command is available in PATH
pub async fn check_command_available(command: &str, version_flag: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg(version_flag)
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
