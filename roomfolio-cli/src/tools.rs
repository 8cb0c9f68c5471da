use std::path::PathBuf;

// ─── Tool Status ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    Found { version: String, path: PathBuf },
    NotFound,
}

/// Look a program up on PATH and ask it for its version.
pub async fn detect(program: &str) -> ToolStatus {
    let Ok(path) = which::which(program) else {
        return ToolStatus::NotFound;
    };
    let version = match tokio::process::Command::new(&path).arg("--version").output().await {
        Ok(out) => String::from_utf8_lossy(&out.stdout).trim().to_string(),
        Err(e) => {
            log::warn!("{} --version failed: {e}", path.display());
            String::new()
        }
    };
    ToolStatus::Found { version, path }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_detect_missing_program() {
        let status = detect("rfcli-definitely-not-installed-tool").await;
        assert_eq!(status, ToolStatus::NotFound);
    }
}
