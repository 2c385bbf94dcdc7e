//! Start-up checks for external tools.
//!
//! The server still starts when a check fails; searches will fail until the
//! tool is installed.

use crate::error::{Result, TubeblogError};
use std::process::Command;

/// Tools the channel search shells out to.
pub const REQUIRED_TOOLS: &[&str] = &["yt-dlp"];

/// Check every required tool, returning the failures.
pub fn check_all() -> Vec<TubeblogError> {
    REQUIRED_TOOLS
        .iter()
        .filter_map(|tool| check_tool(tool).err())
        .collect()
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(TubeblogError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TubeblogError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(TubeblogError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool() {
        let err = check_tool("tubeblog-definitely-not-installed").unwrap_err();
        assert!(matches!(err, TubeblogError::ToolNotFound(_)));
    }
}
