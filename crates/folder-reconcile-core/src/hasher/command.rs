use super::HashProvider;
use crate::error::{Error, HashFailure};
use crate::model::ContentDigest;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::trace;

/// External digest utilities the command backend knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTool {
    Sha256sum,
    Shasum,
    Certutil,
    SevenZip,
}

impl CommandTool {
    pub fn program(&self) -> &'static str {
        match self {
            CommandTool::Sha256sum => "sha256sum",
            CommandTool::Shasum => "shasum",
            CommandTool::Certutil => "certutil",
            CommandTool::SevenZip => "7z",
        }
    }

    fn command(&self, exe: &Path, file: &Path) -> Command {
        let mut cmd = Command::new(exe);
        match self {
            CommandTool::Sha256sum => {
                cmd.arg(file);
            }
            CommandTool::Shasum => {
                cmd.args(["-a", "256"]).arg(file);
            }
            CommandTool::Certutil => {
                cmd.arg("-hashfile").arg(file).arg("SHA256");
            }
            CommandTool::SevenZip => {
                cmd.args(["h", "-scrcSHA256"]).arg(file);
            }
        }
        cmd
    }

    /// Extracts the digest from the tool's standard output.
    pub fn parse_output(&self, stdout: &str) -> Option<ContentDigest> {
        match self {
            CommandTool::Sha256sum | CommandTool::Shasum => {
                // GNU coreutils prefixes the line with '\' when the file name needed escaping
                let token = stdout.split_whitespace().next()?;
                ContentDigest::parse(token.trim_start_matches('\\'))
            }
            CommandTool::Certutil => {
                // Line 1: "SHA256 hash of <file>:", line 2: hex, possibly space separated
                let line = stdout.lines().filter(|l| !l.trim().is_empty()).nth(1)?;
                let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
                ContentDigest::parse(&compact)
            }
            CommandTool::SevenZip => stdout
                .split_whitespace()
                .find_map(ContentDigest::parse),
        }
    }
}

/// Runs one external process per file.
pub struct CommandHasher {
    tool: CommandTool,
    exe: PathBuf,
    label: String,
}

impl CommandHasher {
    pub fn new(tool: CommandTool, exe: PathBuf) -> Self {
        Self {
            tool,
            label: format!("command:{}", tool.program()),
            exe,
        }
    }

    /// Finds the tool's executable on `PATH`.
    pub fn locate(tool: CommandTool) -> Result<Self, Error> {
        let exe = which::which(tool.program()).map_err(|e| {
            Error::BackendUnavailable(format!("'{}' not found: {}", tool.program(), e))
        })?;
        Ok(Self::new(tool, exe))
    }

    pub fn tool(&self) -> CommandTool {
        self.tool
    }
}

impl HashProvider for CommandHasher {
    fn digest(&self, path: &Path) -> Result<ContentDigest, HashFailure> {
        let output = self
            .tool
            .command(&self.exe, path)
            .output()
            .map_err(|e| HashFailure::new(path, format!("failed to run {}: {}", self.exe.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HashFailure::new(
                path,
                format!("{} exited with {}: {}", self.tool.program(), output.status, stderr.trim()),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        trace!("{} output for {}: {}", self.tool.program(), path.display(), stdout.trim());
        self.tool.parse_output(&stdout).ok_or_else(|| {
            HashFailure::new(
                path,
                format!("no SHA-256 digest in {} output", self.tool.program()),
            )
        })
    }

    fn name(&self) -> &str {
        &self.label
    }
}
