use crate::hasher::CommandTool;

/// Standard digest utilities for the host, in order of preference.
#[cfg(target_os = "windows")]
pub fn system_hash_tools() -> &'static [CommandTool] {
    &[CommandTool::Certutil]
}

#[cfg(not(target_os = "windows"))]
pub fn system_hash_tools() -> &'static [CommandTool] {
    // macOS ships shasum but not always sha256sum
    &[CommandTool::Sha256sum, CommandTool::Shasum]
}
