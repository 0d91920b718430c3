/*!
 * Clipboard support for ctxdump
 *
 * Provides functionality for copying output to the system clipboard and
 * reading it back for the edit monitor, with automatic detection of the
 * available clipboard mechanisms.
 */

use std::env;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use thiserror::Error;
use tracing::debug;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// The command is not available on the system
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// Failed to execute the command
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// No suitable clipboard mechanism was found
    #[error("No suitable clipboard mechanism found")]
    NoClipboardFound,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Text access to a clipboard
pub trait ClipboardBridge {
    /// Read the current clipboard text
    fn get_text(&self) -> Result<String>;

    /// Replace the clipboard text
    fn set_text(&self, text: &str) -> Result<()>;
}

/// Available clipboard providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardProvider {
    /// tmux clipboard
    Tmux,
    /// X11 clipboard with xclip
    Xclip,
    /// X11 clipboard with xsel
    Xsel,
    /// Wayland clipboard
    Wayland,
    /// macOS clipboard
    MacOS,
    /// Windows clipboard (via WSL)
    Wsl,
    /// Termux clipboard
    Termux,
}

impl ClipboardProvider {
    /// Command and arguments that write stdin to the clipboard
    fn copy_command(&self) -> (&'static str, Vec<&'static str>) {
        match self {
            Self::Tmux => ("tmux", vec!["load-buffer", "-w", "-"]),
            Self::Xclip => ("xclip", vec!["-selection", "clipboard", "-in"]),
            Self::Xsel => ("xsel", vec!["-b", "-i"]),
            Self::Wayland => ("wl-copy", vec![]),
            Self::MacOS => ("pbcopy", vec![]),
            Self::Wsl => ("clip.exe", vec![]),
            Self::Termux => ("termux-clipboard-set", vec![]),
        }
    }

    /// Command and arguments that print the clipboard to stdout
    fn paste_command(&self) -> (&'static str, Vec<&'static str>) {
        match self {
            Self::Tmux => ("tmux", vec!["show-buffer"]),
            Self::Xclip => ("xclip", vec!["-selection", "clipboard", "-out"]),
            Self::Xsel => ("xsel", vec!["-b", "-o"]),
            Self::Wayland => ("wl-paste", vec!["--no-newline"]),
            Self::MacOS => ("pbpaste", vec![]),
            Self::Wsl => (
                "powershell.exe",
                vec!["-NoProfile", "-Command", "Get-Clipboard"],
            ),
            Self::Termux => ("termux-clipboard-get", vec![]),
        }
    }
}

impl ClipboardBridge for ClipboardProvider {
    fn get_text(&self) -> Result<String> {
        let (cmd, args) = self.paste_command();
        let text = execute_paste_command(cmd, &args)?;

        // Get-Clipboard speaks CRLF and appends a line break
        if let Self::Wsl = self {
            let text = text.replace("\r\n", "\n");
            return Ok(text.strip_suffix('\n').unwrap_or(&text).to_string());
        }
        Ok(text)
    }

    fn set_text(&self, text: &str) -> Result<()> {
        let (cmd, args) = self.copy_command();
        execute_clipboard_command(cmd, &args, text)
    }
}

/// The system clipboard, bound to the first provider found on this host
#[derive(Debug, Clone, Copy)]
pub struct SystemClipboard {
    provider: ClipboardProvider,
}

impl SystemClipboard {
    /// Detect the clipboard mechanism for this host
    pub fn detect() -> Result<Self> {
        let provider = determine_clipboard_providers()
            .into_iter()
            .next()
            .ok_or(ClipboardError::NoClipboardFound)?;
        debug!("using clipboard provider {:?}", provider);
        Ok(Self { provider })
    }

    /// Use an explicit provider
    pub fn with_provider(provider: ClipboardProvider) -> Self {
        Self { provider }
    }

    /// The provider in use
    pub fn provider(&self) -> ClipboardProvider {
        self.provider
    }
}

impl ClipboardBridge for SystemClipboard {
    fn get_text(&self) -> Result<String> {
        self.provider.get_text()
    }

    fn set_text(&self, text: &str) -> Result<()> {
        self.provider.set_text(text)
    }
}

//--------------------------------------------------------------------
// Public API
//--------------------------------------------------------------------

/// Copy text to the clipboard
///
/// Automatically detects the most appropriate clipboard mechanism
/// and uses it to copy text to the system clipboard.
///
/// # Examples
/// ```no_run
/// use ctxdump::clipboard::copy_to_clipboard;
///
/// if let Err(e) = copy_to_clipboard("Hello, clipboard!") {
///     eprintln!("Failed to copy to clipboard: {}", e);
/// }
/// ```
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    SystemClipboard::detect()?.set_text(text)
}

/// Read text from the clipboard
pub fn read_clipboard() -> Result<String> {
    SystemClipboard::detect()?.get_text()
}

/// Check if a command exists on the system
///
/// # Arguments
/// * `command` - The command to check
///
/// # Returns
/// * `true` - If the command exists and can be executed
/// * `false` - Otherwise
pub fn command_exists(command: &str) -> bool {
    if let Some(paths) = env::var_os("PATH") {
        if env::split_paths(&paths).any(|dir| dir.join(command).exists()) {
            return true;
        }
    }

    // Try to run the command with '--version' flag as fallback
    Command::new(command)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

//--------------------------------------------------------------------
// Internal Implementation
//--------------------------------------------------------------------

/// Execute a command to copy text to clipboard
fn execute_clipboard_command(cmd: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|_| ClipboardError::CommandNotFound(cmd.to_string()))?;

    let stdin = child.stdin.as_mut().ok_or_else(|| {
        ClipboardError::CommandFailed(format!("Failed to open stdin for {}", cmd))
    })?;

    stdin
        .write_all(text.as_bytes())
        .map_err(|_| ClipboardError::CommandFailed(format!("Failed to write to {}", cmd)))?;

    let status = child
        .wait()
        .map_err(|_| ClipboardError::CommandFailed(format!("Failed to wait for {}", cmd)))?;

    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::CommandFailed(format!(
            "{} exited with status: {}",
            cmd, status
        )))
    }
}

/// Execute a command that prints the clipboard and capture its output
fn execute_paste_command(cmd: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|_| ClipboardError::CommandNotFound(cmd.to_string()))?;

    if !output.status.success() {
        return Err(ClipboardError::CommandFailed(format!(
            "{} exited with status: {}",
            cmd, output.status
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Platform detection cache (using thread-safe lazy initialization)
static PLATFORM: OnceLock<&'static str> = OnceLock::new();

/// Determine the platform (cached)
fn get_platform() -> &'static str {
    PLATFORM.get_or_init(|| {
        if cfg!(target_os = "macos") {
            "macos"
        } else if cfg!(target_os = "windows") {
            "windows"
        } else if cfg!(target_os = "linux") {
            if env::var("WSL_DISTRO_NAME").is_ok() {
                "wsl"
            } else {
                "linux"
            }
        } else if cfg!(target_os = "android") {
            "android"
        } else {
            "unknown"
        }
    })
}

/// Determine which clipboard providers to try based on platform and preference
fn determine_clipboard_providers() -> Vec<ClipboardProvider> {
    let mut providers = Vec::with_capacity(3);

    // Always try tmux first if available and running (user preference)
    if command_exists("tmux") && is_tmux_running() {
        providers.push(ClipboardProvider::Tmux);
    }

    match get_platform() {
        "macos" => {
            if command_exists("pbcopy") {
                providers.push(ClipboardProvider::MacOS);
            }
        }
        "windows" | "wsl" => {
            if command_exists("clip.exe") {
                providers.push(ClipboardProvider::Wsl);
            }
        }
        "linux" => {
            // Wayland only when a compositor is actually running
            if env::var_os("WAYLAND_DISPLAY").is_some() && command_exists("wl-copy") {
                providers.push(ClipboardProvider::Wayland);
            }

            if command_exists("xsel") {
                providers.push(ClipboardProvider::Xsel);
            }

            if command_exists("xclip") {
                providers.push(ClipboardProvider::Xclip);
            }
        }
        "android" => {
            if command_exists("termux-clipboard-set") {
                providers.push(ClipboardProvider::Termux);
            }
        }
        _ => {}
    }

    providers
}

/// Check if tmux is running and available for clipboard operations
fn is_tmux_running() -> bool {
    // Inside a tmux session
    if env::var("TMUX").is_ok() {
        return true;
    }

    let status = Command::new("tmux")
        .args(["list-buffers"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    status.map(|s| s.success()).unwrap_or(false)
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_command_exists() {
        // These commands should exist on most systems
        assert!(command_exists("ls"));
        assert!(command_exists("echo"));

        // This command should not exist
        assert!(!command_exists("nonexistentcommandxyz"));
    }

    #[test]
    fn test_get_platform() {
        let platform = get_platform();

        assert!(matches!(
            platform,
            "macos" | "windows" | "wsl" | "linux" | "android" | "unknown"
        ));

        // Cached
        assert_eq!(platform, get_platform());
    }

    #[test]
    fn test_every_provider_can_read_and_write() {
        for provider in [
            ClipboardProvider::Tmux,
            ClipboardProvider::Xclip,
            ClipboardProvider::Xsel,
            ClipboardProvider::Wayland,
            ClipboardProvider::MacOS,
            ClipboardProvider::Wsl,
            ClipboardProvider::Termux,
        ] {
            assert!(!provider.copy_command().0.is_empty());
            assert!(!provider.paste_command().0.is_empty());
        }
    }

    #[test]
    fn test_missing_command_is_reported() {
        let err = execute_paste_command("nonexistentcommandxyz", &[]).unwrap_err();
        assert!(matches!(err, ClipboardError::CommandNotFound(_)));
    }

    #[test]
    #[ignore] // This test requires tmux to be installed and running
    fn test_tmux_clipboard() {
        if !command_exists("tmux") || env::var("TMUX").is_err() {
            return;
        }

        let clipboard = ClipboardProvider::Tmux;
        let test_text = "Test text for tmux clipboard";

        clipboard
            .set_text(test_text)
            .expect("Failed to copy to tmux clipboard");
        let clipboard_content = clipboard
            .get_text()
            .expect("Failed to read tmux clipboard");
        assert_eq!(clipboard_content.trim(), test_text);
    }
}
