//! Clipboard access with graceful fallback

use crate::error::{InteractError, InteractResult};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, warn};

/// Destination for copied text
#[async_trait]
pub trait Clipboard: Send + Sync {
    fn name(&self) -> &str;

    async fn write_text(&self, text: &str) -> InteractResult<()>;
}

/// Result of [`copy_with_fallback`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    FellBack,
    Failed,
}

/// Copy through `primary`, falling back to `fallback` when it fails.
///
/// Errors are logged and never returned.
pub async fn copy_with_fallback(primary: &dyn Clipboard, fallback: Option<&dyn Clipboard>, text: &str) -> CopyOutcome {
    match primary.write_text(text).await {
        Ok(()) => {
            debug!("Copied {} bytes via {}", text.len(), primary.name());
            return CopyOutcome::Copied;
        }
        Err(e) => warn!("Clipboard {} failed: {}", primary.name(), e),
    }

    let Some(fallback) = fallback else {
        error!("Failed to copy text: no fallback clipboard");
        return CopyOutcome::Failed;
    };

    match fallback.write_text(text).await {
        Ok(()) => CopyOutcome::FellBack,
        Err(e) => {
            error!("Failed to copy text via {}: {}", fallback.name(), e);
            CopyOutcome::Failed
        }
    }
}

/// System clipboard driven by an external program reading stdin
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The usual clipboard utility for this platform
    pub fn system() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("pbcopy", Vec::<String>::new())
        } else if cfg!(target_os = "windows") {
            Self::new("clip", Vec::<String>::new())
        } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            Self::new("wl-copy", Vec::<String>::new())
        } else {
            Self::new("xclip", ["-selection", "clipboard"])
        }
    }
}

#[async_trait]
impl Clipboard for CommandClipboard {
    fn name(&self) -> &str {
        &self.program
    }

    async fn write_text(&self, text: &str) -> InteractResult<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| InteractError::ClipboardUnavailable(format!("{}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
        }

        let status = child.wait().await?;
        if status.success() {
            Ok(())
        } else {
            Err(InteractError::ClipboardUnavailable(format!("{} exited with {}", self.program, status)))
        }
    }
}

/// Writes the text to stdout for the user to copy by hand
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutClipboard;

#[async_trait]
impl Clipboard for StdoutClipboard {
    fn name(&self) -> &str {
        "stdout"
    }

    async fn write_text(&self, text: &str) -> InteractResult<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(text.as_bytes()).await?;
        if !text.ends_with('\n') {
            stdout.write_all(b"\n").await?;
        }
        stdout.flush().await?;
        Ok(())
    }
}

/// Process-local clipboard; can be made to fail for testing fallbacks
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    unavailable: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            contents: Mutex::new(None),
            unavailable: true,
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|contents| contents.clone())
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    fn name(&self) -> &str {
        "memory"
    }

    async fn write_text(&self, text: &str) -> InteractResult<()> {
        if self.unavailable {
            return Err(InteractError::ClipboardUnavailable("memory clipboard disabled".to_string()));
        }

        let mut contents = self
            .contents
            .lock()
            .map_err(|_| InteractError::ClipboardUnavailable("memory clipboard poisoned".to_string()))?;
        *contents = Some(text.to_string());
        Ok(())
    }
}
