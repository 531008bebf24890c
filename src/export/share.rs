//! Result sharing
//!
//! A native share target is used when one is available. Without one the share
//! URL goes to the clipboard. Neither path ever fails the caller: every
//! outcome, including cancellation, is reported as a [`ShareOutcome`].

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;
use std::io::Write;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_SHARE_TITLE: &str = "The Last Immersion: Brain Type Diagnosis (C.O.D.E)";
pub const DEFAULT_SHARE_URL: &str = "http://localhost:5173/";
pub const CLIPBOARD_NOTICE: &str = "Link copied to clipboard!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl SharePayload {
    pub fn new(display_name: &str, profile_name: &str, url: impl Into<String>) -> Self {
        Self {
            title: DEFAULT_SHARE_TITLE.to_string(),
            text: format!(
                "{display_name}'s brain type is '{profile_name}'! Discover Jim Kwik's brain optimization strategies."
            ),
            url: url.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("Share was cancelled")]
    Cancelled,

    #[error("Share target unavailable")]
    Unavailable,

    #[error("Share I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A platform share sheet
pub trait NativeShare {
    fn is_available(&self) -> bool;
    fn share(&mut self, payload: &SharePayload) -> Result<(), ShareError>;
}

pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<(), ShareError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Cancelled,
    Copied,
    Failed(String),
}

impl ShareOutcome {
    /// Message to show the user, if any
    pub fn notice(&self) -> Option<String> {
        match self {
            ShareOutcome::Shared | ShareOutcome::Cancelled => None,
            ShareOutcome::Copied => Some(CLIPBOARD_NOTICE.to_string()),
            ShareOutcome::Failed(reason) => Some(format!("Could not share: {reason}")),
        }
    }
}

/// Share via `native` when available, otherwise copy the URL to `clipboard`
pub fn share(
    native: Option<&mut dyn NativeShare>,
    clipboard: &mut dyn Clipboard,
    payload: &SharePayload,
) -> ShareOutcome {
    if let Some(native) = native.filter(|n| n.is_available()) {
        return match native.share(payload) {
            Ok(()) => ShareOutcome::Shared,
            Err(ShareError::Cancelled) => {
                debug!("Native share cancelled");
                ShareOutcome::Cancelled
            }
            Err(e) => {
                warn!("Native share failed: {}", e);
                ShareOutcome::Failed(e.to_string())
            }
        };
    }

    match clipboard.copy(&payload.url) {
        Ok(()) => ShareOutcome::Copied,
        Err(e) => {
            warn!("Clipboard copy failed: {}", e);
            ShareOutcome::Failed(e.to_string())
        }
    }
}

/// Terminal clipboard through the OSC 52 escape sequence
pub struct Osc52Clipboard<W: Write> {
    out: W,
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Clipboard for Osc52Clipboard<W> {
    fn copy(&mut self, text: &str) -> Result<(), ShareError> {
        write!(self.out, "\x1b]52;c;{}\x07", STANDARD.encode(text))?;
        self.out.flush()?;
        Ok(())
    }
}

/// "Native" share for a terminal: print the payload
pub struct PrintShare<W: Write> {
    out: W,
}

impl<W: Write> PrintShare<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> NativeShare for PrintShare<W> {
    fn is_available(&self) -> bool {
        true
    }

    fn share(&mut self, payload: &SharePayload) -> Result<(), ShareError> {
        writeln!(self.out, "{}", payload.title)?;
        writeln!(self.out, "{}", payload.text)?;
        writeln!(self.out, "{}", payload.url)?;
        self.out.flush()?;
        Ok(())
    }
}
