//! Optional system clipboard, chosen once at startup.

use std::env;
use std::io::{self, Write};
use std::process::{Command, Stdio};

/// Somewhere a winning entry name can be copied to.
pub trait Clipboard {
    /// Short description for status output.
    fn describe(&self) -> &str;

    /// Returns false for the disabled implementation.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Places `text` on the clipboard.
    fn copy(&self, text: &str) -> io::Result<()>;
}

/// Used when no clipboard tool is available or copying is turned off.
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn describe(&self) -> &str {
        "disabled"
    }

    fn is_enabled(&self) -> bool {
        false
    }

    fn copy(&self, _text: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Pipes text into a platform clipboard program.
pub struct CommandClipboard {
    program: &'static str,
    args: &'static [&'static str],
}

const CANDIDATES: [CommandClipboard; 5] = [
    CommandClipboard {
        program: "pbcopy",
        args: &[],
    },
    CommandClipboard {
        program: "wl-copy",
        args: &[],
    },
    CommandClipboard {
        program: "xclip",
        args: &["-selection", "clipboard"],
    },
    CommandClipboard {
        program: "xsel",
        args: &["--clipboard", "--input"],
    },
    CommandClipboard {
        program: "clip",
        args: &[],
    },
];

impl Clipboard for CommandClipboard {
    fn describe(&self) -> &str {
        self.program
    }

    fn copy(&self, text: &str) -> io::Result<()> {
        let mut child = Command::new(self.program)
            .args(self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }
        let status = child.wait()?;
        if !status.success() {
            return Err(io::Error::other(format!("{} exited with {status}", self.program)));
        }
        Ok(())
    }
}

fn on_path(program: &str) -> bool {
    let Some(paths) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&paths).any(|dir| {
        dir.join(program).is_file() || dir.join(format!("{program}.exe")).is_file()
    })
}

/// Picks the first clipboard program found on `PATH`, or [`NoClipboard`].
pub fn detect(enabled: bool) -> Box<dyn Clipboard> {
    if !enabled {
        return Box::new(NoClipboard);
    }
    for candidate in CANDIDATES {
        if on_path(candidate.program) {
            tracing::debug!(program = candidate.program, "clipboard tool found");
            return Box::new(candidate);
        }
    }
    Box::new(NoClipboard)
}
