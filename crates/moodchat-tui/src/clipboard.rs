use std::io::{self, Write};
use std::process::{Command, Stdio};

/// Clipboard helpers tried in order; the first one installed wins
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// Feed `text` to `program` on stdin; true only if the write and the exit both succeed
fn pipe_to(program: &str, args: &[&str], text: &str) -> io::Result<bool> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    // Dropping stdin closes the pipe so the helper can finish
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Ok(()),
    };
    let status = child.wait()?;
    written?;

    Ok(status.success())
}

pub fn copy_to_clipboard(text: &str) -> bool {
    for (program, args) in CLIPBOARD_COMMANDS {
        match pipe_to(program, args, text) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => {
                tracing::warn!(program, "Clipboard copy failed: {}", e);
                return false;
            }
            Ok(copied) => {
                tracing::debug!(program, copied, "Clipboard copy");
                return copied;
            }
        }
    }

    tracing::warn!("No clipboard command available");
    false
}
