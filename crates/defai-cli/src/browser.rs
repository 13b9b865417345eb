//! Opening URLs in the user's browser.

use std::process::{Command, Stdio};

use tracing::debug;

/// Platform opener and its leading arguments.
fn opener() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "windows") {
        ("cmd", &["/C", "start", ""])
    } else if cfg!(target_os = "macos") {
        ("open", &[])
    } else {
        ("xdg-open", &[])
    }
}

/// Hand `url` to the platform opener without waiting for it. Returns
/// whether the opener could be started.
pub fn open(url: &str) -> bool {
    let (program, args) = opener();
    match Command::new(program)
        .args(args)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_) => {
            debug!(%url, program, "browser opened");
            true
        }
        Err(e) => {
            debug!(%url, program, error = %e, "could not open browser");
            false
        }
    }
}
