use std::{io, path::PathBuf};

use thiserror::Error;

use crate::bundler::BundlerError;

#[derive(Debug, Error)]
pub enum DevServerError {
    #[error("No free port between {start} and {end}")]
    NoFreePort { start: u16, end: u16 },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {}: {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("File watcher failed: {0}")]
    Watch(#[from] notify::Error),

    #[error("Preview server failed: {0}")]
    Server(#[source] io::Error),

    #[error(transparent)]
    Bundler(#[from] BundlerError),
}

impl DevServerError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NoFreePort { start, .. } => vec![
                format!("Free port {start} or pick another: defai-element dev --port <port>"),
            ],
            Self::Bind { .. } => vec!["Try another host: defai-element dev --host 127.0.0.1".into()],
            Self::Manifest { .. } => vec!["Run: defai-element validate".into()],
            Self::Watch(_) => vec![
                "Raise the inotify watch limit (fs.inotify.max_user_watches) on Linux".into(),
            ],
            Self::Server(_) => vec!["Re-run with -v for details".into()],
            Self::Bundler(e) => e.suggestions(),
        }
    }
}
