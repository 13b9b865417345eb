//! One `dev` run: preview server, webpack dev server and file watcher.

use std::{future::Future, path::Path, process::ExitStatus};

use serde_json::Value;
use tokio::process::Child;
use tracing::{info, instrument, warn};

use defai_core::domain::MANIFEST_FILE;

use super::{
    DevServerError, PreviewServer, PreviewState, ProjectWatcher, WatchEvent, find_available_port,
};
use crate::bundler::{BundlerOptions, Webpack};

/// How a session ended.
#[derive(Debug)]
pub enum SessionEnd {
    /// The shutdown signal fired.
    Interrupted,
    /// The webpack dev server exited on its own.
    ServerExited(ExitStatus),
}

/// Addresses printed in the start-up banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevUrls {
    pub local: String,
    pub preview: String,
    pub api_docs: String,
}

impl DevUrls {
    fn new(host: &str, port: u16) -> Self {
        let local = format!("http://{host}:{port}");
        Self {
            preview: format!("{local}/preview"),
            api_docs: format!("{local}/api-docs"),
            local,
        }
    }
}

pub struct DevSession {
    pub requested_port: u16,
    pub port: u16,
    pub urls: DevUrls,
    pub manifest: Value,
    preview: PreviewServer,
    child: Child,
    watcher: ProjectWatcher,
}

impl DevSession {
    /// Start everything. `options.port` is where the search for a free port
    /// begins; the port actually used is [`DevSession::port`].
    #[instrument(skip_all, fields(dir = %options.project_dir.display()))]
    pub async fn start<F>(
        mut options: BundlerOptions,
        webpack: &Webpack,
        on_change: F,
    ) -> Result<Self, DevServerError>
    where
        F: Fn(WatchEvent) + Send + 'static,
    {
        options.project_dir = options
            .project_dir
            .canonicalize()
            .map_err(|e| DevServerError::Manifest {
                path: options.project_dir.clone(),
                reason: e.to_string(),
            })?;
        let manifest = read_manifest(&options.project_dir)?;

        let requested_port = options.port;
        let port = find_available_port(&options.host, requested_port).await?;
        if port != requested_port {
            warn!(requested_port, port, "requested port in use");
        }
        options.port = port;

        let state = PreviewState::new(manifest.clone(), port);
        let preview = PreviewServer::start(state.clone()).await?;
        options.preview_port = Some(preview.port());

        let child = match webpack.serve(&options) {
            Ok(child) => child,
            Err(e) => {
                preview.stop().await?;
                return Err(e.into());
            }
        };
        let watcher = ProjectWatcher::start(&options.project_dir, state, on_change)?;

        info!(port, preview_port = preview.port(), "dev session started");
        Ok(Self {
            requested_port,
            port,
            urls: DevUrls::new(&options.host, port),
            manifest,
            preview,
            child,
            watcher,
        })
    }

    /// Run until `shutdown` resolves or the dev server exits, then tear down
    /// in order: watcher, dev server, preview server.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<SessionEnd, DevServerError> {
        let end = tokio::select! {
            _ = shutdown => SessionEnd::Interrupted,
            status = self.child.wait() => match status {
                Ok(status) => SessionEnd::ServerExited(status),
                Err(e) => return Err(DevServerError::Server(e)),
            },
        };
        self.stop().await?;
        Ok(end)
    }

    pub async fn stop(mut self) -> Result<(), DevServerError> {
        self.watcher.close();
        if let Err(e) = self.child.kill().await {
            // Already exited.
            info!(error = %e, "dev server was not running");
        }
        self.preview.stop().await?;
        info!("dev session stopped");
        Ok(())
    }
}

/// Raw manifest of the project, for serving and for the banner.
pub fn read_manifest(project_dir: &Path) -> Result<Value, DevServerError> {
    let path = project_dir.join(MANIFEST_FILE);
    let raw = std::fs::read_to_string(&path).map_err(|e| DevServerError::Manifest {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| DevServerError::Manifest {
        path,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_urls_share_host_and_port() {
        let urls = DevUrls::new("localhost", 3002);
        assert_eq!(urls.local, "http://localhost:3002");
        assert_eq!(urls.preview, "http://localhost:3002/preview");
        assert_eq!(urls.api_docs, "http://localhost:3002/api-docs");
    }

    #[test]
    fn unreadable_manifest_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_manifest(dir.path()).unwrap_err();
        assert!(err.to_string().contains("manifest.json"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn session_stops_when_dev_server_exits() {
        use std::{fs, os::unix::fs::PermissionsExt};

        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/index.tsx"), "").unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), r#"{"name": "Demo"}"#).unwrap();
        let npx = dir.path().join("fake-npx");
        fs::write(&npx, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&npx, fs::Permissions::from_mode(0o755)).unwrap();

        let mut options = BundlerOptions::development(dir.path());
        options.host = "127.0.0.1".into();
        options.port = 0;
        let session = DevSession::start(
            options,
            &Webpack::with_program(npx.to_string_lossy()),
            |_| {},
        )
        .await
        .unwrap();
        assert_eq!(session.manifest["name"], "Demo");

        let end = session.run_until(std::future::pending()).await.unwrap();
        assert!(matches!(end, SessionEnd::ServerExited(status) if status.success()));
    }
}
