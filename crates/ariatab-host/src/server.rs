//! Static file server for the page under test
//!
//! Serves a directory on a loopback port for the lifetime of the value.
//! Dropping the server stops it; `shutdown` does the same and waits.

use axum::Router;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use url::Url;

use crate::Result;

pub struct StaticServer {
    addr: SocketAddr,
    root: PathBuf,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StaticServer {
    /// Bind `addr` (port 0 picks a free port) and start serving `root`
    pub async fn start(root: impl Into<PathBuf>, addr: SocketAddr) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("not a directory: {}", root.display()),
            )
            .into());
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;

        let app = Router::new().fallback_service(ServeDir::new(&root));
        let (tx, rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = rx.await;
                })
                .await;
            if let Err(e) = result {
                tracing::warn!(error = %e, "Static server stopped with error");
            }
        });

        tracing::info!(addr = %addr, root = %root.display(), "Static server listening");

        Ok(Self {
            addr,
            root,
            shutdown: Mutex::new(Some(tx)),
            task: Mutex::new(Some(task)),
        })
    }

    /// Serve `root` on an ephemeral loopback port
    pub async fn start_local(root: impl Into<PathBuf>) -> Result<Self> {
        Self::start(root, SocketAddr::from(([127, 0, 0, 1], 0))).await
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!("http://{}/", self.addr))?)
    }

    /// URL of a file relative to the served root
    pub fn url_for(&self, path: &str) -> Result<Url> {
        Ok(self.base_url()?.join(path.trim_start_matches('/'))?)
    }

    /// Stop accepting connections and wait for the server task
    pub async fn shutdown(&self) {
        if let Some(tx) = self.shutdown.lock().take() {
            let _ = tx.send(());
        }
        let task = self.task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
        tracing::info!(addr = %self.addr, "Static server stopped");
    }
}

impl Drop for StaticServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.lock().take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}
