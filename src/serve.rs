//! A development server for previewing the built site locally.

use axum::Router;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

/// Serves `directory` over HTTP on `127.0.0.1:{port}` until Ctrl+C is
/// pressed. Directory requests are answered with their `index.html`.
pub fn serve(directory: &Path, port: u16) -> io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(directory.to_owned(), port))
}

fn router(directory: PathBuf) -> Router {
    Router::new().fallback_service(ServeDir::new(directory))
}

async fn run(directory: PathBuf, port: u16) -> io::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    log::info!(
        "Serving {} at http://localhost:{}",
        directory.display(),
        listener.local_addr()?.port()
    );
    log::info!("Ctrl+C to stop");
    axum::serve(listener, router(directory))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("listening for Ctrl+C: {}", err);
        return;
    }
    log::info!("Stopped.");
}

#[cfg(test)]
mod test {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn get(addr: SocketAddr, path: &str) -> io::Result<String> {
        let mut stream = tokio::net::TcpStream::connect(addr).await?;
        stream
            .write_all(format!("GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n", path).as_bytes())
            .await?;
        let mut response = String::new();
        stream.read_to_string(&mut response).await?;
        Ok(response)
    }

    #[tokio::test]
    async fn test_serves_output_directory() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("index.html"), "<p>index</p>")?;
        std::fs::write(dir.path().join("post.html"), "<p>post</p>")?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = router(dir.path().to_owned());
        tokio::spawn(async move { axum::serve(listener, app).await });

        let root = get(addr, "/").await?;
        assert!(root.starts_with("HTTP/1.1 200"), "{}", root);
        assert!(root.ends_with("<p>index</p>"));

        let post = get(addr, "/post.html").await?;
        assert!(post.ends_with("<p>post</p>"));

        let missing = get(addr, "/missing.html").await?;
        assert!(missing.starts_with("HTTP/1.1 404"), "{}", missing);
        Ok(())
    }
}
