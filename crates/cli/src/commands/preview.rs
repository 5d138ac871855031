use anyhow::{Context, Result};
use areakit_generator::{BuildOptions, generate_site};
use areakit_geo::Geo;
use axum::{
    Router,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use std::fs;
use std::path::{Path, PathBuf};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::{RwLock, broadcast};
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::site;

#[derive(Clone)]
struct AppState {
    geo: Arc<RwLock<Geo>>,
    reload_tx: broadcast::Sender<()>,
}

/// Build the site into `out` and return the lookup layer the server redirects with
fn rebuild(path: &Path, out: &Path) -> Result<Geo> {
    let (config, data) = site::load(path)?;
    let options = BuildOptions {
        preview: true,
        lastmod: None,
    };
    let generated = generate_site(&config, &data, &options).context("Failed to generate site")?;

    if out.exists() {
        fs::remove_dir_all(out).context("Failed to clear preview output")?;
    }
    fs::create_dir_all(out)?;
    generated.write_to(out)?;

    tracing::info!(pages = generated.pages.len(), "preview rebuilt");
    Ok(Geo::new(&config, &data))
}

/// Start preview server with hot reload for local development.
///
/// The site is built into a temporary directory and served from there.
/// Legacy and alias URLs get the same 301s production would send, and any
/// change under the site directory rebuilds and reloads open pages.
pub async fn run(path: PathBuf, port: u16) -> Result<()> {
    println!("🧹 Starting preview server...");
    println!("   Site: {}", path.display());

    let tmp = tempfile::TempDir::new().context("Failed to create preview directory")?;
    let out = tmp.path().join("site");
    let geo = rebuild(&path, &out)?;

    println!("   ✓ Services: {}", geo.services().len());
    println!("   ✓ Clusters: {}", geo.index().all_clusters().len());
    println!("   ✓ Suburbs: {}", geo.index().known_suburbs().len());

    let (reload_tx, _) = broadcast::channel::<()>(100);

    let state = AppState {
        geo: Arc::new(RwLock::new(geo)),
        reload_tx: reload_tx.clone(),
    };

    let app = Router::new()
        .route("/_reload", get(sse_handler))
        .fallback_service(ServeDir::new(&out))
        .layer(middleware::from_fn_with_state(state.clone(), redirect_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let watcher_path = path.clone();
    tokio::spawn(async move {
        if let Err(e) = watch_files(watcher_path, out, state).await {
            eprintln!("File watcher error: {}", e);
        }
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("\n🚀 Preview ready at: http://localhost:{}", port);
    println!("   Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to port")?;

    axum::serve(listener, app).await.context("Server error")?;

    drop(tmp);
    Ok(())
}

/// Send the 301 production would send; internal `/_` routes are left alone
async fn redirect_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let uri = request.uri();
    let redirect = if uri.path().starts_with("/_") {
        None
    } else {
        state
            .geo
            .read()
            .await
            .redirector()
            .resolve(uri.path(), uri.query())
    };

    match redirect {
        Some(redirect) => {
            let status =
                StatusCode::from_u16(redirect.status).unwrap_or(StatusCode::MOVED_PERMANENTLY);
            (status, [(header::LOCATION, redirect.location)]).into_response()
        }
        None => next.run(request).await,
    }
}

/// Watch for file changes, rebuild, and trigger reload
async fn watch_files(path: PathBuf, out: PathBuf, state: AppState) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher =
        notify::recommended_watcher(move |res: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        })?;

    watcher.watch(&path, RecursiveMode::Recursive)?;

    while let Some(event) = rx.recv().await {
        let relevant = matches!(
            event.kind,
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
        ) && event.paths.iter().any(|p| {
            let filename = p.file_name().unwrap_or_default().to_string_lossy();
            !filename.starts_with('.') && !filename.ends_with('~')
        });
        if !relevant {
            continue;
        }

        // editors emit bursts of events per save
        while rx.try_recv().is_ok() {}

        println!("   📝 File changed, rebuilding...");
        match rebuild(&path, &out) {
            Ok(geo) => {
                *state.geo.write().await = geo;
                let _ = state.reload_tx.send(());
            }
            Err(e) => eprintln!("   ✗ Rebuild failed: {:#}", e),
        }
    }

    Ok(())
}

/// SSE endpoint for hot reload
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let mut rx = state.reload_tx.subscribe();

    let stream = async_stream::stream! {
        loop {
            if rx.recv().await.is_ok() {
                yield Ok(Event::default().data("reload"));
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
