//! Embedded web view surface, attached as a child of the iced window.
//!
//! The web view is created on the window's thread through `window::run` and
//! kept there; it is not `Send`, so it never leaves that thread. Page-load
//! notifications travel back to the application over a channel.

use std::cell::RefCell;

use futures::channel::mpsc;
use futures::StreamExt;
use iced::{window, Size, Task};
use raw_window_handle::HasWindowHandle;
use wry::dpi::{LogicalPosition, LogicalSize};
use wry::{PageLoadEvent, Rect, WebView, WebViewBuilder};

use super::presenter::{
    surface_bounds, RenderSurface, SurfaceError, SurfaceSource, SystemSurface,
};

thread_local! {
    static ACTIVE: RefCell<Option<WebView>> = const { RefCell::new(None) };
}

/// Renders documents in a `wry` web view below the viewer header.
/// Falls back to the OS viewer when the web view cannot be created.
#[derive(Debug, Default)]
pub struct WebViewSurface {
    fallback: SystemSurface,
}

impl RenderSurface for WebViewSurface {
    fn present(&self, source: SurfaceSource) -> Task<Result<(), SurfaceError>> {
        let (loaded_tx, loaded_rx) = mpsc::unbounded::<()>();
        let mut loaded_rx = Some(loaded_rx);
        let fallback = self.fallback;
        let fallback_source = source.clone();

        window::oldest()
            .and_then(move |id| {
                let source = source.clone();
                let loaded_tx = loaded_tx.clone();
                window::size(id).then(move |size| {
                    let source = source.clone();
                    let loaded_tx = loaded_tx.clone();
                    window::run(id, move |window| attach(window, &source, size, loaded_tx))
                })
            })
            .then(move |attached| match attached {
                Ok(()) => match loaded_rx.take() {
                    Some(mut loaded) => {
                        let uri = fallback_source.uri.clone();
                        Task::perform(async move { loaded.next().await }, move |signal| {
                            signal.ok_or_else(|| SurfaceError {
                                uri: uri.clone(),
                                reason: "web view closed before loading".to_string(),
                            })
                        })
                    }
                    None => Task::none(),
                },
                Err(e) => {
                    tracing::warn!("Embedded viewer unavailable, using system viewer: {}", e);
                    fallback.present(fallback_source.clone())
                }
            })
    }

    fn resize(&self, window: Size) -> Task<()> {
        window::oldest().and_then(move |id| {
            window::run(id, move |_| {
                ACTIVE.with(|active| {
                    if let Some(webview) = active.borrow().as_ref() {
                        if let Err(e) = webview.set_bounds(to_wry_rect(window)) {
                            tracing::debug!("Failed to resize web view: {}", e);
                        }
                    }
                })
            })
        })
    }

    fn dismiss(&self) -> Task<()> {
        window::oldest().and_then(|id| {
            window::run(id, |_| {
                ACTIVE.with(|active| active.borrow_mut().take());
            })
        })
    }
}

fn attach<W: HasWindowHandle + ?Sized>(
    window: &W,
    source: &SurfaceSource,
    size: Size,
    loaded: mpsc::UnboundedSender<()>,
) -> Result<(), SurfaceError> {
    let url = source.load_url()?;
    let policy = source.clone();

    let webview = WebViewBuilder::new()
        .with_url(url)
        .with_bounds(to_wry_rect(size))
        .with_navigation_handler(move |next| {
            let allowed = policy.navigation_allowed(&next);
            if !allowed {
                tracing::warn!("Blocked navigation to {}", next);
            }
            allowed
        })
        .with_on_page_load_handler(move |event, _url| {
            if let PageLoadEvent::Finished = event {
                let _ = loaded.unbounded_send(());
            }
        })
        .build_as_child(&window)
        .map_err(|e| SurfaceError {
            uri: source.uri.clone(),
            reason: e.to_string(),
        })?;

    // Replacing drops any web view left over from an earlier presentation.
    ACTIVE.with(|active| *active.borrow_mut() = Some(webview));
    Ok(())
}

fn to_wry_rect(window: Size) -> Rect {
    let bounds = surface_bounds(window);
    Rect {
        position: LogicalPosition::new(bounds.x, bounds.y).into(),
        size: LogicalSize::new(bounds.width, bounds.height).into(),
    }
}
