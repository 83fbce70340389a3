pub mod fetcher;
pub mod presenter;
#[cfg(any(target_os = "macos", target_os = "windows"))]
pub mod webview;

use std::sync::Arc;

pub use fetcher::{FetchEvent, Fetcher};
pub use presenter::{select_viewer_target, Presenter, RenderSurface, SurfaceError};

/// Embedded web view where the platform supports one, the OS viewer elsewhere.
pub fn default_surface() -> Arc<dyn RenderSurface> {
    #[cfg(any(target_os = "macos", target_os = "windows"))]
    {
        Arc::new(webview::WebViewSurface::default())
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        Arc::new(presenter::SystemSurface)
    }
}
