use std::path::Path;

use iced::{Rectangle, Size, Task};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

use crate::domain::{PresenterState, RenderCapability, ViewerTarget};

/// Height of the viewer header; the rendering surface fills the space below it.
pub const HEADER_HEIGHT: f32 = 48.0;

/// Characters `encodeURIComponent` leaves untouched besides ASCII alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Picks what the viewer surface should load once a download has succeeded.
///
/// With `LocalFile` the downloaded path is handed over directly. Otherwise the
/// original remote URL is wrapped in a query to the hosted document viewer at
/// `proxy_base`, since the surface cannot render a local PDF itself.
pub fn select_viewer_target(
    capability: RenderCapability,
    source_url: &str,
    local_path: &Path,
    proxy_base: &str,
) -> ViewerTarget {
    match capability {
        RenderCapability::LocalFile => ViewerTarget {
            uri: local_path.to_string_lossy().into_owned(),
            is_remote_proxy: false,
        },
        RenderCapability::RemoteProxy => {
            let encoded = percent_encoding::utf8_percent_encode(source_url, URI_COMPONENT);
            ViewerTarget {
                uri: format!("{}?embedded=1&url={}", proxy_base, encoded),
                is_remote_proxy: true,
            }
        }
    }
}

/// Area of the window given to the rendering surface.
pub fn surface_bounds(window: Size) -> Rectangle {
    Rectangle {
        x: 0.0,
        y: HEADER_HEIGHT,
        width: window.width.max(0.0),
        height: (window.height - HEADER_HEIGHT).max(0.0),
    }
}

#[derive(Debug, Clone, Error)]
#[error("Surface failed to load {uri}: {reason}")]
pub struct SurfaceError {
    pub uri: String,
    pub reason: String,
}

/// What a rendering surface is asked to load, plus the access flags needed
/// for local files on surfaces that block them by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSource {
    pub uri: String,
    pub allow_file_access: bool,
    pub allow_universal_access_from_file_urls: bool,
    pub origin_allowlist: Vec<String>,
}

impl SurfaceSource {
    pub fn for_target(target: &ViewerTarget) -> Self {
        Self {
            uri: target.uri.clone(),
            allow_file_access: true,
            allow_universal_access_from_file_urls: true,
            origin_allowlist: vec!["*".to_string()],
        }
    }

    pub fn is_remote(&self) -> bool {
        self.uri.starts_with("http://") || self.uri.starts_with("https://")
    }

    /// URL handed to the surface. Local paths become `file://` URLs and are
    /// refused unless file access is enabled.
    pub fn load_url(&self) -> Result<String, SurfaceError> {
        if self.is_remote() {
            return Ok(self.uri.clone());
        }

        if !self.allow_file_access {
            return Err(self.error("local file access is disabled"));
        }

        url::Url::from_file_path(&self.uri)
            .map(|url| url.to_string())
            .map_err(|()| self.error("not an absolute file path"))
    }

    /// Whether the surface may navigate to `url`.
    ///
    /// `file:` URLs need file access. A page loaded from a local file may only
    /// reach other origins with universal access, and every non-file URL
    /// must match the origin allowlist (`*` matches anything).
    pub fn navigation_allowed(&self, url: &str) -> bool {
        if url.starts_with("file:") {
            return self.allow_file_access;
        }

        if !self.is_remote() && !self.allow_universal_access_from_file_urls {
            return false;
        }

        self.origin_allowlist
            .iter()
            .any(|origin| origin == "*" || url.starts_with(origin.as_str()))
    }

    fn error(&self, reason: &str) -> SurfaceError {
        SurfaceError {
            uri: self.uri.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Something that can show a document for the viewer screen.
///
/// `present` resolves once the surface reports the content as loaded.
pub trait RenderSurface: Send + Sync {
    fn present(&self, source: SurfaceSource) -> Task<Result<(), SurfaceError>>;

    fn resize(&self, _window: Size) -> Task<()> {
        Task::none()
    }

    fn dismiss(&self) -> Task<()> {
        Task::none()
    }
}

/// Hands the document to the operating system's default viewer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSurface;

impl SystemSurface {
    fn open(source: &SurfaceSource) -> Result<(), SurfaceError> {
        if !source.is_remote() {
            source.load_url()?;
        }

        open::that_detached(&source.uri).map_err(|e| source.error(&e.to_string()))
    }
}

impl RenderSurface for SystemSurface {
    fn present(&self, source: SurfaceSource) -> Task<Result<(), SurfaceError>> {
        Task::perform(
            async move {
                let uri = source.uri.clone();
                tokio::task::spawn_blocking(move || Self::open(&source))
                    .await
                    .map_err(|e| SurfaceError {
                        uri,
                        reason: e.to_string(),
                    })?
            },
            |result| result,
        )
    }
}

/// Viewer screen state. Lives only while the viewer is shown.
pub struct Presenter {
    id: u64,
    target: ViewerTarget,
    state: PresenterState,
}

impl Presenter {
    pub fn new(id: u64, target: ViewerTarget) -> Self {
        Self {
            id,
            target,
            state: PresenterState::Loading,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn target(&self) -> &ViewerTarget {
        &self.target
    }

    pub fn state(&self) -> PresenterState {
        self.state
    }

    /// Loads the target into `surface`; the task resolves with the load result.
    pub fn present(&self, surface: &dyn RenderSurface) -> Task<Result<(), SurfaceError>> {
        let source = SurfaceSource::for_target(&self.target);
        tracing::info!(
            id = self.id,
            uri = %source.uri,
            remote_proxy = self.target.is_remote_proxy,
            "Presenting document"
        );

        surface.present(source)
    }

    /// Applies a load signal. Signals from another presentation are ignored
    /// and a failed load stays in `Loading`.
    pub fn on_surface_loaded(&mut self, id: u64, result: Result<(), SurfaceError>) {
        if id != self.id {
            tracing::debug!(id, current = self.id, "Ignoring stale surface signal");
            return;
        }

        match result {
            Ok(()) => self.state = PresenterState::Loaded,
            Err(e) => tracing::warn!("{}", e),
        }
    }
}
