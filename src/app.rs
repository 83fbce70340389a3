use std::sync::Arc;

use futures::StreamExt;
use iced::{window, Subscription, Task};

use crate::application::{
    default_surface, select_viewer_target, FetchEvent, Fetcher, Presenter, RenderSurface,
    SurfaceError,
};
use crate::domain::{AppConfig, AppError, FetchOutcome, RenderCapability};
use crate::ui::{IdleMessage, IdleView, ViewerMessage, ViewerView};

pub struct DocumentApp {
    config: AppConfig,
    capability: RenderCapability,
    fetcher: Fetcher,
    surface: Arc<dyn RenderSurface>,
    idle: IdleView,
    screen: Screen,
    next_presentation: u64,
}

enum Screen {
    Idle,
    Viewer(Presenter),
}

impl Default for DocumentApp {
    fn default() -> Self {
        Self::new(
            AppConfig::default(),
            RenderCapability::detect(),
            default_surface(),
        )
    }
}

impl DocumentApp {
    pub fn new(
        config: AppConfig,
        capability: RenderCapability,
        surface: Arc<dyn RenderSurface>,
    ) -> Self {
        tracing::info!(?capability, source = %config.source_url, "Starting document viewer");

        Self {
            config,
            capability,
            fetcher: Fetcher::default(),
            surface,
            idle: IdleView::default(),
            screen: Screen::Idle,
            next_presentation: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Idle(IdleMessage),
    Viewer(ViewerMessage),
    Fetch(FetchEvent),
    /// Load signal from the rendering surface, tagged with its presentation id
    SurfaceLoaded(u64, Result<(), SurfaceError>),
    WindowResized(iced::Size),
    NotificationDismissed,
}

pub fn update(app: &mut DocumentApp, message: Message) -> Task<Message> {
    match message {
        Message::Idle(IdleMessage::ConnectPressed) => {
            if app.idle.download.is_active || !matches!(app.screen, Screen::Idle) {
                return Task::none();
            }

            app.idle.download.start();
            app.idle.notice = None;

            let destination = app.config.destination();
            tracing::info!(
                "Downloading {} to {}",
                app.config.source_url,
                destination.display()
            );

            // iced drives the stream on its tokio executor
            return Task::stream(
                app.fetcher
                    .fetch_stream(app.config.source_url.clone(), destination)
                    .map(Message::Fetch),
            );
        }
        Message::Fetch(FetchEvent::Progress(progress)) => {
            app.idle.download.advance(progress);
        }
        Message::Fetch(FetchEvent::Completed(outcome)) => {
            app.idle.download.reset();
            return show_viewer(app, outcome);
        }
        Message::Fetch(FetchEvent::Failed(err)) => {
            app.idle.download.reset();
            return fail(app, err);
        }
        Message::SurfaceLoaded(id, result) => {
            if let Screen::Viewer(presenter) = &mut app.screen {
                presenter.on_surface_loaded(id, result);
            }
        }
        Message::WindowResized(size) => {
            if let Screen::Viewer(_) = app.screen {
                return app.surface.resize(size).discard();
            }
        }
        Message::Viewer(ViewerMessage::BackPressed) => {
            if let Screen::Viewer(presenter) = &app.screen {
                tracing::debug!(id = presenter.id(), "Leaving viewer");
            }
            app.screen = Screen::Idle;
            return app.surface.dismiss().discard();
        }
        Message::NotificationDismissed => {
            app.idle.notice = None;
        }
    }
    Task::none()
}

fn show_viewer(app: &mut DocumentApp, outcome: FetchOutcome) -> Task<Message> {
    if outcome.status_code != 200 {
        return fail(app, AppError::Transfer(format!("HTTP {}", outcome.status_code)));
    }

    tracing::info!("Download finished: {}", outcome.final_path.display());

    let target = select_viewer_target(
        app.capability,
        &app.config.source_url,
        &outcome.final_path,
        &app.config.proxy_viewer_base,
    );
    app.next_presentation += 1;
    let id = app.next_presentation;
    let presenter = Presenter::new(id, target);
    let task = presenter.present(app.surface.as_ref());
    app.screen = Screen::Viewer(presenter);

    task.map(move |result| Message::SurfaceLoaded(id, result))
}

fn fail(app: &mut DocumentApp, err: AppError) -> Task<Message> {
    tracing::error!("Download failed: {}", err);

    let message = err.user_message();
    app.idle.notice = Some(message.clone());

    Task::perform(
        async move {
            rfd::AsyncMessageDialog::new()
                .set_level(rfd::MessageLevel::Error)
                .set_title("Error")
                .set_description(message)
                .set_buttons(rfd::MessageButtons::Ok)
                .show()
                .await
        },
        |_| Message::NotificationDismissed,
    )
}

pub fn subscription(_app: &DocumentApp) -> Subscription<Message> {
    window::resize_events().map(|(_id, size)| Message::WindowResized(size))
}

pub fn view(app: &DocumentApp) -> iced::Element<'_, Message> {
    match &app.screen {
        Screen::Idle => app.idle.view().map(Message::Idle),
        Screen::Viewer(presenter) => ViewerView::view(presenter).map(Message::Viewer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::presenter::SurfaceSource;
    use crate::domain::PresenterState;
    use crate::domain::{TransferProgress, ViewerTarget};
    use std::path::PathBuf;

    struct NoopSurface;

    impl RenderSurface for NoopSurface {
        fn present(&self, _source: SurfaceSource) -> Task<Result<(), SurfaceError>> {
            Task::done(Ok(()))
        }
    }

    fn app_with(capability: RenderCapability) -> DocumentApp {
        let config = AppConfig {
            download_dir: PathBuf::from("/tmp/pdf-fetch-viewer-test/downloads"),
            ..AppConfig::default()
        };
        DocumentApp::new(config, capability, Arc::new(NoopSurface))
    }

    fn completed(app: &DocumentApp) -> Message {
        Message::Fetch(FetchEvent::Completed(FetchOutcome {
            final_path: app.config.destination(),
            status_code: 200,
        }))
    }

    fn viewer_target(app: &DocumentApp) -> Option<&ViewerTarget> {
        match &app.screen {
            Screen::Viewer(presenter) => Some(presenter.target()),
            Screen::Idle => None,
        }
    }

    #[test]
    fn test_trigger_disabled_only_while_active() {
        let mut app = app_with(RenderCapability::LocalFile);
        assert!(app.idle.trigger_enabled());

        let _ = update(&mut app, Message::Idle(IdleMessage::ConnectPressed));
        assert!(app.idle.download.is_active);
        assert!(!app.idle.trigger_enabled());

        let _ = update(
            &mut app,
            Message::Fetch(FetchEvent::Failed(AppError::Io("disk".into()))),
        );
        assert!(app.idle.trigger_enabled());
    }

    #[test]
    fn test_progress_shows_percent() {
        let mut app = app_with(RenderCapability::LocalFile);
        let _ = update(&mut app, Message::Idle(IdleMessage::ConnectPressed));
        let _ = update(
            &mut app,
            Message::Fetch(FetchEvent::Progress(TransferProgress::new(50, 200))),
        );

        assert_eq!(app.idle.download.percent(), 25);
        assert_eq!(app.idle.progress_label(), "Downloading… 25%");
    }

    #[test]
    fn test_success_on_local_capable_platform() {
        let mut app = app_with(RenderCapability::LocalFile);
        let _ = update(&mut app, Message::Idle(IdleMessage::ConnectPressed));
        let msg = completed(&app);
        let _ = update(&mut app, msg);

        let target = viewer_target(&app).unwrap();
        assert_eq!(target.uri, app.config.destination().to_string_lossy());
        assert!(!target.is_remote_proxy);
        assert!(!app.idle.download.is_active);
        assert!(app.idle.notice.is_none());
    }

    #[test]
    fn test_success_on_proxy_platform() {
        let mut app = app_with(RenderCapability::RemoteProxy);
        let _ = update(&mut app, Message::Idle(IdleMessage::ConnectPressed));
        let msg = completed(&app);
        let _ = update(&mut app, msg);

        let target = viewer_target(&app).unwrap();
        assert_eq!(
            target.uri,
            "https://drive.google.com/viewer?embedded=1&url=https%3A%2F%2Fstorage.googleapis.com%2F10th_science%2FAram.pdf"
        );
        assert!(target.is_remote_proxy);
    }

    #[test]
    fn test_404_restores_idle_with_notice() {
        let mut app = app_with(RenderCapability::LocalFile);
        let _ = update(&mut app, Message::Idle(IdleMessage::ConnectPressed));
        let _ = update(
            &mut app,
            Message::Fetch(FetchEvent::Progress(TransferProgress::new(10, 20))),
        );
        let _ = update(
            &mut app,
            Message::Fetch(FetchEvent::Failed(AppError::Transfer("HTTP 404".into()))),
        );

        assert!(viewer_target(&app).is_none());
        assert_eq!(app.idle.notice.as_deref(), Some("HTTP 404"));
        assert!(!app.idle.download.is_active);
        assert_eq!(app.idle.download.fraction_complete, 0.0);

        let _ = update(&mut app, Message::NotificationDismissed);
        assert!(app.idle.notice.is_none());
    }

    #[test]
    fn test_non_200_outcome_never_shows_viewer() {
        let mut app = app_with(RenderCapability::LocalFile);
        let _ = update(&mut app, Message::Idle(IdleMessage::ConnectPressed));
        let outcome = FetchOutcome {
            final_path: app.config.destination(),
            status_code: 204,
        };
        let _ = update(&mut app, Message::Fetch(FetchEvent::Completed(outcome)));

        assert!(viewer_target(&app).is_none());
        assert_eq!(app.idle.notice.as_deref(), Some("HTTP 204"));
    }

    #[test]
    fn test_back_returns_to_idle_and_refetches() {
        let mut app = app_with(RenderCapability::LocalFile);
        let _ = update(&mut app, Message::Idle(IdleMessage::ConnectPressed));
        let msg = completed(&app);
        let _ = update(&mut app, msg);
        let _ = update(&mut app, Message::SurfaceLoaded(1, Ok(())));
        match &app.screen {
            Screen::Viewer(presenter) => assert_eq!(presenter.state(), PresenterState::Loaded),
            Screen::Idle => panic!("viewer should be shown"),
        }

        let _ = update(&mut app, Message::Viewer(ViewerMessage::BackPressed));
        assert!(viewer_target(&app).is_none());
        assert!(app.idle.trigger_enabled());

        let _ = update(&mut app, Message::Idle(IdleMessage::ConnectPressed));
        assert!(app.idle.download.is_active);
        assert_eq!(app.idle.download.fraction_complete, 0.0);
        assert!(viewer_target(&app).is_none());
    }

    #[test]
    fn test_press_while_active_is_ignored() {
        let mut app = app_with(RenderCapability::LocalFile);
        let _ = update(&mut app, Message::Idle(IdleMessage::ConnectPressed));
        let _ = update(
            &mut app,
            Message::Fetch(FetchEvent::Progress(TransferProgress::new(50, 100))),
        );
        let _ = update(&mut app, Message::Idle(IdleMessage::ConnectPressed));

        assert_eq!(app.idle.download.percent(), 50);
    }

    #[test]
    fn test_late_signal_from_previous_viewer_is_ignored() {
        let mut app = app_with(RenderCapability::LocalFile);
        let _ = update(&mut app, Message::Idle(IdleMessage::ConnectPressed));
        let msg = completed(&app);
        let _ = update(&mut app, msg);
        let _ = update(&mut app, Message::Viewer(ViewerMessage::BackPressed));

        let _ = update(&mut app, Message::Idle(IdleMessage::ConnectPressed));
        let msg = completed(&app);
        let _ = update(&mut app, msg);

        // Signal for the first presentation arrives after the second one started.
        let _ = update(&mut app, Message::SurfaceLoaded(1, Ok(())));
        match &app.screen {
            Screen::Viewer(presenter) => {
                assert_eq!(presenter.id(), 2);
                assert_eq!(presenter.state(), PresenterState::Loading);
            }
            Screen::Idle => panic!("viewer should be shown"),
        }

        let _ = update(&mut app, Message::SurfaceLoaded(2, Ok(())));
        match &app.screen {
            Screen::Viewer(presenter) => assert_eq!(presenter.state(), PresenterState::Loaded),
            Screen::Idle => panic!("viewer should be shown"),
        }
    }
}
