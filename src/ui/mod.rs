pub mod viewer;

use iced::{
    widget::{button, column, progress_bar, text, Space},
    Alignment, Element, Length,
};

use crate::domain::DownloadState;

pub use viewer::{ViewerMessage, ViewerView};

/// Idle/download screen state
#[derive(Default)]
pub struct IdleView {
    pub download: DownloadState,
    /// Last error shown to the user, kept until dismissed or the next attempt.
    pub notice: Option<String>,
}

#[derive(Debug, Clone)]
pub enum IdleMessage {
    ConnectPressed,
}

impl IdleView {
    /// The trigger is only clickable while no download is running.
    pub fn trigger_enabled(&self) -> bool {
        !self.download.is_active
    }

    pub fn trigger_label(&self) -> String {
        if self.download.is_active {
            format!("Connecting… {}%", self.download.percent())
        } else {
            "Connect".to_string()
        }
    }

    pub fn progress_label(&self) -> String {
        format!("Downloading… {}%", self.download.percent())
    }

    pub fn view(&self) -> Element<'_, IdleMessage> {
        let trigger = button(text(self.trigger_label()))
            .on_press_maybe(self.trigger_enabled().then_some(IdleMessage::ConnectPressed))
            .padding([10, 20]);

        let mut content = column![
            text("Database Integration").size(24),
            Space::new().height(Length::Fixed(16.0)),
            trigger,
        ]
        .align_x(Alignment::Center)
        .spacing(10);

        if let Some(notice) = &self.notice {
            content = content.push(text(notice).size(14));
        }

        if self.download.is_active {
            content = content
                .push(Space::new().height(Length::Fixed(12.0)))
                .push(progress_bar(0.0..=1.0, self.download.fraction_complete))
                .push(text(self.progress_label()).size(14));
        }

        column![
            Space::new().height(Length::Fill),
            content.padding([0, 24]),
            Space::new().height(Length::Fill),
        ]
        .width(Length::Fill)
        .align_x(Alignment::Center)
        .into()
    }
}
