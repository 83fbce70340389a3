use iced::{
    widget::{button, column, container, row, text, Space},
    Alignment, Element, Length,
};

use crate::application::presenter::HEADER_HEIGHT;
use crate::application::Presenter;
use crate::domain::PresenterState;

#[derive(Debug, Clone)]
pub enum ViewerMessage {
    BackPressed,
}

pub struct ViewerView;

impl ViewerView {
    pub fn view(presenter: &Presenter) -> Element<'_, ViewerMessage> {
        let header = row![
            button("← Back")
                .on_press(ViewerMessage::BackPressed)
                .padding([6, 12]),
            Space::new().width(Length::Fill),
            text("PDF Viewer").size(16),
            Space::new().width(Length::Fill),
            Space::new().width(Length::Fixed(64.0)),
        ]
        .align_y(Alignment::Center)
        .height(Length::Fixed(HEADER_HEIGHT))
        .padding([8, 12]);

        let body: Element<'_, ViewerMessage> = match presenter.state() {
            PresenterState::Loading => column![text("Loading PDF…")]
                .align_x(Alignment::Center)
                .into(),
            PresenterState::Loaded => {
                let target = presenter.target();
                let origin = if target.is_remote_proxy {
                    "Rendered by hosted viewer"
                } else {
                    "Rendered from local file"
                };
                column![text(origin).size(14), text(&target.uri).size(12)]
                    .align_x(Alignment::Center)
                    .spacing(8)
                    .into()
            }
        };

        column![
            header,
            container(body).center(Length::Fill),
        ]
        .into()
    }
}
