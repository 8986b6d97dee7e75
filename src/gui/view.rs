//! gui/view.rs
//! Renders the form (reads state, produces widgets; no mutation).

use std::path::Path;

use iced::widget::{Column, Row, button, column, row, text, text_input};
use iced::{Alignment, Length};

use super::state::{FormApp, Message};
use crate::orchestrator::{FormField, Notice, Phase};

const LABEL_W: f32 = 60.0;

fn field_row<'a>(
    label: &'a str,
    value: &'a str,
    field: FormField,
    editable: bool,
) -> Row<'a, Message> {
    let input = text_input("", value).width(Length::Fill);
    let input = if editable {
        input.on_input(move |s| Message::FieldChanged(field, s))
    } else {
        input
    };

    row![text(label).width(Length::Fixed(LABEL_W)), input]
        .spacing(8)
        .align_y(Alignment::Center)
}

fn confirmation(path: &Path) -> Column<'_, Message> {
    column![
        text(format!("Write these tags to {}?", path.display())),
        row![
            button("Yes").on_press(Message::Confirm(true)),
            button("No").on_press(Message::Confirm(false)),
        ]
        .spacing(8),
    ]
    .spacing(6)
}

fn notice_line(notice: &Notice) -> iced::widget::Text<'_> {
    match notice {
        Notice::Error(m) => text(format!("Error: {}", m)),
        Notice::Info(m) => text(m.as_str()),
        Notice::Success(m) => text(format!("Done: {}", m)),
    }
}

pub(crate) fn view(state: &FormApp) -> Column<'_, Message> {
    let form = &state.form;
    let editable = !form.is_busy();

    let submit = if *form.phase() == Phase::Idle {
        button("Download and Tag").on_press(Message::Submit)
    } else {
        button("Download and Tag")
    };

    let mut content = column![
        text("Enter a video link").size(18),
        field_row("Link", form.field(FormField::Link), FormField::Link, editable),
        field_row("Artist", form.field(FormField::Artist), FormField::Artist, editable),
        field_row("Track", form.field(FormField::Title), FormField::Title, editable),
        field_row("Album", form.field(FormField::Album), FormField::Album, editable),
        submit,
    ]
    .spacing(10)
    .padding(16);

    if let Phase::AwaitingConfirmation(path) = form.phase() {
        content = content.push(confirmation(path));
    }

    if let Some(notice) = form.notice() {
        content = content.push(notice_line(notice));
    }

    content
}
