//! gui/update.rs
//! Routes messages to the form controller and starts background work.

use iced::Task;

use super::state::{FormApp, Message};
use crate::orchestrator::form::{fetch_and_autofill, write_confirmed};

pub(crate) fn update(state: &mut FormApp, message: Message) -> Task<Message> {
    match message {
        Message::FieldChanged(field, value) => {
            state.form.set_field(field, value);
            Task::none()
        }

        Message::Submit => match state.form.submit() {
            Some(request) => Task::perform(
                fetch_and_autofill(state.fetcher.clone(), request),
                Message::FetchFinished,
            ),
            None => Task::none(),
        },

        Message::FetchFinished(result) => {
            state.form.fetch_finished(result);
            Task::none()
        }

        Message::Confirm(yes) => match state.form.confirm(yes) {
            Some((path, tags)) => {
                Task::perform(write_confirmed(path, tags), Message::TagFinished)
            }
            None => Task::none(),
        },

        Message::TagFinished(result) => {
            state.form.tag_finished(result);
            Task::none()
        }
    }
}
