//! gui/mod.rs
//!
//! Desktop frontend (iced) for the form controller:
//! - app state ('FormApp') and messages ('Message')
//! - update logic ('update()')
//! - view layout ('view()')
//!
//! Downloads and tag writes run as background tasks; their results come back
//! as messages, so the window keeps redrawing while yt-dlp works.

pub(crate) mod state;
pub(crate) mod update;
pub(crate) mod view;

pub use state::{FormApp, Message};

/// Open the window and run until it is closed
pub fn run() -> iced::Result {
    iced::application(FormApp::new, update::update, view::view)
        .title("fetchtag")
        .run()
}
