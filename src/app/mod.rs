pub mod actions;
pub mod keymap;
pub mod layout;
pub mod pagination;
pub mod queue;
mod state;
pub mod viewport;

pub use actions::Dropdown;
pub use pagination::{FileSource, HttpSource, Loader, PageSource};
pub use queue::{Disposition, Queue};
pub use state::{App, InputFocus, OverlayData};

#[cfg(test)]
pub(crate) use state::{idle_source, test_app};
