//! Gallery behaviour: who sees what, and how a project card is laid out.
//!
//! | Module | Role |
//! |---|---|
//! | [`session`] | Persisted age flag behind a [`KeyValueStore`] |
//! | [`slides`] | Slide lists for the full-screen viewer |
//! | [`state`] | Age gate, R18 toggle, dialog and viewer state machine |
//! | [`layout`] | Pure card layout selection |
//!
//! The generator renders cards with [`select_layout`] under the default
//! [`Visibility`] and writes [`slide_positions`] onto every tile; the browser
//! glue replays [`GalleryState`]'s transitions on top of that markup.

pub mod layout;
pub mod session;
pub mod slides;
pub mod state;

pub use layout::{CardLayout, Tile, select_layout};
pub use session::{KeyValueStore, MemoryStore, Session, StoreError};
pub use slides::{SlidePositions, Visibility, slide_index_of, slide_list, slide_positions};
pub use state::{Dialog, GalleryState, OpenViewer, Pending, Resolution, Transition};
