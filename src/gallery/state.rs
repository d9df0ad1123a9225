//! Gallery visibility state machine.
//!
//! One [`GalleryState`] exists per gallery page mount. It owns the visitor
//! [`Session`] (the persisted age flag), the R18 toggle, the confirmation
//! dialog and the full-screen viewer:
//!
//! ```text
//!                 click adult, unconfirmed            confirm
//!   Closed ─────────────────────────────────▶ Pending ─────────▶ Closed + viewer Open(slide')
//!     │                                          │
//!     │ click allowed image                      └─ cancel ──▶ Closed
//!     ▼
//!   viewer Open(slide) ── close ──▶ viewer Closed
//! ```
//!
//! The toggle follows the same gate: flipping it while unconfirmed opens the
//! dialog instead, and confirming then performs the flip.
//!
//! Every operation returns a [`Transition`] so callers can tell what
//! happened without diffing the state.

use super::session::{KeyValueStore, Session, StoreError};
use super::slides::{Visibility, slide_index_of};
use crate::index::{Project, ProjectIndex};

/// Action waiting for the age confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    Image {
        project_id: String,
        image_index: usize,
    },
    ToggleR18,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Closed,
    PendingConfirm(Pending),
}

/// An open full-screen viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenViewer {
    pub project_id: String,
    /// Index into the project's slide list (not into `images`).
    pub slide: usize,
}

/// What a confirmed dialog resolved into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Viewer(OpenViewer),
    Toggled { show_r18: bool },
    /// The pending image no longer exists; the flag is still recorded.
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    ViewerOpened(OpenViewer),
    DialogOpened(Pending),
    Confirmed(Resolution),
    Toggled { show_r18: bool },
    Cancelled,
    ViewerClosed,
    Ignored,
}

#[derive(Debug)]
pub struct GalleryState<S: KeyValueStore> {
    session: Session<S>,
    show_r18: bool,
    dialog: Dialog,
    viewer: Option<OpenViewer>,
}

impl<S: KeyValueStore> GalleryState<S> {
    /// Fresh page state: toggle off, nothing open.
    pub fn new(session: Session<S>) -> Self {
        Self {
            session,
            show_r18: false,
            dialog: Dialog::Closed,
            viewer: None,
        }
    }

    pub fn visibility(&self) -> Visibility {
        Visibility {
            show_r18: self.show_r18,
            age_confirmed: self.session.age_confirmed(),
        }
    }

    pub fn show_r18(&self) -> bool {
        self.show_r18
    }

    pub fn age_confirmed(&self) -> bool {
        self.session.age_confirmed()
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// The viewer to draw. Hidden while the dialog is pending, so the two
    /// never appear together.
    pub fn visible_viewer(&self) -> Option<&OpenViewer> {
        match self.dialog {
            Dialog::Closed => self.viewer.as_ref(),
            Dialog::PendingConfirm(_) => None,
        }
    }

    /// A visitor clicked image `image_index` of `project`.
    pub fn click_image(&mut self, project: &Project, image_index: usize) -> Transition {
        if matches!(self.dialog, Dialog::PendingConfirm(_)) {
            return Transition::Ignored;
        }
        let Some(file) = project.images.get(image_index) else {
            return Transition::Ignored;
        };

        let vis = self.visibility();
        if vis.includes(file) {
            return match slide_index_of(&project.images, image_index, vis) {
                Some(slide) => self.open_viewer(&project.id, slide),
                None => Transition::Ignored,
            };
        }

        let pending = Pending::Image {
            project_id: project.id.clone(),
            image_index,
        };
        self.viewer = None;
        self.dialog = Dialog::PendingConfirm(pending.clone());
        Transition::DialogOpened(pending)
    }

    /// The visitor confirmed being an adult.
    ///
    /// Persists the flag, then resolves the pending action against the slide
    /// list recomputed with the new flag. If persisting fails the dialog
    /// stays pending and nothing changes.
    pub fn confirm(&mut self, index: &ProjectIndex) -> Result<Transition, StoreError> {
        let Dialog::PendingConfirm(pending) = &self.dialog else {
            return Ok(Transition::Ignored);
        };
        let pending = pending.clone();

        self.session.confirm_age()?;
        self.dialog = Dialog::Closed;

        let resolution = match pending {
            Pending::Image {
                project_id,
                image_index,
            } => {
                let slide = index
                    .project_by_id(&project_id)
                    .and_then(|p| slide_index_of(&p.images, image_index, self.visibility()));
                match slide {
                    Some(slide) => {
                        let viewer = OpenViewer { project_id, slide };
                        self.viewer = Some(viewer.clone());
                        Resolution::Viewer(viewer)
                    }
                    None => Resolution::Nothing,
                }
            }
            Pending::ToggleR18 => {
                self.show_r18 = !self.show_r18;
                Resolution::Toggled {
                    show_r18: self.show_r18,
                }
            }
        };
        tracing::debug!(?resolution, "age confirmed");
        Ok(Transition::Confirmed(resolution))
    }

    /// The visitor dismissed the dialog. The pending action is dropped.
    pub fn cancel(&mut self) -> Transition {
        match self.dialog {
            Dialog::PendingConfirm(_) => {
                self.dialog = Dialog::Closed;
                Transition::Cancelled
            }
            Dialog::Closed => Transition::Ignored,
        }
    }

    pub fn close_viewer(&mut self) -> Transition {
        match self.viewer.take() {
            Some(_) => Transition::ViewerClosed,
            None => Transition::Ignored,
        }
    }

    /// Flip the R18 toggle, or ask for confirmation first.
    pub fn toggle_r18(&mut self) -> Transition {
        if matches!(self.dialog, Dialog::PendingConfirm(_)) {
            return Transition::Ignored;
        }
        if self.session.age_confirmed() {
            self.show_r18 = !self.show_r18;
            Transition::Toggled {
                show_r18: self.show_r18,
            }
        } else {
            self.dialog = Dialog::PendingConfirm(Pending::ToggleR18);
            Transition::DialogOpened(Pending::ToggleR18)
        }
    }

    fn open_viewer(&mut self, project_id: &str, slide: usize) -> Transition {
        let viewer = OpenViewer {
            project_id: project_id.to_string(),
            slide,
        };
        self.viewer = Some(viewer.clone());
        Transition::ViewerOpened(viewer)
    }
}
