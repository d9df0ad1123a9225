//! Slide lists for the full-screen viewer.
//!
//! A slide list is the ordered subset of a project's images the viewer may
//! page through. Adult images are left out unless the visitor either turned
//! the R18 toggle on or confirmed their age. Slides are identified by the
//! image's index in `Project::images`.

use crate::index::ProjectFile;

/// The two gallery flags that decide what a visitor sees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Visibility {
    pub show_r18: bool,
    pub age_confirmed: bool,
}

impl Visibility {
    /// Whether the image belongs in the slide list.
    pub fn includes(self, file: &ProjectFile) -> bool {
        !file.r18 || self.show_r18 || self.age_confirmed
    }

    /// Whether the image's tile is rendered blurred.
    ///
    /// Only the toggle matters here; a confirmed age alone keeps the blur.
    pub fn blurs(self, file: &ProjectFile) -> bool {
        file.r18 && !self.show_r18
    }
}

/// Image indices in viewer order.
pub fn slide_list(images: &[ProjectFile], visibility: Visibility) -> Vec<usize> {
    images
        .iter()
        .enumerate()
        .filter(|(_, f)| visibility.includes(f))
        .map(|(i, _)| i)
        .collect()
}

/// Position of `image_index` in the slide list, if it is part of it.
pub fn slide_index_of(
    images: &[ProjectFile],
    image_index: usize,
    visibility: Visibility,
) -> Option<usize> {
    slide_list(images, visibility)
        .iter()
        .position(|&i| i == image_index)
}

/// Slide positions of one image under both lists a page can show.
///
/// `restricted` is the position while adult images are excluded (absent for
/// adult images); `inclusive` is the position once they are included. The
/// generator writes both onto each tile so the browser never recomputes
/// the lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlidePositions {
    pub restricted: Option<usize>,
    pub inclusive: usize,
}

pub fn slide_positions(images: &[ProjectFile]) -> Vec<SlidePositions> {
    let mut restricted = 0;
    images
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let pos = SlidePositions {
                restricted: (!f.r18).then_some(restricted),
                inclusive: i,
            };
            if !f.r18 {
                restricted += 1;
            }
            pos
        })
        .collect()
}
