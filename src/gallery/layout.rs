//! Project card layout selection.
//!
//! [`select_layout`] is a pure function from a project's images, its layout
//! hint and the current [`Visibility`] to the tiles a card shows. Image 0 is
//! always the hero. Each tile applies the R18 rule on its own: a badge when
//! the image is adult content, a blur when it is adult content and the
//! toggle is off.

use super::slides::Visibility;
use crate::index::{CropPosition, Layout, ProjectFile};

/// Tiles beside the hero in the vertical layout.
const VERTICAL_STACK: usize = 2;
/// Tiles under the hero in the horizontal layout.
const HORIZONTAL_ROW: usize = 3;
/// Tiles per row in the `all` layout.
const GRID_COLUMNS: usize = 3;

/// One rendered image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// Index into `Project::images`.
    pub image_index: usize,
    pub badge: bool,
    pub blurred: bool,
    pub crop: CropPosition,
    /// `+N` overlay: images the card does not show.
    pub overflow: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardLayout {
    /// No images: the card renders no image area.
    Empty,
    /// One full-width image with rounded corners.
    Single(Tile),
    /// Hero on the left, a stack of up to two on the right.
    Vertical { hero: Tile, stack: Vec<Tile> },
    /// Hero on top, a row of up to three below.
    Horizontal { hero: Tile, row: Vec<Tile> },
    /// Every image, rows of three.
    Grid { rows: Vec<Vec<Tile>> },
}

impl CardLayout {
    /// All tiles in reading order.
    pub fn tiles(&self) -> Vec<&Tile> {
        match self {
            CardLayout::Empty => Vec::new(),
            CardLayout::Single(tile) => vec![tile],
            CardLayout::Vertical { hero, stack: rest }
            | CardLayout::Horizontal { hero, row: rest } => {
                std::iter::once(hero).chain(rest.iter()).collect()
            }
            CardLayout::Grid { rows } => rows.iter().flatten().collect(),
        }
    }

    /// The overflow count shown on the card, if any.
    pub fn overflow(&self) -> Option<usize> {
        self.tiles().iter().find_map(|t| t.overflow)
    }
}

fn tile(images: &[ProjectFile], image_index: usize, visibility: Visibility) -> Tile {
    let file = &images[image_index];
    Tile {
        image_index,
        badge: file.r18,
        blurred: visibility.blurs(file),
        crop: file.crop(),
        overflow: None,
    }
}

/// Tiles `1..=shown`, with the overflow count on the last one when images
/// are left out.
fn secondary(images: &[ProjectFile], shown: usize, visibility: Visibility) -> Vec<Tile> {
    let count = images.len();
    let mut tiles: Vec<Tile> = (1..count.min(shown + 1))
        .map(|i| tile(images, i, visibility))
        .collect();
    let hidden = count.saturating_sub(shown + 1);
    if hidden > 0
        && let Some(last) = tiles.last_mut()
    {
        last.overflow = Some(hidden);
    }
    tiles
}

pub fn select_layout(images: &[ProjectFile], layout: Layout, visibility: Visibility) -> CardLayout {
    match images.len() {
        0 => CardLayout::Empty,
        1 => CardLayout::Single(tile(images, 0, visibility)),
        _ => match layout {
            Layout::Vertical => CardLayout::Vertical {
                hero: tile(images, 0, visibility),
                stack: secondary(images, VERTICAL_STACK, visibility),
            },
            Layout::Horizontal => CardLayout::Horizontal {
                hero: tile(images, 0, visibility),
                row: secondary(images, HORIZONTAL_ROW, visibility),
            },
            Layout::All => {
                let tiles: Vec<Tile> = (0..images.len())
                    .map(|i| tile(images, i, visibility))
                    .collect();
                CardLayout::Grid {
                    rows: tiles.chunks(GRID_COLUMNS).map(<[Tile]>::to_vec).collect(),
                }
            }
        },
    }
}
