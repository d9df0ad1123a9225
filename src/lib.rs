//! # chiaki-site
//!
//! Static site generator for the 千秋稻荷社 character portfolio: a landing
//! page, a character profile with an interactive Live2D avatar, an artwork
//! gallery with R18 gating, a font catalogue and a links page.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! The gallery content flows through three stages, each leaving an inspectable
//! artifact in the temp directory:
//!
//! ```text
//! 1. Index     content/assets/...  →  index.json     (folders → projects)
//! 2. Thumbs    index.json          →  thumbs/        (large + small JPEGs)
//! 3. Generate  index.json          →  dist/          (final HTML site)
//! ```
//!
//! Each stage is a function from its inputs to its outputs, so the gallery
//! logic can be tested without encoding a single image.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading, deep merge over stock defaults, validation, theme CSS |
//! | [`naming`] | Folder-name parsing (`YYYYMMDD_Author_Title`), R18 marker, file classification |
//! | [`index`] | Project index types shared between stages |
//! | [`scan`] | Stage 1: walks the assets directory and builds the project index |
//! | [`thumbnail`] | Thumbnail path convention and fallback resolution |
//! | [`imaging`] | Pure-Rust image operations behind the `ImageBackend` trait |
//! | [`cache`] | Content-addressed thumbnail cache |
//! | [`process`] | Stage 2: renders thumbnails in parallel and fills in dimensions |
//! | [`gallery`] | Gallery state machine: age gate, R18 toggle, lightbox slides, card layout |
//! | [`avatar`] | Avatar controller: placement, mouth/expression/gaze loops, lifecycle |
//! | [`generate`] | Stage 3: renders every page with Maud and copies assets |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## The Folder Name Is the Metadata
//!
//! A project's date, artist and title live in its folder name, and the R18
//! flag lives in each file name. Uploading a commission is dropping a folder
//! into `assets/character/`. An optional `project.toml` overrides what the
//! name cannot express: layout and crop hints.
//!
//! ## Gallery Logic Outside the Browser
//!
//! The age gate, R18 toggle and lightbox are modelled in [`gallery`] as a
//! pure state machine with an injected [`gallery::KeyValueStore`]. The
//! generator precomputes slide positions for every tile so the browser glue
//! only has to look them up. The same goes for the avatar: [`avatar`] drives
//! an [`avatar::AvatarEngine`] trait and its constants are embedded into the
//! character page.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): malformed markup is
//! a build error and all interpolation is auto-escaped.
//!
//! ## Thumbnails Never Block a Build
//!
//! A broken image is logged and left without thumbnails. Pages fall back to
//! the original file, both at generate time and through `onerror` in the
//! browser.

pub mod avatar;
pub mod cache;
pub mod config;
pub mod gallery;
pub mod generate;
pub mod imaging;
pub mod index;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod thumbnail;

#[cfg(test)]
pub(crate) mod test_helpers;
