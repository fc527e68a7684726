// Imperative egui rendering. Every function here draws one section and
// returns what the user asked for; GalleryApp applies it to the state.

pub mod carousel_strip;
pub mod gallery_grid;
pub mod modal_window;
pub mod style;
pub mod tile;

pub use carousel_strip::{show_carousel_strip, StripAction, StripInteraction};
pub use gallery_grid::{show_gallery_grid, GridAction};
pub use modal_window::{show_modal, ModalAction};
pub use style::setup_custom_style;
