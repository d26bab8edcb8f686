//! Server-side state for the interactive page pieces.
//!
//! The browser only swaps HTML fragments; which slide is showing, which
//! mega-menu panel is open and whether a section is loading are all decided
//! here and rendered into the markup.

pub mod carousel;
pub mod mega_menu;
pub mod menu;
pub mod view_state;

pub use carousel::{Carousel, Nav};
pub use mega_menu::MegaMenu;
pub use menu::{MenuItem, MenuLink, build_menu};
pub use view_state::ViewState;
