pub mod catalogue;
pub mod layout;

pub use catalogue::{Glyph, Key, KeyCatalogue, LayoutData, composed_letters};
pub use layout::{EmbeddedLayouts, KeyProvider};
