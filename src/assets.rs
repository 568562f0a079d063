use rust_embed::RustEmbed;

/// Layouts and dictionaries shipped inside the binary.
#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Assets;
