pub mod image;

pub use self::image::CarrierImage;

/// Extensions of lossy formats, LSB payloads do not survive their compression
pub const LOSSY_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "webp"];
