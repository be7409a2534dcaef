use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Edge length of the tray icon in pixels.
pub const ICON_SIZE: u32 = 32;

/// Fill and border colours of the generated icon.
const FALLBACK_FILL: [u8; 4] = [0x6A, 0x5A, 0xCD, 0xFF];
const FALLBACK_BORDER: [u8; 4] = [0xB0, 0xA8, 0xF0, 0xFF];
const BORDER_WIDTH: u32 = 2;

/// Returns the candidate locations for an icon file name: next to the
/// executable first, then the working directory.
pub fn candidate_paths(file_name: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(dir.join(file_name));
    }
    paths.push(PathBuf::from(file_name));
    paths
}

/// Decodes an image file and scales it to `ICON_SIZE` square RGBA.
pub fn load_rgba(path: &Path) -> Option<Vec<u8>> {
    let bytes = std::fs::read(path).ok()?;
    let image = match image::load_from_memory(&bytes) {
        Ok(image) => image,
        Err(e) => {
            warn!("Failed to decode icon {}: {e}", path.display());
            return None;
        }
    };
    let image = image.resize_exact(ICON_SIZE, ICON_SIZE, image::imageops::FilterType::Lanczos3);
    Some(image.to_rgba8().into_raw())
}

/// A slate blue square with a lighter border, used when no icon file can
/// be loaded.
pub fn fallback_rgba() -> Vec<u8> {
    let edge = ICON_SIZE - BORDER_WIDTH;
    (0..ICON_SIZE * ICON_SIZE)
        .flat_map(|i| {
            let (x, y) = (i % ICON_SIZE, i / ICON_SIZE);
            let border = x < BORDER_WIDTH || y < BORDER_WIDTH || x >= edge || y >= edge;
            if border { FALLBACK_BORDER } else { FALLBACK_FILL }
        })
        .collect()
}

/// Finds and decodes the icon named `file_name`, or generates one.
pub fn resolve_rgba(file_name: &str) -> Vec<u8> {
    for path in candidate_paths(file_name) {
        if !path.exists() {
            continue;
        }
        if let Some(rgba) = load_rgba(&path) {
            debug!("Loaded tray icon from {}", path.display());
            return rgba;
        }
    }
    warn!("Tray icon '{file_name}' not found, using generated icon");
    fallback_rgba()
}
