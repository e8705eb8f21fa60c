// Loading the cover and reveal images.
// Both loads run side by side and are joined before layout starts; an image
// that never arrives turns into an explicit timeout instead of a hang.

use crate::error::Error;
use crate::layout::Size;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Cover art (drawn on the canvas) and the hidden reward underneath.
#[derive(Clone, Debug)]
pub struct LoadedImages {
    pub cover: RgbaImage,
    pub reveal: RgbaImage,
}

/// Decode one image into RGBA8.
pub fn load_image(path: &Path) -> Result<RgbaImage, Error> {
    let img = image::open(path)
        .map_err(|e| Error::ImageLoad { path: path.display().to_string(), reason: e.to_string() })?
        .to_rgba8();
    if img.width() == 0 || img.height() == 0 {
        return Err(Error::EmptyImage(path.display().to_string()));
    }
    debug!(path = %path.display(), width = img.width(), height = img.height(), "image decoded");
    Ok(img)
}

pub fn natural_size(img: &RgbaImage) -> Size {
    Size::new(img.width() as usize, img.height() as usize)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Cover,
    Reveal,
}

/// Load both images in parallel and wait for both, up to `timeout`.
pub fn load_pair(cover: &Path, reveal: &Path, timeout: Duration) -> Result<LoadedImages, Error> {
    let (tx, rx) = mpsc::channel();
    for (slot, path) in [(Slot::Cover, cover.to_path_buf()), (Slot::Reveal, reveal.to_path_buf())] {
        let tx = tx.clone();
        // A stalled decoder keeps its thread; the receiver is gone by then.
        thread::spawn(move || {
            let _ = tx.send((slot, load_image(&path)));
        });
    }
    drop(tx);

    let deadline = Instant::now() + timeout;
    let mut cover_img = None;
    let mut reveal_img = None;
    while cover_img.is_none() || reveal_img.is_none() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok((Slot::Cover, result)) => cover_img = Some(result?),
            Ok((Slot::Reveal, result)) => reveal_img = Some(result?),
            Err(_) => {
                let pending = pending_names(cover, reveal, cover_img.is_none(), reveal_img.is_none());
                return Err(Error::LoadTimeout { what: pending, millis: timeout.as_millis() as u64 });
            }
        }
    }

    match (cover_img, reveal_img) {
        (Some(cover), Some(reveal)) => {
            info!(
                cover = ?natural_size(&cover),
                reveal = ?natural_size(&reveal),
                "scratch images loaded"
            );
            Ok(LoadedImages { cover, reveal })
        }
        _ => Err(Error::LoadTimeout {
            what: pending_names(cover, reveal, true, true),
            millis: timeout.as_millis() as u64,
        }),
    }
}

fn pending_names(cover: &Path, reveal: &Path, cover_pending: bool, reveal_pending: bool) -> String {
    let mut names: Vec<PathBuf> = Vec::new();
    if cover_pending {
        names.push(cover.to_path_buf());
    }
    if reveal_pending {
        names.push(reveal.to_path_buf());
    }
    names.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn loads_both_images() {
        let dir = tempfile::tempdir().unwrap();
        let cover = dir.path().join("cover.png");
        let reveal = dir.path().join("reveal.png");
        RgbaImage::from_pixel(6, 4, Rgba([1, 2, 3, 255])).save(&cover).unwrap();
        RgbaImage::from_pixel(12, 8, Rgba([4, 5, 6, 255])).save(&reveal).unwrap();

        let loaded = load_pair(&cover, &reveal, Duration::from_secs(5)).unwrap();
        assert_eq!(natural_size(&loaded.cover), Size::new(6, 4));
        assert_eq!(natural_size(&loaded.reveal), Size::new(12, 8));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let cover = dir.path().join("cover.png");
        RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255])).save(&cover).unwrap();
        let err = load_pair(&cover, &dir.path().join("nope.png"), Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, Error::ImageLoad { .. }));
    }
}
