//! Background + condition icon compositing.
//!
//! All pixel work goes through [`ImagePort`], so the pipeline can be exercised
//! without a display or real image files. [`ImageCrate`] is the production port.

use image::{RgbaImage, imageops, imageops::FilterType};
use std::{
    fmt,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::daypart::Background;

/// Gaussian sigma applied to the background before the icon goes on top.
pub const BLUR_SIGMA: f32 = 2.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to load image asset: {}", path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid condition icon key '{0}'")]
    InvalidIconKey(String),
}

/// RGBA8 pixels ready to hand to a UI toolkit.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Frame {
    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.rgba.get(i..i + 4).and_then(|p| p.try_into().ok())
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// The image operations the render step needs.
///
/// Images are owned values: every handle a call opens is dropped before it returns.
pub trait ImagePort {
    type Image;

    fn load(&self, path: &Path) -> Result<Self::Image, RenderError>;
    fn dimensions(&self, image: &Self::Image) -> (u32, u32);
    fn blur(&self, image: Self::Image) -> Self::Image;
    fn resize(&self, image: Self::Image, side: u32) -> Self::Image;
    /// Draw `top` onto `base` at `(x, y)`, using `top`'s alpha channel as the mask.
    fn composite(&self, base: &mut Self::Image, top: &Self::Image, x: i64, y: i64);
    fn encode(&self, image: Self::Image) -> Frame;
}

/// [`ImagePort`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrate;

impl ImagePort for ImageCrate {
    type Image = RgbaImage;

    fn load(&self, path: &Path) -> Result<RgbaImage, RenderError> {
        let img = image::open(path).map_err(|source| RenderError::Asset {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(img.into_rgba8())
    }

    fn dimensions(&self, image: &RgbaImage) -> (u32, u32) {
        image.dimensions()
    }

    fn blur(&self, image: RgbaImage) -> RgbaImage {
        imageops::blur(&image, BLUR_SIGMA)
    }

    fn resize(&self, image: RgbaImage, side: u32) -> RgbaImage {
        imageops::resize(&image, side, side, FilterType::Lanczos3)
    }

    fn composite(&self, base: &mut RgbaImage, top: &RgbaImage, x: i64, y: i64) {
        imageops::overlay(base, top, x, y);
    }

    fn encode(&self, image: RgbaImage) -> Frame {
        let (width, height) = image.dimensions();
        Frame {
            width,
            height,
            rgba: image.into_raw(),
        }
    }
}

/// Directory holding `daytime.png`, `night.png` and one `{icon}.png` per condition.
#[derive(Debug, Clone)]
pub struct AssetDir {
    root: PathBuf,
}

impl AssetDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn background(&self, background: Background) -> PathBuf {
        self.root.join(background.file_name())
    }

    /// Keys are short provider codes like "10n"; anything else could escape the directory.
    pub fn icon(&self, key: &str) -> Result<PathBuf, RenderError> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(RenderError::InvalidIconKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.png")))
    }
}

/// Icon edge length: a fifth of the background's shorter side, rounded down.
pub fn icon_side(width: u32, height: u32) -> u32 {
    width.min(height) / 5
}

/// Top-left corner that centers a `side`-square within `width` x `height`.
pub fn centered_offset(width: u32, height: u32, side: u32) -> (i64, i64) {
    (
        (i64::from(width) - i64::from(side)) / 2,
        (i64::from(height) - i64::from(side)) / 2,
    )
}

/// Blurred background alone, shown before the first search.
pub fn compose_backdrop<P: ImagePort>(
    port: &P,
    assets: &AssetDir,
    background: Background,
) -> Result<Frame, RenderError> {
    let bg = port.load(&assets.background(background))?;
    let bg = port.blur(bg);
    Ok(port.encode(bg))
}

/// Blurred background with the condition icon centered on top.
pub fn compose_scene<P: ImagePort>(
    port: &P,
    assets: &AssetDir,
    background: Background,
    icon_key: &str,
) -> Result<Frame, RenderError> {
    let icon_path = assets.icon(icon_key)?;

    let bg = port.load(&assets.background(background))?;
    let mut bg = port.blur(bg);

    let (width, height) = port.dimensions(&bg);
    let side = icon_side(width, height);
    if side == 0 {
        tracing::warn!(width, height, "background too small for a condition icon");
        return Ok(port.encode(bg));
    }

    let icon = port.load(&icon_path)?;
    let icon = port.resize(icon, side);
    let (x, y) = centered_offset(width, height, side);
    port.composite(&mut bg, &icon, x, y);

    tracing::debug!(%background, icon_key, width, height, side, "composed scene");
    Ok(port.encode(bg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::cell::RefCell;

    #[test]
    fn icon_side_is_fifth_of_shorter_edge() {
        assert_eq!(icon_side(600, 400), 80);
        assert_eq!(icon_side(400, 600), 80);
        assert_eq!(icon_side(1000, 1000), 200);
        assert_eq!(icon_side(9, 11), 1);
        assert_eq!(icon_side(4, 100), 0);
    }

    #[test]
    fn offset_centers_icon() {
        assert_eq!(centered_offset(600, 400, 80), (260, 160));
        assert_eq!(centered_offset(101, 51, 10), (45, 20));
    }

    #[test]
    fn pixel_indexing_past_u32_range() {
        // 70_000 x 70_000 RGBA overflows u32 byte offsets; no buffer needed to check the bounds path.
        let frame = Frame {
            width: 70_000,
            height: 70_000,
            rgba: Vec::new(),
        };
        assert_eq!(frame.pixel(69_999, 69_999), None);
        assert_eq!(frame.pixel(70_000, 0), None);

        let small = Frame {
            width: 2,
            height: 1,
            rgba: vec![1, 2, 3, 4, 5, 6, 7, 8],
        };
        assert_eq!(small.pixel(1, 0), Some([5, 6, 7, 8]));
    }

    #[test]
    fn icon_key_must_be_plain_code() {
        let assets = AssetDir::new("weather_icons");
        assert_eq!(
            assets.icon("01d").expect("valid key"),
            Path::new("weather_icons").join("01d.png")
        );
        assert!(matches!(assets.icon("../secret"), Err(RenderError::InvalidIconKey(_))));
        assert!(matches!(assets.icon(""), Err(RenderError::InvalidIconKey(_))));
    }

    /// Port whose images are just dimensions; records every call.
    #[derive(Default)]
    struct RecordingPort {
        sizes: Vec<(&'static str, (u32, u32))>,
        calls: RefCell<Vec<String>>,
    }

    impl RecordingPort {
        fn with(sizes: &[(&'static str, (u32, u32))]) -> Self {
            Self {
                sizes: sizes.to_vec(),
                calls: RefCell::default(),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl ImagePort for RecordingPort {
        type Image = (u32, u32);

        fn load(&self, path: &Path) -> Result<(u32, u32), RenderError> {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            self.calls.borrow_mut().push(format!("load {name}"));
            self.sizes
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, size)| *size)
                .ok_or_else(|| RenderError::Asset {
                    path: path.to_path_buf(),
                    source: image::ImageError::IoError(std::io::ErrorKind::NotFound.into()),
                })
        }

        fn dimensions(&self, image: &(u32, u32)) -> (u32, u32) {
            *image
        }

        fn blur(&self, image: (u32, u32)) -> (u32, u32) {
            self.calls.borrow_mut().push("blur".into());
            image
        }

        fn resize(&self, _image: (u32, u32), side: u32) -> (u32, u32) {
            self.calls.borrow_mut().push(format!("resize {side}"));
            (side, side)
        }

        fn composite(&self, _base: &mut (u32, u32), top: &(u32, u32), x: i64, y: i64) {
            self.calls
                .borrow_mut()
                .push(format!("composite {}x{} at {x},{y}", top.0, top.1));
        }

        fn encode(&self, image: (u32, u32)) -> Frame {
            self.calls.borrow_mut().push("encode".into());
            Frame {
                width: image.0,
                height: image.1,
                rgba: Vec::new(),
            }
        }
    }

    #[test]
    fn scene_pipeline_order_and_geometry() {
        let port = RecordingPort::with(&[("daytime.png", (600, 400)), ("01d.png", (100, 100))]);
        let assets = AssetDir::new("icons");

        let frame = compose_scene(&port, &assets, Background::Day, "01d").expect("compose");

        assert_eq!((frame.width, frame.height), (600, 400));
        assert_eq!(
            port.calls(),
            vec![
                "load daytime.png",
                "blur",
                "load 01d.png",
                "resize 80",
                "composite 80x80 at 260,160",
                "encode",
            ]
        );
    }

    #[test]
    fn night_scene_loads_night_background() {
        let port = RecordingPort::with(&[("night.png", (300, 500)), ("10n.png", (50, 50))]);
        let assets = AssetDir::new("icons");

        compose_scene(&port, &assets, Background::Night, "10n").expect("compose");

        let calls = port.calls();
        assert_eq!(calls[0], "load night.png");
        assert!(calls.contains(&"composite 60x60 at 120,220".to_string()));
    }

    #[test]
    fn missing_icon_is_an_error() {
        let port = RecordingPort::with(&[("daytime.png", (600, 400))]);
        let assets = AssetDir::new("icons");

        let err = compose_scene(&port, &assets, Background::Day, "99x").unwrap_err();
        assert!(err.to_string().contains("99x.png"));
    }

    #[test]
    fn backdrop_skips_icon() {
        let port = RecordingPort::with(&[("night.png", (640, 480))]);
        let frame = compose_backdrop(&port, &AssetDir::new("icons"), Background::Night)
            .expect("backdrop");

        assert_eq!((frame.width, frame.height), (640, 480));
        assert_eq!(port.calls(), vec!["load night.png", "blur", "encode"]);
    }

    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn write_assets(icon: Rgba<u8>) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        RgbaImage::from_pixel(100, 80, BLUE)
            .save(dir.path().join("daytime.png"))
            .expect("save background");
        RgbaImage::from_pixel(32, 32, icon)
            .save(dir.path().join("01d.png"))
            .expect("save icon");
        dir
    }

    fn close(actual: [u8; 4], expected: Rgba<u8>) -> bool {
        actual
            .iter()
            .zip(expected.0.iter())
            .all(|(a, e)| a.abs_diff(*e) <= 2)
    }

    #[test]
    fn image_crate_composites_opaque_icon_in_center() {
        let dir = write_assets(RED);
        let assets = AssetDir::new(dir.path());

        let frame = compose_scene(&ImageCrate, &assets, Background::Day, "01d").expect("compose");

        assert_eq!((frame.width, frame.height), (100, 80));
        assert_eq!(frame.rgba.len(), 100 * 80 * 4);
        // side 16, offset (42, 32)
        let center = frame.pixel(50, 40).expect("center pixel");
        assert!(close(center, RED), "center was {center:?}");
        let outside = frame.pixel(10, 10).expect("outside pixel");
        assert!(close(outside, BLUE), "outside was {outside:?}");
    }

    #[test]
    fn image_crate_respects_icon_transparency() {
        let dir = write_assets(CLEAR);
        let assets = AssetDir::new(dir.path());

        let frame = compose_scene(&ImageCrate, &assets, Background::Day, "01d").expect("compose");

        let center = frame.pixel(50, 40).expect("center pixel");
        assert!(close(center, BLUE), "center was {center:?}");
    }

    #[test]
    fn image_crate_reports_missing_background_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let assets = AssetDir::new(dir.path());

        let err = compose_backdrop(&ImageCrate, &assets, Background::Night).unwrap_err();
        assert!(matches!(err, RenderError::Asset { ref path, .. } if path.ends_with("night.png")));
    }
}
