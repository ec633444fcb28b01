use crate::image_ops::color::ColorRgb;
use crate::image_ops::image_types::Extensions;
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use serde::Serialize;

pub const MIN_SIZE: u32 = 1;
pub const MAX_SIZE: u32 = 15360;
const DEFAULT_SIZE: u32 = 48;

/// Common behaviour of every image profile variant
pub trait Profile {
    fn profile_type(&self) -> &'static str;

    fn extension(&self) -> Extensions;

    /// Pixel buffer of the whole image
    fn render(&self) -> DynamicImage;

    /// Compression quality hint, `None` for lossless formats
    fn quality(&self) -> Option<u8>;

    /// Deterministic file name, derived from every field of the profile
    fn upload_file_name(&self) -> String;

    /// Field values as query parameters, in declared field order
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

fn clamp_size(value: i64) -> u32 {
    value.clamp(MIN_SIZE as i64, MAX_SIZE as i64) as u32
}

fn clamp_u8(value: i64, min: u8, max: u8) -> u8 {
    value.clamp(min as i64, max as i64) as u8
}

fn color_file_part(color: &ColorRgb) -> String {
    format!("color_r_{}_g_{}_b_{}", color.r(), color.g(), color.b())
}

/// Opaque solid color JPEG
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct JpegPlainProfile {
    width: u32,
    height: u32,
    color_rgb: ColorRgb,
    quality: u8,
}

impl JpegPlainProfile {
    pub const PROFILE_TYPE: &'static str = "jpeg_plain";
    pub const MIN_QUALITY: u8 = 0;
    pub const MAX_QUALITY: u8 = 95;
    pub const DEFAULT_QUALITY: u8 = 75;

    pub fn new(width: i64, height: i64, color_rgb: ColorRgb, quality: i64) -> Self {
        JpegPlainProfile {
            width: clamp_size(width),
            height: clamp_size(height),
            color_rgb,
            quality: clamp_u8(quality, Self::MIN_QUALITY, Self::MAX_QUALITY),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn color_rgb(&self) -> ColorRgb {
        self.color_rgb
    }
}

impl Default for JpegPlainProfile {
    fn default() -> Self {
        JpegPlainProfile {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            color_rgb: ColorRgb::default(),
            quality: Self::DEFAULT_QUALITY,
        }
    }
}

impl Profile for JpegPlainProfile {
    fn profile_type(&self) -> &'static str {
        Self::PROFILE_TYPE
    }

    fn extension(&self) -> Extensions {
        Extensions::Jpeg
    }

    fn render(&self) -> DynamicImage {
        let (r, g, b) = self.color_rgb.to_tuple();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(
            self.width,
            self.height,
            Rgb([r, g, b]),
        ))
    }

    fn quality(&self) -> Option<u8> {
        Some(self.quality)
    }

    fn upload_file_name(&self) -> String {
        format!(
            "{}_width_{}_height_{}_{}_quality_{}.{}",
            Self::PROFILE_TYPE,
            self.width,
            self.height,
            color_file_part(&self.color_rgb),
            self.quality,
            self.extension().name()
        )
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("width", self.width.to_string()),
            ("height", self.height.to_string()),
            ("color_rgb", self.color_rgb.to_hex()),
            ("quality", self.quality.to_string()),
        ]
    }
}

/// Solid color PNG with a uniform alpha channel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PngPlainProfile {
    width: u32,
    height: u32,
    color_rgb: ColorRgb,
    alpha: u8,
}

impl PngPlainProfile {
    pub const PROFILE_TYPE: &'static str = "png_plain";
    pub const MIN_ALPHA: u8 = 0;
    pub const MAX_ALPHA: u8 = 255;

    pub fn new(width: i64, height: i64, color_rgb: ColorRgb, alpha: i64) -> Self {
        PngPlainProfile {
            width: clamp_size(width),
            height: clamp_size(height),
            color_rgb,
            alpha: clamp_u8(alpha, Self::MIN_ALPHA, Self::MAX_ALPHA),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn color_rgb(&self) -> ColorRgb {
        self.color_rgb
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }
}

impl Default for PngPlainProfile {
    fn default() -> Self {
        PngPlainProfile {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            color_rgb: ColorRgb::default(),
            alpha: Self::MAX_ALPHA,
        }
    }
}

impl Profile for PngPlainProfile {
    fn profile_type(&self) -> &'static str {
        Self::PROFILE_TYPE
    }

    fn extension(&self) -> Extensions {
        Extensions::Png
    }

    fn render(&self) -> DynamicImage {
        let (r, g, b) = self.color_rgb.to_tuple();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            self.width,
            self.height,
            Rgba([r, g, b, self.alpha]),
        ))
    }

    fn quality(&self) -> Option<u8> {
        None
    }

    fn upload_file_name(&self) -> String {
        format!(
            "{}_width_{}_height_{}_{}_alpha_{}.{}",
            Self::PROFILE_TYPE,
            self.width,
            self.height,
            color_file_part(&self.color_rgb),
            self.alpha,
            self.extension().name()
        )
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("width", self.width.to_string()),
            ("height", self.height.to_string()),
            ("color_rgb", self.color_rgb.to_hex()),
            ("alpha", self.alpha.to_string()),
        ]
    }
}

/// Every supported profile.
///
/// Serializes externally tagged, `{"<profile_type>":{<fields>}}`, which is the
/// signature format. Variant names must stay in sync with `PROFILE_TYPE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageProfile {
    JpegPlain(JpegPlainProfile),
    PngPlain(PngPlainProfile),
}

impl ImageProfile {
    fn inner(&self) -> &dyn Profile {
        match self {
            ImageProfile::JpegPlain(profile) => profile,
            ImageProfile::PngPlain(profile) => profile,
        }
    }

    /// Canonical cache key of the profile.
    ///
    /// Compact JSON with fields in declared order, identical for equal profiles
    /// no matter how they were built.
    pub fn signature(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Query string which routes back to this very profile
    pub fn query_string(&self) -> String {
        let mut parameters = vec![format!("profile_type={}", self.profile_type())];
        parameters.extend(
            self.query_pairs()
                .into_iter()
                .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value))),
        );
        parameters.join("&")
    }
}

impl Profile for ImageProfile {
    fn profile_type(&self) -> &'static str {
        self.inner().profile_type()
    }

    fn extension(&self) -> Extensions {
        self.inner().extension()
    }

    fn render(&self) -> DynamicImage {
        self.inner().render()
    }

    fn quality(&self) -> Option<u8> {
        self.inner().quality()
    }

    fn upload_file_name(&self) -> String {
        self.inner().upload_file_name()
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        self.inner().query_pairs()
    }
}

impl From<JpegPlainProfile> for ImageProfile {
    fn from(profile: JpegPlainProfile) -> Self {
        ImageProfile::JpegPlain(profile)
    }
}

impl From<PngPlainProfile> for ImageProfile {
    fn from(profile: PngPlainProfile) -> Self {
        ImageProfile::PngPlain(profile)
    }
}
