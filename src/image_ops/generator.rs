use crate::image_ops::image_types::Extensions;
use crate::image_ops::profiles::{ImageProfile, Profile};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::ImageError;
use log::debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("No such directory. base_dir: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode image: {0}")]
    Encoding(#[from] ImageError),
}

/// Renders profiles into image files
pub trait ImageGenerator {
    /// Write the rendered profile to `<output_dir>/tmp.<extension>` and return
    /// the written path
    fn generate(&self, profile: &ImageProfile, output_dir: &Path)
    -> Result<PathBuf, GenerateError>;
}

#[derive(Default)]
pub struct PlainImageGenerator;

impl ImageGenerator for PlainImageGenerator {
    fn generate(
        &self,
        profile: &ImageProfile,
        output_dir: &Path,
    ) -> Result<PathBuf, GenerateError> {
        if !output_dir.is_dir() {
            return Err(GenerateError::DirectoryNotFound(output_dir.to_path_buf()));
        }

        let extension = profile.extension();
        let path = output_dir.join(format!("tmp.{}", extension.name()));
        let img = profile.render();

        let mut writer = BufWriter::new(File::create(&path)?);
        match extension {
            Extensions::Jpeg => match profile.quality() {
                Some(quality) => {
                    img.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, quality))?
                }
                None => img.write_with_encoder(JpegEncoder::new(&mut writer))?,
            },
            Extensions::Png => img.write_with_encoder(PngEncoder::new(&mut writer))?,
        }
        writer.flush()?;

        debug!(
            "Generated {} image {}x{} at {}",
            extension.name(),
            img.width(),
            img.height(),
            path.display()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_ops::color::ColorRgb;
    use crate::image_ops::profiles::{JpegPlainProfile, PngPlainProfile};
    use image::GenericImageView;
    use tempdir::TempDir;

    #[test]
    fn test_generate_jpeg() {
        let temp_dir = TempDir::new("generator").expect("Failed to create temporary directory");
        let profile = ImageProfile::from(JpegPlainProfile::new(
            11,
            12,
            ColorRgb::new(143, 99, 196),
            70,
        ));

        let path = PlainImageGenerator.generate(&profile, temp_dir.path()).unwrap();

        assert_eq!(path, temp_dir.path().join("tmp.jpeg"));
        assert!(path.is_file());
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.dimensions(), (11, 12));
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_generate_png_keeps_alpha() {
        let temp_dir = TempDir::new("generator").expect("Failed to create temporary directory");
        let profile = ImageProfile::from(PngPlainProfile::new(
            9,
            10,
            ColorRgb::new(83, 183, 128),
            189,
        ));

        let path = PlainImageGenerator.generate(&profile, temp_dir.path()).unwrap();

        assert_eq!(path, temp_dir.path().join("tmp.png"));
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.dimensions(), (9, 10));
        assert_eq!(decoded.get_pixel(3, 3).0, [83, 183, 128, 189]);
    }

    #[test]
    fn test_generate_missing_directory() {
        let profile = ImageProfile::from(JpegPlainProfile::default());
        let err = PlainImageGenerator
            .generate(&profile, Path::new("/path/to/fake/dir"))
            .unwrap_err();

        assert!(matches!(err, GenerateError::DirectoryNotFound(_)));
        assert_eq!(
            err.to_string(),
            "No such directory. base_dir: /path/to/fake/dir"
        );
    }
}
