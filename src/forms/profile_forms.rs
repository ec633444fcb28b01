use crate::forms::fields::{CleanedData, FieldKind, FieldSpec};
use crate::forms::query_error::{FieldErrors, QueryError};
use crate::image_ops::profiles::{
    ImageProfile, JpegPlainProfile, MAX_SIZE, MIN_SIZE, PngPlainProfile,
};
use log::warn;
use std::collections::HashMap;

/// Raw query parameters of a request
pub type QueryParams = HashMap<String, String>;

/// Field schema of one profile type plus the way to build the profile from it
#[derive(Debug)]
pub struct ProfileForm {
    pub profile_type: &'static str,
    pub description: &'static str,
    pub fields: &'static [FieldSpec],
    build: fn(&CleanedData) -> ImageProfile,
}

impl ProfileForm {
    /// Validate every declared field, collecting all failures before returning
    pub fn clean(&self, params: &QueryParams) -> Result<ImageProfile, QueryError> {
        let mut cleaned = CleanedData::default();
        let mut errors = FieldErrors::new();

        for field in self.fields {
            match field.clean(params.get(field.name).map(String::as_str)) {
                Ok(Some(value)) => cleaned.insert(field.name, value),
                Ok(None) => {}
                Err(messages) => {
                    errors.insert(field.name.to_string(), messages);
                }
            }
        }

        if !errors.is_empty() {
            return Err(QueryError::new(errors));
        }
        Ok((self.build)(&cleaned))
    }

    /// Profile built from the initial field values
    pub fn example_profile(&self) -> Option<ImageProfile> {
        let params: QueryParams = self
            .fields
            .iter()
            .map(|field| (field.name.to_string(), field.initial.to_string()))
            .collect();
        match self.clean(&params) {
            Ok(profile) => Some(profile),
            Err(err) => {
                warn!("Initial values of {} are invalid: {}", self.profile_type, err);
                None
            }
        }
    }
}

const SIZE_RANGE: FieldKind = FieldKind::Integer {
    min: MIN_SIZE as i64,
    max: MAX_SIZE as i64,
};

const COLOR_FIELD: FieldSpec = FieldSpec {
    name: "color_rgb",
    kind: FieldKind::HexColor,
    required: true,
    initial: "000000",
    help_text: "3 or 6 digit hex color code (e.g. 537FE7, fff)",
};

const WIDTH_FIELD: FieldSpec = FieldSpec {
    name: "width",
    kind: SIZE_RANGE,
    required: true,
    initial: "512",
    help_text: "Image width in px",
};

const HEIGHT_FIELD: FieldSpec = FieldSpec {
    name: "height",
    kind: SIZE_RANGE,
    required: true,
    initial: "512",
    help_text: "Image height in px",
};

fn build_jpeg_plain(data: &CleanedData) -> ImageProfile {
    let defaults = JpegPlainProfile::default();
    JpegPlainProfile::new(
        data.integer("width").unwrap_or(defaults.width() as i64),
        data.integer("height").unwrap_or(defaults.height() as i64),
        data.color("color_rgb").unwrap_or(defaults.color_rgb()),
        data.integer("quality")
            .unwrap_or(JpegPlainProfile::DEFAULT_QUALITY as i64),
    )
    .into()
}

fn build_png_plain(data: &CleanedData) -> ImageProfile {
    let defaults = PngPlainProfile::default();
    PngPlainProfile::new(
        data.integer("width").unwrap_or(defaults.width() as i64),
        data.integer("height").unwrap_or(defaults.height() as i64),
        data.color("color_rgb").unwrap_or(defaults.color_rgb()),
        data.integer("alpha").unwrap_or(defaults.alpha() as i64),
    )
    .into()
}

pub static JPEG_PLAIN_FORM: ProfileForm = ProfileForm {
    profile_type: JpegPlainProfile::PROFILE_TYPE,
    description: "Solid color JPEG image",
    fields: &[
        WIDTH_FIELD,
        HEIGHT_FIELD,
        COLOR_FIELD,
        FieldSpec {
            name: "quality",
            kind: FieldKind::Integer {
                min: JpegPlainProfile::MIN_QUALITY as i64,
                max: JpegPlainProfile::MAX_QUALITY as i64,
            },
            required: true,
            initial: "75",
            help_text: "JPEG quality",
        },
    ],
    build: build_jpeg_plain,
};

pub static PNG_PLAIN_FORM: ProfileForm = ProfileForm {
    profile_type: PngPlainProfile::PROFILE_TYPE,
    description: "Solid color PNG image",
    fields: &[
        WIDTH_FIELD,
        HEIGHT_FIELD,
        COLOR_FIELD,
        FieldSpec {
            name: "alpha",
            kind: FieldKind::Integer {
                min: PngPlainProfile::MIN_ALPHA as i64,
                max: PngPlainProfile::MAX_ALPHA as i64,
            },
            required: true,
            initial: "255",
            help_text: "Alpha value of every pixel",
        },
    ],
    build: build_png_plain,
};

/// Registered forms, in the order they are offered to clients
pub static PROFILE_FORMS: &[&ProfileForm] = &[&JPEG_PLAIN_FORM, &PNG_PLAIN_FORM];
