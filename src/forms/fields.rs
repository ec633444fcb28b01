use crate::image_ops::color::ColorRgb;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::Serialize;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const NOT_INTEGER_MESSAGE: &str = "Enter a whole number.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer { min: i64, max: i64 },
    /// 3 or 6 digit hex RGB code
    HexColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKindName {
    Integer,
    HexColor,
}

/// One declared input field of a profile form
#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub initial: &'static str,
    pub help_text: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    Integer(i64),
    Color(ColorRgb),
}

/// `10.0` and `10.` are whole numbers too
fn strip_zero_fraction(value: &str) -> &str {
    match value.rsplit_once('.') {
        Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => whole,
        _ => value,
    }
}

impl FieldSpec {
    pub fn kind_name(&self) -> FieldKindName {
        match self.kind {
            FieldKind::Integer { .. } => FieldKindName::Integer,
            FieldKind::HexColor => FieldKindName::HexColor,
        }
    }

    /// Parse and range check a raw value.
    ///
    /// `Ok(None)` means an optional field was left out.
    pub fn clean(&self, raw: Option<&str>) -> Result<Option<FieldValue>, Vec<String>> {
        let value = match raw.map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ if self.required => return Err(vec![REQUIRED_MESSAGE.to_string()]),
            _ => return Ok(None),
        };

        match self.kind {
            FieldKind::Integer { min, max } => {
                let number = strip_zero_fraction(value)
                    .parse::<i64>()
                    .map_err(|_| vec![NOT_INTEGER_MESSAGE.to_string()])?;
                let mut errors = Vec::new();
                if number > max {
                    errors.push(format!(
                        "Ensure this value is less than or equal to {}.",
                        max
                    ));
                }
                if number < min {
                    errors.push(format!(
                        "Ensure this value is greater than or equal to {}.",
                        min
                    ));
                }
                match errors.is_empty() {
                    true => Ok(Some(FieldValue::Integer(number))),
                    false => Err(errors),
                }
            }
            FieldKind::HexColor => ColorRgb::from_hex(value)
                .map(|color| Some(FieldValue::Color(color)))
                .map_err(|message| vec![message]),
        }
    }
}

/// Successfully cleaned field values of one form
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanedData {
    values: IndexMap<&'static str, FieldValue>,
}

impl CleanedData {
    pub fn insert(&mut self, name: &'static str, value: FieldValue) {
        self.values.insert(name, value);
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(FieldValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn color(&self, name: &str) -> Option<ColorRgb> {
        match self.values.get(name) {
            Some(FieldValue::Color(value)) => Some(*value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const WIDTH: FieldSpec = FieldSpec {
        name: "width",
        kind: FieldKind::Integer { min: 1, max: 15360 },
        required: true,
        initial: "512",
        help_text: "",
    };

    const COLOR: FieldSpec = FieldSpec {
        name: "color_rgb",
        kind: FieldKind::HexColor,
        required: true,
        initial: "000000",
        help_text: "",
    };

    const OPTIONAL: FieldSpec = FieldSpec {
        name: "optional",
        kind: FieldKind::Integer { min: 0, max: 10 },
        required: false,
        initial: "",
        help_text: "",
    };

    #[rstest]
    #[case("1", 1)]
    #[case("512", 512)]
    #[case(" 15360 ", 15360)]
    #[case("+7", 7)]
    #[case("10.0", 10)]
    #[case("10.", 10)]
    #[case(" 48.000 ", 48)]
    fn test_integer_valid(#[case] raw: &str, #[case] expected: i64) {
        assert_eq!(WIDTH.clean(Some(raw)), Ok(Some(FieldValue::Integer(expected))));
    }

    #[rstest]
    #[case("abc")]
    #[case("1.5")]
    #[case("10.01")]
    #[case(".0")]
    #[case("99999999999999999999999")]
    fn test_integer_not_a_number(#[case] raw: &str) {
        assert_eq!(
            WIDTH.clean(Some(raw)),
            Err(vec![NOT_INTEGER_MESSAGE.to_string()])
        );
    }

    #[test]
    fn test_integer_out_of_range() {
        assert_eq!(
            WIDTH.clean(Some("15361")),
            Err(vec![
                "Ensure this value is less than or equal to 15360.".to_string()
            ])
        );
        assert_eq!(
            WIDTH.clean(Some("0")),
            Err(vec![
                "Ensure this value is greater than or equal to 1.".to_string()
            ])
        );
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    fn test_required_missing(#[case] raw: Option<&str>) {
        assert_eq!(WIDTH.clean(raw), Err(vec![REQUIRED_MESSAGE.to_string()]));
    }

    #[test]
    fn test_optional_missing() {
        assert_eq!(OPTIONAL.clean(None), Ok(None));
    }

    #[test]
    fn test_color() {
        assert_eq!(
            COLOR.clean(Some("abc")),
            Ok(Some(FieldValue::Color(ColorRgb::new(170, 187, 204))))
        );
        assert_eq!(
            COLOR.clean(Some("00z")),
            Err(vec!["00z is not a valid hex RGB color code.".to_string()])
        );
    }

    #[test]
    fn test_cleaned_data_typed_access() {
        let mut data = CleanedData::default();
        data.insert("width", FieldValue::Integer(5));
        data.insert("color_rgb", FieldValue::Color(ColorRgb::new(1, 2, 3)));

        assert_eq!(data.integer("width"), Some(5));
        assert_eq!(data.color("color_rgb"), Some(ColorRgb::new(1, 2, 3)));
        assert_eq!(data.integer("color_rgb"), None);
        assert_eq!(data.integer("height"), None);
    }
}
