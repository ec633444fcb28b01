use indexmap::IndexMap;
use serde::{Serialize, Serializer};

const CHANNEL_MIN: i64 = 0;
const CHANNEL_MAX: i64 = 255;

/// Solid RGB color with 8-bit channels.
///
/// Channels are clamped into `0..=255` on construction, out of range input is
/// never rejected.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorRgb {
    r: u8,
    g: u8,
    b: u8,
}

fn clamp_channel(value: i64) -> u8 {
    value.clamp(CHANNEL_MIN, CHANNEL_MAX) as u8
}

impl ColorRgb {
    pub fn new(r: i64, g: i64, b: i64) -> Self {
        ColorRgb {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
        }
    }

    pub fn r(&self) -> u8 {
        self.r
    }

    pub fn g(&self) -> u8 {
        self.g
    }

    pub fn b(&self) -> u8 {
        self.b
    }

    pub fn to_tuple(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Channels keyed by name, always in `r, g, b` order
    pub fn to_ordered_map(&self) -> IndexMap<&'static str, u8> {
        IndexMap::from([("r", self.r), ("g", self.g), ("b", self.b)])
    }

    /// Six digit uppercase hex code without leading `#`
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Parse a 3 or 6 digit hex color code (`abc`, `AABBCC`).
    ///
    /// Shorthand codes are expanded by doubling every digit, so `abc` is the
    /// same color as `aabbcc`. The error is the user facing message.
    pub fn from_hex(code: &str) -> Result<Self, String> {
        let invalid = || format!("{} is not a valid hex RGB color code.", code);

        if !code.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let full = match code.len() {
            3 => code.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => code.to_string(),
            _ => return Err(invalid()),
        };

        let mut channels = [0u8; 3];
        for (i, channel) in channels.iter_mut().enumerate() {
            *channel = u8::from_str_radix(&full[2 * i..2 * i + 2], 16).map_err(|_| invalid())?;
        }
        let [r, g, b] = channels;
        Ok(ColorRgb { r, g, b })
    }
}

impl Serialize for ColorRgb {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_ordered_map().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-1, 0)]
    #[case(-1000, 0)]
    #[case(256, 255)]
    #[case(i64::MAX, 255)]
    #[case(0, 0)]
    #[case(128, 128)]
    #[case(255, 255)]
    fn test_channels_are_clamped(#[case] input: i64, #[case] expected: u8) {
        let color = ColorRgb::new(input, input, input);
        assert_eq!(color.to_tuple(), (expected, expected, expected));
    }

    #[test]
    fn test_channels_clamped_independently() {
        let color = ColorRgb::new(-5, 100, 300);
        assert_eq!(color.to_tuple(), (0, 100, 255));
    }

    #[test]
    fn test_default_is_black() {
        assert_eq!(ColorRgb::default(), ColorRgb::new(0, 0, 0));
    }

    #[test]
    fn test_ordered_map_keeps_channel_order() {
        let map = ColorRgb::new(1, 2, 3).to_ordered_map();
        let entries: Vec<_> = map.into_iter().collect();
        assert_eq!(entries, vec![("r", 1), ("g", 2), ("b", 3)]);
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let json = serde_json::to_string(&ColorRgb::new(139, 86, 221)).unwrap();
        assert_eq!(json, r#"{"r":139,"g":86,"b":221}"#);
    }

    #[rstest]
    #[case("000", (0, 0, 0))]
    #[case("678", (102, 119, 136))]
    #[case("abc", (170, 187, 204))]
    #[case("fff", (255, 255, 255))]
    #[case("000000", (0, 0, 0))]
    #[case("324C96", (50, 76, 150))]
    #[case("C67345", (198, 115, 69))]
    #[case("FFFFFF", (255, 255, 255))]
    fn test_from_hex(#[case] code: &str, #[case] expected: (u8, u8, u8)) {
        assert_eq!(ColorRgb::from_hex(code).unwrap().to_tuple(), expected);
    }

    #[test]
    fn test_shorthand_equals_doubled_digits() {
        let digits = "0123456789abcdefABCDEF";
        for r in digits.chars() {
            for g in ["0", "7", "f"] {
                let short = format!("{}{}{}", r, g, r);
                let full = format!("{r}{r}{g}{g}{r}{r}");
                assert_eq!(
                    ColorRgb::from_hex(&short).unwrap(),
                    ColorRgb::from_hex(&full).unwrap(),
                    "{} != {}",
                    short,
                    full
                );
            }
        }
    }

    #[rstest]
    #[case("")]
    #[case("0")]
    #[case("00")]
    #[case("0000")]
    #[case("00000")]
    #[case("0000000")]
    #[case("00z")]
    #[case("00000z")]
    #[case("#fff")]
    #[case("ééé")]
    fn test_from_hex_invalid(#[case] code: &str) {
        let err = ColorRgb::from_hex(code).unwrap_err();
        assert_eq!(err, format!("{} is not a valid hex RGB color code.", code));
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(ColorRgb::new(133, 205, 253).to_hex(), "85CDFD");
        assert_eq!(ColorRgb::new(0, 10, 255).to_hex(), "000AFF");
    }
}
