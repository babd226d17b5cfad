/// 8-bit sRGB colour, parsed from and printed as `#rrggbb`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError {
    pub input: String,
}

impl std::fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid hex colour: {:?}", self.input)
    }
}

impl std::error::Error for ColorParseError {}

impl RgbColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or the short `#rgb` form. The leading `#` is optional.
    pub fn from_hex(input: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError {
            input: input.to_string(),
        };
        let hex = input.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return Err(err());
        }

        match hex.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
                Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            3 => {
                let channel = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| err())
                };
                Ok(Self::rgb(channel(0)?, channel(1)?, channel(2)?))
            }
            _ => Err(err()),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for RgbColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for RgbColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::RgbColor;

    #[test]
    fn parses_long_and_short_forms() {
        assert_eq!(RgbColor::from_hex("#ef4444"), Ok(RgbColor::rgb(0xef, 0x44, 0x44)));
        assert_eq!(RgbColor::from_hex("fff"), Ok(RgbColor::rgb(255, 255, 255)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(RgbColor::from_hex("#12345").is_err());
        assert!(RgbColor::from_hex("#zzzzzz").is_err());
        assert!(RgbColor::from_hex("#éé").is_err());
    }

    #[test]
    fn prints_lowercase_hex() {
        assert_eq!(RgbColor::rgb(0x3b, 0x82, 0xf6).to_string(), "#3b82f6");
    }
}
