use serde::{Deserialize, Serialize};

/// Output resolution of a rendered export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Resolution {
    Hd720,
    #[default]
    FullHd1080,
    Uhd4k,
}

impl Resolution {
    /// Unrecognized names fall back to 1080p
    pub fn from_name(name: &str) -> Self {
        match name {
            "720p" => Self::Hd720,
            "1080p" => Self::FullHd1080,
            "4k" => Self::Uhd4k,
            _ => Self::FullHd1080,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Hd720 => "720p",
            Self::FullHd1080 => "1080p",
            Self::Uhd4k => "4k",
        }
    }

    /// Pixel (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Hd720 => (1280, 720),
            Self::FullHd1080 => (1920, 1080),
            Self::Uhd4k => (3840, 2160),
        }
    }
}

impl From<String> for Resolution {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl From<Resolution> for String {
    fn from(value: Resolution) -> Self {
        value.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_dimensions() {
        assert_eq!(Resolution::from_name("720p").dimensions(), (1280, 720));
        assert_eq!(Resolution::from_name("1080p").dimensions(), (1920, 1080));
        assert_eq!(Resolution::from_name("4k").dimensions(), (3840, 2160));
    }

    #[test]
    fn test_unknown_names_behave_like_1080p() {
        for name in ["", "480p", "4K", "8k", "1080"] {
            assert_eq!(Resolution::from_name(name), Resolution::FullHd1080);
        }
        assert_eq!(Resolution::default(), Resolution::FullHd1080);
    }

    #[test]
    fn test_serde_fallback() {
        let res: Resolution = serde_json::from_str("\"potato\"").unwrap();
        assert_eq!(res, Resolution::FullHd1080);
        assert_eq!(serde_json::to_string(&Resolution::Uhd4k).unwrap(), "\"4k\"");
    }
}
