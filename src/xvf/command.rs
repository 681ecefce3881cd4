//! Typed XVF LED commands and their command-line encoding

use std::fmt;
use std::ops::RangeInclusive;

use super::error::XvfError;

/// Valid LED brightness values.
pub const BRIGHTNESS_RANGE: RangeInclusive<i64> = 0..=255;
/// Valid LED animation speed values.
pub const SPEED_RANGE: RangeInclusive<i64> = 0..=10;
/// Valid LED colors (0xRRGGBB, upper byte ignored by the firmware).
pub const COLOR_RANGE: RangeInclusive<i64> = 0..=0xFFFF_FFFF;

/// Command names understood by `xvf_host`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XvfCommand {
    LedEffect,
    LedBrightness,
    LedGammify,
    LedSpeed,
    LedColor,
}

impl XvfCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LedEffect => "LED_EFFECT",
            Self::LedBrightness => "LED_BRIGHTNESS",
            Self::LedGammify => "LED_GAMMIFY",
            Self::LedSpeed => "LED_SPEED",
            Self::LedColor => "LED_COLOR",
        }
    }
}

impl fmt::Display for XvfCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LED ring effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedEffect {
    Off,
    Breath,
    Rainbow,
    SingleColor,
    /// Direction of arrival: lights the LEDs facing the speaker
    Doa,
    /// Constant illumination in the current color.
    ///
    /// The firmware has no separate "on" mode; this is sent as the
    /// single-color code.
    Steady,
}

impl LedEffect {
    /// Raw `LED_EFFECT` value.
    pub fn code(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Breath => 1,
            Self::Rainbow => 2,
            Self::SingleColor | Self::Steady => 3,
            Self::Doa => 4,
        }
    }
}

/// One fire-and-forget instruction for the LED controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    Effect(LedEffect),
    Brightness(i64),
    Gammify(bool),
    Speed(i64),
    Color(i64),
}

impl DeviceCommand {
    pub fn tag(&self) -> XvfCommand {
        match self {
            Self::Effect(_) => XvfCommand::LedEffect,
            Self::Brightness(_) => XvfCommand::LedBrightness,
            Self::Gammify(_) => XvfCommand::LedGammify,
            Self::Speed(_) => XvfCommand::LedSpeed,
            Self::Color(_) => XvfCommand::LedColor,
        }
    }

    /// Integer argument passed after the tag.
    pub fn value(&self) -> i64 {
        match *self {
            Self::Effect(effect) => i64::from(effect.code()),
            Self::Gammify(enabled) => i64::from(enabled),
            Self::Brightness(v) | Self::Speed(v) | Self::Color(v) => v,
        }
    }

    /// Allowed value range, for commands that take a free integer.
    pub fn range(&self) -> Option<RangeInclusive<i64>> {
        match self {
            Self::Brightness(_) => Some(BRIGHTNESS_RANGE),
            Self::Speed(_) => Some(SPEED_RANGE),
            Self::Color(_) => Some(COLOR_RANGE),
            Self::Effect(_) | Self::Gammify(_) => None,
        }
    }

    pub fn validate(&self) -> Result<(), XvfError> {
        match self.range() {
            Some(range) if !range.contains(&self.value()) => Err(XvfError::Validation {
                command: self.tag(),
                value: self.value(),
                min: *range.start(),
                max: *range.end(),
            }),
            _ => Ok(()),
        }
    }

    /// Arguments for `xvf_host`: `[TAG, value]`.
    pub fn args(&self) -> [String; 2] {
        [self.tag().as_str().to_string(), self.value().to_string()]
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color(v) => write!(f, "{} 0x{:06X}", self.tag(), v),
            Self::Effect(effect) => write!(f, "{} {} ({:?})", self.tag(), self.value(), effect),
            _ => write!(f, "{} {}", self.tag(), self.value()),
        }
    }
}
