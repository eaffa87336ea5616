use crate::srt::LineJoin;

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    /// Channels scaled to `0..=1`, the range the compositor expects.
    pub fn unit_rgb(&self) -> [f64; 3] {
        [self.r, self.g, self.b].map(|c| f64::from(c) / 255.0)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" => return Ok(Color::WHITE),
            "black" => return Ok(Color::BLACK),
            _ => (),
        }

        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("`{}` isn't a color (expected #RRGGBB, white or black)", s));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Color {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropShadow {
    pub opacity: f64,
    pub direction: f64,
    pub distance: f64,
    pub softness: f64,
}

impl Default for DropShadow {
    fn default() -> Self {
        Self {
            opacity: 75.0,
            direction: 135.0,
            distance: 5.0,
            softness: 10.0,
        }
    }
}

/// How a line boundary inside a caption is spelled in a string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LineBreak {
    /// `\r`, the paragraph break text layers use natively.
    Cr,
    /// `\n`
    Lf,
}

impl LineBreak {
    pub fn escape(self) -> &'static str {
        match self {
            LineBreak::Cr => "\\r",
            LineBreak::Lf => "\\n",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub font: String,
    pub font_size: f64,
    pub color: Color,
    pub stroke: Option<Stroke>,
    pub drop_shadow: Option<DropShadow>,
    pub line_join: LineJoin,
    pub line_break: LineBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Bold white text with a black outline, multi-line captions kept.
    Outlined,
    /// Plain white text with a drop shadow, captions on a single line.
    Classic,
}

impl Preset {
    pub fn style(self) -> Style {
        match self {
            Preset::Outlined => Style {
                font: "Arial-BoldMT".to_string(),
                font_size: 48.0,
                color: Color::WHITE,
                stroke: Some(Stroke {
                    color: Color::BLACK,
                    width: 3.0,
                }),
                drop_shadow: None,
                line_join: LineJoin::Preserve,
                line_break: LineBreak::Lf,
            },
            Preset::Classic => Style {
                font: "Arial".to_string(),
                font_size: 48.0,
                color: Color::WHITE,
                stroke: None,
                drop_shadow: Some(DropShadow::default()),
                line_join: LineJoin::Space,
                line_break: LineBreak::Cr,
            },
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Preset::Outlined.style()
    }
}
