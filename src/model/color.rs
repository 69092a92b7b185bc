// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! RGBA colors and CSS color string parsing

use std::fmt;

/// RGBA color with every channel in `0.0..=1.0`, not premultiplied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel
    pub r: f64,
    /// Green channel
    pub g: f64,
    /// Blue channel
    pub b: f64,
    /// Alpha channel
    pub a: f64,
}

impl Color {
    /// Opaque black
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    /// Fully transparent black
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    /// Create a color from unit-range channels
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from 0-255 channels and a unit-range alpha, clamping out-of-range input
    pub fn from_rgba8(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: clamp_unit(r / 255.0),
            g: clamp_unit(g / 255.0),
            b: clamp_unit(b / 255.0),
            a: clamp_unit(a),
        }
    }

    /// Parse a CSS color string (hex, `rgb[a]()`, `hsl[a]()` or a named color)
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim().to_ascii_lowercase();

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(args) = function_args(&s, "rgba").or_else(|| function_args(&s, "rgb")) {
            return parse_rgb_args(args);
        }
        if let Some(args) = function_args(&s, "hsla").or_else(|| function_args(&s, "hsl")) {
            return parse_hsl_args(args);
        }
        named_color(&s)
    }

    /// Channels as `[r, g, b, a]` with red, green and blue scaled to 0-255
    pub fn to_rgba8(&self) -> [f64; 4] {
        [self.r * 255.0, self.g * 255.0, self.b * 255.0, self.a]
    }

    /// Linear interpolation between two colors, channel by channel
    pub fn interpolate(&self, to: &Color, t: f64) -> Color {
        Color {
            r: lerp(self.r, to.r, t),
            g: lerp(self.g, to.g, t),
            b: lerp(self.b, to.b, t),
            a: lerp(self.a, to.a, t),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        write!(
            f,
            "rgba({}, {}, {}, {})",
            r.round(),
            g.round(),
            b.round(),
            a
        )
    }
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn split_args(args: &str) -> Vec<&str> {
    args.split(|c| c == ',' || c == '/' || c == ' ')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1].repeat(2), 16).ok();
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    let [r, g, b, a] = match hex.len() {
        3 => [digit(0)?, digit(1)?, digit(2)?, 255],
        4 => [digit(0)?, digit(1)?, digit(2)?, digit(3)?],
        6 => [pair(0)?, pair(2)?, pair(4)?, 255],
        8 => [pair(0)?, pair(2)?, pair(4)?, pair(6)?],
        _ => return None,
    };
    Some(Color::from_rgba8(
        f64::from(r),
        f64::from(g),
        f64::from(b),
        f64::from(a) / 255.0,
    ))
}

fn parse_channel(part: &str) -> Option<f64> {
    match part.strip_suffix('%') {
        Some(pct) => pct.parse::<f64>().ok().map(|v| v / 100.0 * 255.0),
        None => part.parse::<f64>().ok(),
    }
}

fn parse_alpha(part: Option<&&str>) -> Option<f64> {
    match part {
        None => Some(1.0),
        Some(part) => match part.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok().map(|v| v / 100.0),
            None => part.parse::<f64>().ok(),
        },
    }
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let r = parse_channel(parts[0])?;
    let g = parse_channel(parts[1])?;
    let b = parse_channel(parts[2])?;
    let a = parse_alpha(parts.get(3))?;
    Some(Color::from_rgba8(r, g, b, a))
}

fn parse_hsl_args(args: &str) -> Option<Color> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let h = parts[0].trim_end_matches("deg").parse::<f64>().ok()?;
    let s = parts[1].strip_suffix('%')?.parse::<f64>().ok()? / 100.0;
    let l = parts[2].strip_suffix('%')?.parse::<f64>().ok()? / 100.0;
    let a = parse_alpha(parts.get(3))?;

    let s = clamp_unit(s);
    let l = clamp_unit(l);
    let h = h.rem_euclid(360.0) / 360.0;
    let q = if l <= 0.5 { l * (s + 1.0) } else { l + s - l * s };
    let p = l * 2.0 - q;

    Some(Color::new(
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
        clamp_unit(a),
    ))
}

fn hue_to_channel(p: f64, q: f64, h: f64) -> f64 {
    let h = h.rem_euclid(1.0);
    if h * 6.0 < 1.0 {
        p + (q - p) * h * 6.0
    } else if h * 2.0 < 1.0 {
        q
    } else if h * 3.0 < 2.0 {
        p + (q - p) * (2.0 / 3.0 - h) * 6.0
    } else {
        p
    }
}

fn named_color(name: &str) -> Option<Color> {
    if name == "transparent" {
        return Some(Color::TRANSPARENT);
    }
    let (r, g, b) = NAMED_COLORS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, rgb)| *rgb)?;
    Some(Color::from_rgba8(f64::from(r), f64::from(g), f64::from(b), 1.0))
}

/// CSS Color Module Level 4 named colors
const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("aliceblue", (240, 248, 255)), ("antiquewhite", (250, 235, 215)),
    ("aqua", (0, 255, 255)), ("aquamarine", (127, 255, 212)),
    ("azure", (240, 255, 255)), ("beige", (245, 245, 220)),
    ("bisque", (255, 228, 196)), ("black", (0, 0, 0)),
    ("blanchedalmond", (255, 235, 205)), ("blue", (0, 0, 255)),
    ("blueviolet", (138, 43, 226)), ("brown", (165, 42, 42)),
    ("burlywood", (222, 184, 135)), ("cadetblue", (95, 158, 160)),
    ("chartreuse", (127, 255, 0)), ("chocolate", (210, 105, 30)),
    ("coral", (255, 127, 80)), ("cornflowerblue", (100, 149, 237)),
    ("cornsilk", (255, 248, 220)), ("crimson", (220, 20, 60)),
    ("cyan", (0, 255, 255)), ("darkblue", (0, 0, 139)),
    ("darkcyan", (0, 139, 139)), ("darkgoldenrod", (184, 134, 11)),
    ("darkgray", (169, 169, 169)), ("darkgreen", (0, 100, 0)),
    ("darkgrey", (169, 169, 169)), ("darkkhaki", (189, 183, 107)),
    ("darkmagenta", (139, 0, 139)), ("darkolivegreen", (85, 107, 47)),
    ("darkorange", (255, 140, 0)), ("darkorchid", (153, 50, 204)),
    ("darkred", (139, 0, 0)), ("darksalmon", (233, 150, 122)),
    ("darkseagreen", (143, 188, 143)), ("darkslateblue", (72, 61, 139)),
    ("darkslategray", (47, 79, 79)), ("darkslategrey", (47, 79, 79)),
    ("darkturquoise", (0, 206, 209)), ("darkviolet", (148, 0, 211)),
    ("deeppink", (255, 20, 147)), ("deepskyblue", (0, 191, 255)),
    ("dimgray", (105, 105, 105)), ("dimgrey", (105, 105, 105)),
    ("dodgerblue", (30, 144, 255)), ("firebrick", (178, 34, 34)),
    ("floralwhite", (255, 250, 240)), ("forestgreen", (34, 139, 34)),
    ("fuchsia", (255, 0, 255)), ("gainsboro", (220, 220, 220)),
    ("ghostwhite", (248, 248, 255)), ("gold", (255, 215, 0)),
    ("goldenrod", (218, 165, 32)), ("gray", (128, 128, 128)),
    ("green", (0, 128, 0)), ("greenyellow", (173, 255, 47)),
    ("grey", (128, 128, 128)), ("honeydew", (240, 255, 240)),
    ("hotpink", (255, 105, 180)), ("indianred", (205, 92, 92)),
    ("indigo", (75, 0, 130)), ("ivory", (255, 255, 240)),
    ("khaki", (240, 230, 140)), ("lavender", (230, 230, 250)),
    ("lavenderblush", (255, 240, 245)), ("lawngreen", (124, 252, 0)),
    ("lemonchiffon", (255, 250, 205)), ("lightblue", (173, 216, 230)),
    ("lightcoral", (240, 128, 128)), ("lightcyan", (224, 255, 255)),
    ("lightgoldenrodyellow", (250, 250, 210)), ("lightgray", (211, 211, 211)),
    ("lightgreen", (144, 238, 144)), ("lightgrey", (211, 211, 211)),
    ("lightpink", (255, 182, 193)), ("lightsalmon", (255, 160, 122)),
    ("lightseagreen", (32, 178, 170)), ("lightskyblue", (135, 206, 250)),
    ("lightslategray", (119, 136, 153)), ("lightslategrey", (119, 136, 153)),
    ("lightsteelblue", (176, 196, 222)), ("lightyellow", (255, 255, 224)),
    ("lime", (0, 255, 0)), ("limegreen", (50, 205, 50)),
    ("linen", (250, 240, 230)), ("magenta", (255, 0, 255)),
    ("maroon", (128, 0, 0)), ("mediumaquamarine", (102, 205, 170)),
    ("mediumblue", (0, 0, 205)), ("mediumorchid", (186, 85, 211)),
    ("mediumpurple", (147, 112, 219)), ("mediumseagreen", (60, 179, 113)),
    ("mediumslateblue", (123, 104, 238)), ("mediumspringgreen", (0, 250, 154)),
    ("mediumturquoise", (72, 209, 204)), ("mediumvioletred", (199, 21, 133)),
    ("midnightblue", (25, 25, 112)), ("mintcream", (245, 255, 250)),
    ("mistyrose", (255, 228, 225)), ("moccasin", (255, 228, 181)),
    ("navajowhite", (255, 222, 173)), ("navy", (0, 0, 128)),
    ("oldlace", (253, 245, 230)), ("olive", (128, 128, 0)),
    ("olivedrab", (107, 142, 35)), ("orange", (255, 165, 0)),
    ("orangered", (255, 69, 0)), ("orchid", (218, 112, 214)),
    ("palegoldenrod", (238, 232, 170)), ("palegreen", (152, 251, 152)),
    ("paleturquoise", (175, 238, 238)), ("palevioletred", (219, 112, 147)),
    ("papayawhip", (255, 239, 213)), ("peachpuff", (255, 218, 185)),
    ("peru", (205, 133, 63)), ("pink", (255, 192, 203)),
    ("plum", (221, 160, 221)), ("powderblue", (176, 224, 230)),
    ("purple", (128, 0, 128)), ("rebeccapurple", (102, 51, 153)),
    ("red", (255, 0, 0)), ("rosybrown", (188, 143, 143)),
    ("royalblue", (65, 105, 225)), ("saddlebrown", (139, 69, 19)),
    ("salmon", (250, 128, 114)), ("sandybrown", (244, 164, 96)),
    ("seagreen", (46, 139, 87)), ("seashell", (255, 245, 238)),
    ("sienna", (160, 82, 45)), ("silver", (192, 192, 192)),
    ("skyblue", (135, 206, 235)), ("slateblue", (106, 90, 205)),
    ("slategray", (112, 128, 144)), ("slategrey", (112, 128, 144)),
    ("snow", (255, 250, 250)), ("springgreen", (0, 255, 127)),
    ("steelblue", (70, 130, 180)), ("tan", (210, 180, 140)),
    ("teal", (0, 128, 128)), ("thistle", (216, 191, 216)),
    ("tomato", (255, 99, 71)), ("turquoise", (64, 224, 208)),
    ("violet", (238, 130, 238)), ("wheat", (245, 222, 179)),
    ("white", (255, 255, 255)), ("whitesmoke", (245, 245, 245)),
    ("yellow", (255, 255, 0)), ("yellowgreen", (154, 205, 50)),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba8(color: Color) -> [f64; 4] {
        let [r, g, b, a] = color.to_rgba8();
        [r.round(), g.round(), b.round(), (a * 100.0).round() / 100.0]
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(rgba8(Color::parse("#f00").unwrap()), [255.0, 0.0, 0.0, 1.0]);
        assert_eq!(rgba8(Color::parse("#00ff0080").unwrap()), [0.0, 255.0, 0.0, 0.5]);
        assert!(Color::parse("#12345").is_none());
        assert!(Color::parse("#ggg").is_none());
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!(
            rgba8(Color::parse("rgb(10, 20, 30)").unwrap()),
            [10.0, 20.0, 30.0, 1.0]
        );
        assert_eq!(
            rgba8(Color::parse("rgba(10, 20, 30, 0.25)").unwrap()),
            [10.0, 20.0, 30.0, 0.25]
        );
        assert_eq!(
            rgba8(Color::parse("hsl(120, 100%, 50%)").unwrap()),
            [0.0, 255.0, 0.0, 1.0]
        );
        assert!(Color::parse("rgb(1, 2)").is_none());
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(rgba8(Color::parse("Tomato").unwrap()), [255.0, 99.0, 71.0, 1.0]);
        assert_eq!(Color::parse("transparent"), Some(Color::TRANSPARENT));
        assert!(Color::parse("not-a-color").is_none());
    }

    #[test]
    fn test_display_and_interpolate() {
        let mid = Color::BLACK.interpolate(&Color::new(1.0, 1.0, 1.0, 1.0), 0.5);
        assert_eq!(mid.to_string(), "rgba(128, 128, 128, 1)");
    }

    #[test]
    fn test_from_rgba8_clamps() {
        assert_eq!(Color::from_rgba8(300.0, -5.0, 0.0, 2.0), Color::new(1.0, 0.0, 0.0, 1.0));
    }
}
