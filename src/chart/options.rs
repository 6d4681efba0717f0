//! Chart and series options

/// RGBA color; alpha in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Composite this color over an opaque background
    pub fn over(self, background: Color) -> Color {
        let a = self.a.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| (fg as f32 * a + bg as f32 * (1.0 - a)).round() as u8;
        Color::rgb(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }
}

/// Container the surface is bound to, in display units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container {
    pub width: u32,
    pub height: u32,
}

impl Container {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub background: Color,
    pub text_color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOptions {
    pub vert_lines: Color,
    pub horz_lines: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeScaleOptions {
    pub time_visible: bool,
    pub seconds_visible: bool,
}

/// Surface-wide options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    pub layout: LayoutOptions,
    pub grid: GridOptions,
    pub width: u32,
    pub height: u32,
    pub time_scale: TimeScaleOptions,
}

impl ChartOptions {
    /// The fixed dark theme, sized to `width` x `height`
    pub fn dark(width: u32, height: u32) -> Self {
        Self {
            layout: LayoutOptions {
                background: Color::rgb(0x1a, 0x1a, 0x1a),
                text_color: Color::rgb(0xd1, 0xd5, 0xdb),
            },
            grid: GridOptions {
                vert_lines: Color::rgb(0x2b, 0x2b, 0x2b),
                horz_lines: Color::rgb(0x2b, 0x2b, 0x2b),
            },
            width,
            height,
            time_scale: TimeScaleOptions {
                time_visible: true,
                seconds_visible: true,
            },
        }
    }

    /// Apply a partial update, leaving unset fields untouched
    pub fn apply(&mut self, patch: &ChartOptionsPatch) {
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
    }
}

/// Partial update of [`ChartOptions`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartOptionsPatch {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ChartOptionsPatch {
    pub fn width(width: u32) -> Self {
        Self {
            width: Some(width),
            height: None,
        }
    }
}

/// Area series styling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaSeriesOptions {
    pub top_color: Color,
    pub bottom_color: Color,
    pub line_color: Color,
    pub line_width: u8,
}

impl Default for AreaSeriesOptions {
    fn default() -> Self {
        Self {
            top_color: Color::rgba(33, 150, 243, 0.56),
            bottom_color: Color::rgba(33, 150, 243, 0.04),
            line_color: Color::rgba(33, 150, 243, 1.0),
            line_width: 2,
        }
    }
}
