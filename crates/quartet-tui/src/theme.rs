use crossterm::style::Color;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub bg: Color,
    /// Default text color
    pub fg: Color,
    /// Tile border color
    pub border: Color,
    /// Tile under the cursor
    pub cursor_bg: Color,
    /// Tile in the current selection
    pub selected_bg: Color,
    /// Text on a locked or revealed tile
    pub locked_fg: Color,
    /// Error color
    pub error: Color,
    /// Success color
    pub success: Color,
    /// Info text color
    pub info: Color,
    /// Key binding text color
    pub key: Color,
    /// Tile backgrounds for solved groups, by group index
    pub groups: [Color; 4],
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb { r: 20, g: 22, b: 30 },
            fg: Color::Rgb { r: 230, g: 230, b: 240 },
            border: Color::Rgb { r: 70, g: 75, b: 90 },
            cursor_bg: Color::Rgb { r: 70, g: 90, b: 140 },
            selected_bg: Color::Rgb { r: 90, g: 95, b: 115 },
            locked_fg: Color::Rgb { r: 20, g: 22, b: 30 },
            error: Color::Rgb { r: 255, g: 90, b: 90 },
            success: Color::Rgb { r: 90, g: 255, b: 130 },
            info: Color::Rgb { r: 160, g: 165, b: 185 },
            key: Color::Rgb { r: 255, g: 210, b: 100 },
            groups: [
                Color::Rgb { r: 249, g: 223, b: 109 },
                Color::Rgb { r: 160, g: 195, b: 90 },
                Color::Rgb { r: 176, g: 196, b: 239 },
                Color::Rgb { r: 186, g: 129, b: 197 },
            ],
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Color::Rgb { r: 248, g: 248, b: 252 },
            fg: Color::Rgb { r: 30, g: 30, b: 40 },
            border: Color::Rgb { r: 180, g: 180, b: 195 },
            cursor_bg: Color::Rgb { r: 180, g: 200, b: 255 },
            selected_bg: Color::Rgb { r: 90, g: 94, b: 107 },
            locked_fg: Color::Rgb { r: 0, g: 0, b: 0 },
            error: Color::Rgb { r: 220, g: 50, b: 50 },
            success: Color::Rgb { r: 40, g: 160, b: 60 },
            info: Color::Rgb { r: 90, g: 90, b: 110 },
            key: Color::Rgb { r: 200, g: 120, b: 20 },
            groups: [
                Color::Rgb { r: 240, g: 200, b: 60 },
                Color::Rgb { r: 120, g: 170, b: 60 },
                Color::Rgb { r: 120, g: 160, b: 230 },
                Color::Rgb { r: 160, g: 100, b: 180 },
            ],
        }
    }

    pub fn high_contrast() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            border: Color::Grey,
            cursor_bg: Color::Blue,
            selected_bg: Color::DarkGrey,
            locked_fg: Color::Black,
            error: Color::Red,
            success: Color::Green,
            info: Color::Grey,
            key: Color::Yellow,
            groups: [Color::Yellow, Color::Green, Color::Cyan, Color::Magenta],
        }
    }

    /// Background of a tile in group `index`
    pub fn group(&self, index: usize) -> Color {
        self.groups[index % self.groups.len()]
    }
}
