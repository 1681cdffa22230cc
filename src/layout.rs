//! Layout planning: margins, plotting-area bounds, and size classing.

use crate::template::ChartKind;

/// Canvas-size-derived bucket controlling default font and spacing scale, so
/// thumbnails stay legible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Compact,
    Preview,
    Full,
}

impl SizeClass {
    pub fn classify(width: u32, height: u32) -> Self {
        if width <= 350 && height <= 200 {
            SizeClass::Compact
        } else if width <= 550 && height <= 350 {
            SizeClass::Preview
        } else {
            SizeClass::Full
        }
    }

    pub fn font_scale(self) -> f64 {
        match self {
            SizeClass::Compact => 0.7,
            SizeClass::Preview => 0.85,
            SizeClass::Full => 1.0,
        }
    }

    /// Default font size in pixels for axis/label text at this class.
    pub fn base_font_px(self) -> u32 {
        ((12.0 * self.font_scale()).round() as u32).max(8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub margins: Margins,
    pub size_class: SizeClass,
}

impl Layout {
    pub fn plot_x(&self) -> i32 {
        self.margins.left
    }

    pub fn plot_y(&self) -> i32 {
        self.margins.top
    }

    pub fn plot_width(&self) -> i32 {
        (self.width as i32 - self.margins.left - self.margins.right).max(1)
    }

    pub fn plot_height(&self) -> i32 {
        (self.height as i32 - self.margins.top - self.margins.bottom).max(1)
    }

    pub fn plot_right(&self) -> i32 {
        self.plot_x() + self.plot_width()
    }

    pub fn plot_bottom(&self) -> i32 {
        self.plot_y() + self.plot_height()
    }

    pub fn plot_center(&self) -> (i32, i32) {
        (
            self.plot_x() + self.plot_width() / 2,
            self.plot_y() + self.plot_height() / 2,
        )
    }
}

/// Compute margins and plot bounds for a chart. Pie charts use symmetric
/// radial margins; all other types reserve extra bottom space for rotated
/// axis labels, and left/right margins stay equal so the plotted content is
/// visually centered regardless of label width.
pub fn plan(
    width: u32,
    height: u32,
    kind: ChartKind,
    padding: f64,
    rotate_x_labels: bool,
    has_title: bool,
) -> Layout {
    let size_class = SizeClass::classify(width, height);
    let scale = size_class.font_scale();
    let pad = padding.max(0.0) as i32;

    let margins = if kind.is_radial() {
        // Symmetric all around: wedges stay centered and outside labels get a
        // uniform ring of space.
        let ring = pad + (36.0 * scale) as i32;
        let top_extra = if has_title { (24.0 * scale) as i32 } else { 0 };
        Margins {
            top: ring + top_extra,
            right: ring,
            bottom: ring,
            left: ring,
        }
    } else {
        let title_space = if has_title { (26.0 * scale) as i32 } else { (8.0 * scale) as i32 };
        let x_label_space = if rotate_x_labels {
            (54.0 * scale) as i32
        } else {
            (30.0 * scale) as i32
        };
        let side = pad + (52.0 * scale) as i32;
        Margins {
            top: pad + title_space,
            right: side,
            bottom: pad + x_label_space,
            left: side,
        }
    };

    Layout {
        width,
        height,
        margins,
        size_class,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_class_thresholds() {
        assert_eq!(SizeClass::classify(350, 200), SizeClass::Compact);
        assert_eq!(SizeClass::classify(351, 200), SizeClass::Preview);
        assert_eq!(SizeClass::classify(550, 350), SizeClass::Preview);
        assert_eq!(SizeClass::classify(800, 600), SizeClass::Full);
    }

    #[test]
    fn test_left_right_symmetry() {
        let layout = plan(800, 600, ChartKind::Bar, 8.0, true, true);
        assert_eq!(layout.margins.left, layout.margins.right);
    }

    #[test]
    fn test_pie_symmetric_ring() {
        let layout = plan(600, 600, ChartKind::Pie, 10.0, false, false);
        assert_eq!(layout.margins.left, layout.margins.right);
        assert_eq!(layout.margins.top, layout.margins.bottom);
    }

    #[test]
    fn test_rotated_labels_reserve_more_bottom() {
        let flat = plan(800, 600, ChartKind::Bar, 8.0, false, false);
        let rotated = plan(800, 600, ChartKind::Bar, 8.0, true, false);
        assert!(rotated.margins.bottom > flat.margins.bottom);
    }

    #[test]
    fn test_plot_bounds_positive_even_when_tiny() {
        let layout = plan(40, 30, ChartKind::Bar, 8.0, false, true);
        assert!(layout.plot_width() >= 1);
        assert!(layout.plot_height() >= 1);
    }

    #[test]
    fn test_compact_fonts_smaller() {
        assert!(SizeClass::Compact.base_font_px() < SizeClass::Full.base_font_px());
    }
}
