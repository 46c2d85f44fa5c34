//! Card grid geometry. The listing is a responsive grid below the page
//! banner and the listing controls; card positions decide when each card's
//! image comes near the viewport.

use crate::viewport::Rect;

/// Height of the image strip at the top of every card.
pub const IMAGE_HEIGHT: f64 = 180.0;

/// Geometry of the card grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    /// Distance from the top of the page to the first row of cards.
    pub top: f64,

    /// Horizontal padding on both sides of the grid.
    pub padding: f64,

    /// Space between adjacent cards, both ways.
    pub gap: f64,

    pub card_height: f64,
}

impl Default for Grid {
    fn default() -> Self {
        Grid {
            top: 480.0,
            padding: 56.0,
            gap: 16.0,
            card_height: 340.0,
        }
    }
}

impl Grid {
    /// One column on small screens, two on medium, four on large.
    pub fn columns(viewport_width: f64) -> usize {
        if viewport_width < 768.0 {
            1
        } else if viewport_width < 1024.0 {
            2
        } else {
            4
        }
    }

    /// The bounds of card `index` for a viewport `viewport_width` wide.
    pub fn card_bounds(&self, index: usize, viewport_width: f64) -> Rect {
        let columns = Self::columns(viewport_width);
        let gaps = self.gap * (columns - 1) as f64;
        let width = ((viewport_width - 2.0 * self.padding - gaps) / columns as f64).max(0.0);
        let (row, column) = (index / columns, index % columns);
        Rect::new(
            self.padding + column as f64 * (width + self.gap),
            self.top + row as f64 * (self.card_height + self.gap),
            width,
            self.card_height,
        )
    }

    /// The bounds of the image strip of card `index`.
    pub fn image_bounds(&self, index: usize, viewport_width: f64) -> Rect {
        let card = self.card_bounds(index, viewport_width);
        Rect::new(card.x, card.y, card.width, IMAGE_HEIGHT.min(card.height))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_columns() {
        assert_eq!(1, Grid::columns(375.0));
        assert_eq!(2, Grid::columns(768.0));
        assert_eq!(2, Grid::columns(1023.0));
        assert_eq!(4, Grid::columns(1280.0));
    }

    #[test]
    fn test_card_bounds_wide() {
        let grid = Grid::default();
        // (1280 - 112 - 48) / 4 = 280
        let first = grid.card_bounds(0, 1280.0);
        assert_eq!(Rect::new(56.0, 480.0, 280.0, 340.0), first);

        let fifth = grid.card_bounds(4, 1280.0);
        assert_eq!(56.0, fifth.x);
        assert_eq!(480.0 + 340.0 + 16.0, fifth.y);

        let fourth = grid.card_bounds(3, 1280.0);
        assert_eq!(56.0 + 3.0 * 296.0, fourth.x);
    }

    #[test]
    fn test_card_bounds_narrow() {
        let grid = Grid::default();
        let second = grid.card_bounds(1, 400.0);
        assert_eq!(56.0, second.x);
        assert_eq!(480.0 + 356.0, second.y);
        assert_eq!(288.0, second.width);
    }

    #[test]
    fn test_image_bounds() {
        let grid = Grid::default();
        let image = grid.image_bounds(2, 1280.0);
        assert_eq!(IMAGE_HEIGHT, image.height);
        assert_eq!(grid.card_bounds(2, 1280.0).y, image.y);
    }
}
