//! Cyclic image viewer arithmetic.
//!
//! A carousel over `total` images wraps in both directions: stepping
//! back from the first image lands on the last and stepping forward
//! from the last lands on the first. Indicator jumps outside the valid
//! range snap back to the first image.

/// Position within a post's image gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    index: usize,
    total: usize,
}

impl Carousel {
    /// A carousel positioned at `index`, snapped to 0 when out of range.
    /// `total` of zero yields an empty carousel that stays at 0.
    pub fn new(index: usize, total: usize) -> Self {
        let index = if index < total { index } else { 0 };
        Self { index, total }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// More than one image means previous/next controls are shown.
    pub fn has_controls(&self) -> bool {
        self.total > 1
    }

    pub fn previous(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        (self.index + self.total - 1) % self.total
    }

    pub fn next(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        (self.index + 1) % self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_wraps_from_first_to_last() {
        let carousel = Carousel::new(0, 3);
        assert_eq!(carousel.previous(), 2);
    }

    #[test]
    fn next_wraps_from_last_to_first() {
        let carousel = Carousel::new(2, 3);
        assert_eq!(carousel.next(), 0);
    }

    #[test]
    fn interior_steps_move_by_one() {
        let carousel = Carousel::new(1, 3);
        assert_eq!(carousel.previous(), 0);
        assert_eq!(carousel.next(), 2);
    }

    #[test]
    fn out_of_range_index_snaps_to_zero() {
        assert_eq!(Carousel::new(7, 3).index(), 0);
    }

    #[test]
    fn empty_gallery_never_divides_by_zero() {
        let carousel = Carousel::new(0, 0);
        assert_eq!(carousel.previous(), 0);
        assert_eq!(carousel.next(), 0);
        assert!(!carousel.has_controls());
    }

    #[test]
    fn single_image_hides_controls() {
        assert!(!Carousel::new(0, 1).has_controls());
        assert!(Carousel::new(0, 2).has_controls());
    }
}
