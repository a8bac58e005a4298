/// Frame or texture extent in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of bytes a tightly packed 4-byte-per-pixel image of this size occupies.
    #[inline]
    pub fn byte_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// The rectangle `(0, 0, width, height)`.
    #[inline]
    pub fn bounds(self) -> PixelRect {
        PixelRect::new(0, 0, clamp_i32(self.width), clamp_i32(self.height))
    }
}

/// Axis-aligned rectangle in physical pixels (top-left origin).
///
/// Rectangles arrive from the browser engine and are not trusted: widths and
/// heights may be zero or negative and origins may lie outside the frame.
/// Callers clip against the frame with [`PixelRect::intersect`] before any
/// GPU write.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn from_size(size: PixelSize) -> Self {
        size.bounds()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(self) -> i64 {
        self.y as i64 + self.height as i64
    }

    #[inline]
    pub fn size(self) -> PixelSize {
        PixelSize::new(self.width.max(0) as u32, self.height.max(0) as u32)
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && (x as i64) < self.right() && (y as i64) < self.bottom()
    }

    #[inline]
    pub fn translate(self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Overlap of two rectangles, or `None` when they do not share any pixel.
    #[inline]
    pub fn intersect(self, other: PixelRect) -> Option<PixelRect> {
        if self.is_empty() || other.is_empty() {
            return None;
        }

        let x0 = self.x.max(other.x) as i64;
        let y0 = self.y.max(other.y) as i64;
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());

        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some(PixelRect::new(
                x0 as i32,
                y0 as i32,
                (x1 - x0) as i32,
                (y1 - y0) as i32,
            ))
        }
    }

    /// Smallest rectangle covering both inputs. Empty inputs are ignored.
    #[inline]
    pub fn union(self, other: PixelRect) -> PixelRect {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }

        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());

        PixelRect::new(
            x0,
            y0,
            clamp_i32_i64(x1 - x0 as i64),
            clamp_i32_i64(y1 - y0 as i64),
        )
    }

    /// Bounding box of every non-empty rectangle in `rects`.
    pub fn bounding<I>(rects: I) -> Option<PixelRect>
    where
        I: IntoIterator<Item = PixelRect>,
    {
        rects
            .into_iter()
            .filter(|r| !r.is_empty())
            .reduce(PixelRect::union)
    }
}

#[inline]
fn clamp_i32(v: u32) -> i32 {
    v.min(i32::MAX as u32) as i32
}

#[inline]
fn clamp_i32_i64(v: i64) -> i32 {
    v.clamp(0, i32::MAX as i64) as i32
}
