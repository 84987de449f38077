use crate::{Errors, EstimateClose, EPS};
use anyhow::Result;

/// Bounding box in the format (x1, y1, x2, y2): top-left and bottom-right corners
///
#[derive(Clone, Default, Debug, Copy)]
pub struct BoundingBox {
    _x1: f32,
    _y1: f32,
    _x2: f32,
    _y2: f32,
}

impl BoundingBox {
    /// Constructor
    ///
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            _x1: x1,
            _y1: y1,
            _x2: x2,
            _y2: y2,
        }
    }

    /// Constructor from (left, top, width, height), the format most detectors and MOT files use
    ///
    pub fn new_ltwh(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    pub fn x1(&self) -> f32 {
        self._x1
    }

    pub fn y1(&self) -> f32 {
        self._y1
    }

    pub fn x2(&self) -> f32 {
        self._x2
    }

    pub fn y2(&self) -> f32 {
        self._y2
    }

    pub fn width(&self) -> f32 {
        self._x2 - self._x1
    }

    pub fn height(&self) -> f32 {
        self._y2 - self._y1
    }

    /// Area of the box; inverted extents count as zero
    ///
    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    pub fn as_ltrb(&self) -> [f32; 4] {
        [self._x1, self._y1, self._x2, self._y2]
    }

    pub fn as_ltwh(&self) -> [f32; 4] {
        [self._x1, self._y1, self.width(), self.height()]
    }

    /// Checks that the box can be used as a Kalman measurement: finite coordinates,
    /// well-ordered corners and non-zero extents
    ///
    pub fn validate(&self) -> Result<()> {
        if self.as_ltrb().iter().any(|c| !c.is_finite()) {
            return Err(Errors::InvalidInput(format!("non-finite coordinates in {:?}", self)).into());
        }
        if self._x2 < self._x1 || self._y2 < self._y1 {
            return Err(Errors::InvalidInput(format!("inverted corners in {:?}", self)).into());
        }
        if self.width() <= 0.0 || self.height() <= 0.0 {
            return Err(Errors::InvalidInput(format!("zero-sized box {:?}", self)).into());
        }
        if !self.area().is_finite() {
            return Err(Errors::InvalidInput(format!("area of {:?} overflows", self)).into());
        }
        Ok(())
    }

    /// Area of the overlap of two boxes, 0 when they don't overlap
    ///
    pub fn intersection(l: &BoundingBox, r: &BoundingBox) -> f32 {
        let (x1, y1) = (l._x1.max(r._x1), l._y1.max(r._y1));
        let (x2, y2) = (l._x2.min(r._x2), l._y2.min(r._y2));

        let int_width = x2 - x1;
        let int_height = y2 - y1;

        if int_width > 0.0 && int_height > 0.0 {
            int_width * int_height
        } else {
            0.0
        }
    }
}

impl TryFrom<&[f32]> for BoundingBox {
    type Error = anyhow::Error;

    /// Takes the first four values as (x1, y1, x2, y2), extra values (score, class) are ignored
    ///
    fn try_from(v: &[f32]) -> Result<Self> {
        match v {
            [x1, y1, x2, y2, ..] => Ok(BoundingBox::new(*x1, *y1, *x2, *y2)),
            _ => Err(Errors::InvalidInput(format!(
                "bbox should contain at least 4 positions: x1,y1,x2,y2, got {}",
                v.len()
            ))
            .into()),
        }
    }
}

impl EstimateClose for BoundingBox {
    /// Allows comparing bboxes
    ///
    fn almost_same(&self, other: &Self, eps: f32) -> bool {
        (self._x1 - other._x1).abs() < eps
            && (self._y1 - other._y1).abs() < eps
            && (self._x2 - other._x2).abs() < eps
            && (self._y2 - other._y2).abs() < eps
    }
}

impl PartialEq<Self> for BoundingBox {
    fn eq(&self, other: &Self) -> bool {
        self.almost_same(other, EPS)
    }
}

/// Bounding box in the measurement space of the filter: center x, center y, area, aspect (w/h)
///
/// A box with zero height has an infinite (or NaN for 0/0) aspect. Such boxes are
/// rejected by [`BoundingBox::validate`] before they reach a filter.
///
#[derive(Clone, Default, Debug, Copy)]
pub struct StateBox {
    _cx: f32,
    _cy: f32,
    _area: f32,
    _aspect: f32,
}

impl StateBox {
    pub fn new(cx: f32, cy: f32, area: f32, aspect: f32) -> Self {
        Self {
            _cx: cx,
            _cy: cy,
            _area: area,
            _aspect: aspect,
        }
    }

    pub fn cx(&self) -> f32 {
        self._cx
    }

    pub fn cy(&self) -> f32 {
        self._cy
    }

    pub fn area(&self) -> f32 {
        self._area
    }

    pub fn aspect(&self) -> f32 {
        self._aspect
    }

    pub fn as_array(&self) -> [f32; 4] {
        [self._cx, self._cy, self._area, self._aspect]
    }
}

impl From<&BoundingBox> for StateBox {
    fn from(b: &BoundingBox) -> Self {
        let w = b.width();
        let h = b.height();
        StateBox {
            _cx: b._x1 + w / 2.0,
            _cy: b._y1 + h / 2.0,
            _area: w * h,
            _aspect: w / h,
        }
    }
}

impl From<BoundingBox> for StateBox {
    fn from(b: BoundingBox) -> Self {
        StateBox::from(&b)
    }
}

impl From<&StateBox> for BoundingBox {
    fn from(s: &StateBox) -> Self {
        let w = (s._area * s._aspect).max(0.0).sqrt();
        // collapsed state: keep the center instead of producing 0/0
        let h = if w > 0.0 { s._area / w } else { 0.0 };
        BoundingBox {
            _x1: s._cx - w / 2.0,
            _y1: s._cy - h / 2.0,
            _x2: s._cx + w / 2.0,
            _y2: s._cy + h / 2.0,
        }
    }
}

impl From<StateBox> for BoundingBox {
    fn from(s: StateBox) -> Self {
        BoundingBox::from(&s)
    }
}

impl EstimateClose for StateBox {
    fn almost_same(&self, other: &Self, eps: f32) -> bool {
        (self._cx - other._cx).abs() < eps
            && (self._cy - other._cy).abs() < eps
            && (self._area - other._area).abs() < eps
            && (self._aspect - other._aspect).abs() < eps
    }
}

/// Intersection over union of two boxes in `[0, 1]`
///
/// Disjoint boxes and boxes with non-positive union (degenerate geometry) give 0.
///
pub fn iou(l: &BoundingBox, r: &BoundingBox) -> f32 {
    let intersection = BoundingBox::intersection(l, r);
    let union = l.area() + r.area() - intersection;
    if !(union > 0.0) || intersection <= 0.0 {
        return 0.0;
    }
    let res = intersection / union;
    if res.is_finite() {
        res.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
