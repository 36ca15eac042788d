use super::{Float3, Float4x4};

/// Axis-aligned bounding box.
///
/// An empty box has `min > max` on every axis and absorbs the first point
/// passed to [`Aabb::extend`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Float3,
    pub max: Float3,
}

impl Aabb {
    #[inline]
    pub const fn new(min: Float3, max: Float3) -> Self {
        Self { min, max }
    }

    #[inline]
    pub const fn empty() -> Self {
        Self {
            min: Float3::splat(f32::INFINITY),
            max: Float3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Float3>) -> Self {
        points.into_iter().fold(Self::empty(), |mut b, p| {
            b.extend(p);
            b
        })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[inline]
    pub fn extend(&mut self, p: Float3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(self, other: Aabb) -> Aabb {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Bounds of the eight transformed corners.
    pub fn transformed(&self, m: &Float4x4) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let (lo, hi) = (self.min, self.max);
        Aabb::from_points((0..8).map(|i| {
            let c = Float3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            m.transform_point3(c)
        }))
    }

    #[inline]
    pub fn center(&self) -> Float3 {
        if self.is_empty() {
            return Float3::ZERO;
        }
        (self.min + self.max) * 0.5
    }

    /// Half the diagonal length; zero for an empty box.
    #[inline]
    pub fn radius(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        (self.max - self.min).length() * 0.5
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_absorbs_first_point() {
        let mut b = Aabb::empty();
        assert!(b.is_empty());
        b.extend(Float3::new(1.0, 2.0, 3.0));
        assert!(!b.is_empty());
        assert_eq!(b.min, b.max);
    }

    #[test]
    fn union_ignores_empty_side() {
        let a = Aabb::new(Float3::ZERO, Float3::ONE);
        assert_eq!(a.union(Aabb::empty()), a);
        assert_eq!(Aabb::empty().union(a), a);
    }

    #[test]
    fn transformed_translates_corners() {
        let a = Aabb::new(Float3::ZERO, Float3::ONE);
        let t = a.transformed(&Float4x4::from_translation(Float3::new(5.0, 0.0, 0.0)));
        assert_eq!(t.min, Float3::new(5.0, 0.0, 0.0));
        assert_eq!(t.max, Float3::new(6.0, 1.0, 1.0));
    }

    #[test]
    fn center_and_radius() {
        let a = Aabb::new(Float3::splat(-1.0), Float3::splat(1.0));
        assert_eq!(a.center(), Float3::ZERO);
        assert!((a.radius() - 3f32.sqrt()).abs() < 1e-6);
        assert_eq!(Aabb::empty().radius(), 0.0);
    }
}
