//! Symbols: small vector drawings made of shapes and symmetries.
//!
//! Only the data the editing actions need is modelled here; drawing a
//! symbol is left to the host.
//!
//! A shape is a closed loop of [`ControlPoint`]s. The segment from point
//! `i` to point `i + 1` (wrapping around) is a line or a cubic curve whose
//! inner control points are `pos + delta_after` of the first and
//! `pos + delta_before` of the second.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A point or displacement in symbol coordinates (the unit square).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Linear interpolation from `self` (t = 0) to `other` (t = 1).
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Add for Vector2D {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2D {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2D {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2D {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vector2D {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector2D {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Kind of segment between two control points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentMode {
    #[default]
    Line,
    Curve,
}

/// How the two handles of a control point are tied together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockMode {
    #[default]
    Free,
    /// Handles point in opposite directions.
    Direction,
    /// Handles are mirror images.
    Size,
}

/// One of the two handles of a control point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WhichHandle {
    Before,
    After,
}

impl WhichHandle {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            WhichHandle::Before => WhichHandle::After,
            WhichHandle::After => WhichHandle::Before,
        }
    }
}

/// A control point of a shape.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub pos: Vector2D,
    pub delta_before: Vector2D,
    pub delta_after: Vector2D,
    pub segment_before: SegmentMode,
    pub segment_after: SegmentMode,
    pub lock: LockMode,
}

impl ControlPoint {
    /// A corner point joined to its neighbours by lines.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            pos: Vector2D::new(x, y),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn handle(&self, which: WhichHandle) -> Vector2D {
        match which {
            WhichHandle::Before => self.delta_before,
            WhichHandle::After => self.delta_after,
        }
    }

    pub fn handle_mut(&mut self, which: WhichHandle) -> &mut Vector2D {
        match which {
            WhichHandle::Before => &mut self.delta_before,
            WhichHandle::After => &mut self.delta_after,
        }
    }

    #[must_use]
    pub fn segment(&self, which: WhichHandle) -> SegmentMode {
        match which {
            WhichHandle::Before => self.segment_before,
            WhichHandle::After => self.segment_after,
        }
    }

    pub fn segment_mut(&mut self, which: WhichHandle) -> &mut SegmentMode {
        match which {
            WhichHandle::Before => &mut self.segment_before,
            WhichHandle::After => &mut self.segment_after,
        }
    }

    /// Re-establish the lock after `which` handle was moved, by adjusting
    /// the other handle.
    pub fn on_update_handle(&mut self, which: WhichHandle) {
        let moved = self.handle(which);
        let lock = self.lock;
        let other = self.handle_mut(which.other());
        match lock {
            LockMode::Free => {}
            LockMode::Direction => {
                let len = moved.length();
                if len > 0.0 {
                    *other = -moved * (other.length() / len);
                }
            }
            LockMode::Size => *other = -moved,
        }
    }

    /// Re-establish the lock after the lock mode changed; the `before`
    /// handle leads.
    pub fn on_update_lock(&mut self) {
        self.on_update_handle(WhichHandle::Before);
    }
}

/// A closed shape.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolShape {
    pub name: String,
    pub points: Vec<ControlPoint>,
}

impl SymbolShape {
    #[must_use]
    pub fn new(name: impl Into<String>, points: Vec<ControlPoint>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Index of the point following `i` around the loop.
    #[must_use]
    pub fn next_index(&self, i: usize) -> usize {
        if self.points.is_empty() {
            0
        } else {
            (i + 1) % self.points.len()
        }
    }

    /// Point on the segment starting at point `i`, at time `t`.
    #[must_use]
    pub fn point_at(&self, i: usize, t: f64) -> Option<Vector2D> {
        let p1 = self.points.get(i)?;
        let p2 = self.points.get(self.next_index(i))?;
        Some(match p1.segment_after {
            SegmentMode::Line => p1.pos.lerp(p2.pos, t),
            SegmentMode::Curve => {
                let c1 = p1.pos + p1.delta_after;
                let c2 = p2.pos + p2.delta_before;
                let u = 1.0 - t;
                p1.pos * (u * u * u)
                    + c1 * (3.0 * u * u * t)
                    + c2 * (3.0 * u * t * t)
                    + p2.pos * (t * t * t)
            }
        })
    }
}

/// Kind of symmetry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymmetryKind {
    #[default]
    Rotation,
    Reflection,
}

/// A symmetry applied to the shapes of a symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymbolSymmetry {
    pub name: String,
    pub kind: SymmetryKind,
    pub copies: u32,
    pub center: Vector2D,
    /// Direction of the first mirror line, relative to the center.
    pub handle: Vector2D,
}

impl SymbolSymmetry {
    #[must_use]
    pub fn new(kind: SymmetryKind, copies: u32) -> Self {
        let mut symmetry = Self {
            name: String::new(),
            kind,
            copies,
            center: Vector2D::new(0.5, 0.5),
            handle: Vector2D::new(0.2, 0.0),
        };
        symmetry.name = symmetry.expected_name();
        symmetry
    }

    /// The name this symmetry gets when the user has not renamed it.
    #[must_use]
    pub fn expected_name(&self) -> String {
        match self.kind {
            SymmetryKind::Rotation => format!("Rotation ({})", self.copies),
            SymmetryKind::Reflection => format!("Reflection ({})", self.copies),
        }
    }
}

/// A part of a symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SymbolPart {
    Shape(SymbolShape),
    Symmetry(SymbolSymmetry),
}

/// A symbol.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub parts: Vec<SymbolPart>,
}

impl Symbol {
    #[must_use]
    pub fn new(parts: Vec<SymbolPart>) -> Self {
        Self { parts }
    }

    #[must_use]
    pub fn shape(&self, part: usize) -> Option<&SymbolShape> {
        match self.parts.get(part)? {
            SymbolPart::Shape(shape) => Some(shape),
            SymbolPart::Symmetry(_) => None,
        }
    }

    pub fn shape_mut(&mut self, part: usize) -> Option<&mut SymbolShape> {
        match self.parts.get_mut(part)? {
            SymbolPart::Shape(shape) => Some(shape),
            SymbolPart::Symmetry(_) => None,
        }
    }

    #[must_use]
    pub fn symmetry(&self, part: usize) -> Option<&SymbolSymmetry> {
        match self.parts.get(part)? {
            SymbolPart::Symmetry(symmetry) => Some(symmetry),
            SymbolPart::Shape(_) => None,
        }
    }

    pub fn symmetry_mut(&mut self, part: usize) -> Option<&mut SymbolSymmetry> {
        match self.parts.get_mut(part)? {
            SymbolPart::Symmetry(symmetry) => Some(symmetry),
            SymbolPart::Shape(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_lock_mirrors() {
        let mut p = ControlPoint::new(0.5, 0.5);
        p.lock = LockMode::Size;
        p.delta_after = Vector2D::new(0.1, 0.2);
        p.on_update_handle(WhichHandle::After);
        assert_eq!(p.delta_before, Vector2D::new(-0.1, -0.2));
    }

    #[test]
    fn test_direction_lock_keeps_length() {
        let mut p = ControlPoint::new(0.0, 0.0);
        p.lock = LockMode::Direction;
        p.delta_before = Vector2D::new(0.0, 3.0);
        p.delta_after = Vector2D::new(4.0, 0.0);
        p.on_update_handle(WhichHandle::After);
        assert_eq!(p.delta_before, Vector2D::new(-3.0, 0.0));
    }

    #[test]
    fn test_point_at() {
        let shape = SymbolShape::new(
            "s",
            vec![ControlPoint::new(0.0, 0.0), ControlPoint::new(1.0, 0.0)],
        );
        assert_eq!(shape.point_at(0, 0.5), Some(Vector2D::new(0.5, 0.0)));
        assert_eq!(shape.next_index(1), 0);
        assert_eq!(shape.point_at(5, 0.5), None);
    }

    #[test]
    fn test_symbol_serde() {
        let symbol = Symbol::new(vec![
            SymbolPart::Shape(SymbolShape::new("a", vec![ControlPoint::new(0.1, 0.2)])),
            SymbolPart::Symmetry(SymbolSymmetry::new(SymmetryKind::Reflection, 2)),
        ]);
        let json = serde_json::to_string(&symbol).unwrap();
        let back: Symbol = serde_json::from_str(&json).unwrap();
        assert_eq!(back, symbol);
        assert_eq!(back.symmetry(1).map(|s| s.name.as_str()), Some("Reflection (2)"));
    }
}
