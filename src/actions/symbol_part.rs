//! Actions on the insides of a symbol: control points, handles, segments
//! and symmetries.
//!
//! Points are addressed by part index and point index. Drag gestures are
//! added to the stack once and then extended with `move_by`, which always
//! recomputes from the state at the start of the drag, so rounding does
//! not accumulate.

use std::any::Any;

use smallvec::SmallVec;

use crate::data::{
    ControlPoint, LockMode, SegmentMode, Symbol, SymbolShape, SymmetryKind, Vector2D,
    WhichHandle,
};

use super::Action;

// === Vector helpers ===

/// Constrain `v` to be horizontal, vertical or diagonal.
///
/// Does nothing unless `constrain` is set. With `only_diagonal` the result
/// is always diagonal.
#[must_use]
pub fn constrain_vector(v: Vector2D, constrain: bool, only_diagonal: bool) -> Vector2D {
    if !constrain {
        return v;
    }
    let (ax, ay) = (v.x.abs(), v.y.abs());
    if ax * 2.0 < ay && !only_diagonal {
        Vector2D::new(0.0, v.y)
    } else if ay * 2.0 < ax && !only_diagonal {
        Vector2D::new(v.x, 0.0)
    } else {
        let a = (ax + ay) / 2.0;
        Vector2D::new(a.copysign(v.x), a.copysign(v.y))
    }
}

/// Snap `v` to a grid with `steps` lines per unit. `0` does not snap.
#[must_use]
pub fn snap_vector(v: Vector2D, steps: i32) -> Vector2D {
    if steps <= 0 {
        return v;
    }
    let s = f64::from(steps);
    Vector2D::new((v.x * s).round() / s, (v.y * s).round() / s)
}

/// `v` moved by `d`, with `d` possibly constrained and the result snapped.
#[must_use]
pub fn constrain_snap_vector(v: Vector2D, d: Vector2D, constrain: bool, steps: i32) -> Vector2D {
    snap_vector(v + constrain_vector(d, constrain, false), steps)
}

/// The delta that moves `off` by `d` (possibly constrained) onto the grid.
#[must_use]
pub fn constrain_snap_vector_offset(off: Vector2D, d: Vector2D, constrain: bool, steps: i32) -> Vector2D {
    constrain_snap_vector(off, d, constrain, steps) - off
}

/// Like [`constrain_snap_vector_offset`] for two anchors; whichever snaps
/// closer to the unsnapped delta wins.
#[must_use]
pub fn constrain_snap_vector_offset2(
    off1: Vector2D,
    off2: Vector2D,
    d: Vector2D,
    constrain: bool,
    steps: i32,
) -> Vector2D {
    let wanted = constrain_vector(d, constrain, false);
    let d1 = constrain_snap_vector_offset(off1, d, constrain, steps);
    let d2 = constrain_snap_vector_offset(off2, d, constrain, steps);
    if (d1 - wanted).length() <= (d2 - wanted).length() {
        d1
    } else {
        d2
    }
}

macro_rules! any_impl {
    () => {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    };
}

// === Moving points ===

/// Moves a selection of control points.
#[derive(Debug)]
pub struct ControlPointMoveAction {
    part: usize,
    points: SmallVec<[usize; 4]>,
    /// Positions before the move; after a perform, the other state.
    old_positions: SmallVec<[Vector2D; 4]>,
    delta: Vector2D,
    pub constrain: bool,
    pub snap: i32,
}

impl ControlPointMoveAction {
    /// Start moving `points` of shape `part`. `None` if the selection is
    /// empty or does not exist. Repeated indices count once.
    #[must_use]
    pub fn new(symbol: &Symbol, part: usize, points: &[usize]) -> Option<Self> {
        let shape = symbol.shape(part)?;
        let mut unique: SmallVec<[usize; 4]> = SmallVec::with_capacity(points.len());
        for &i in points {
            if !unique.contains(&i) {
                unique.push(i);
            }
        }
        let old_positions = unique
            .iter()
            .map(|&i| shape.points.get(i).map(|p| p.pos))
            .collect::<Option<SmallVec<[Vector2D; 4]>>>()?;
        if old_positions.is_empty() {
            return None;
        }
        Some(Self {
            part,
            points: unique,
            old_positions,
            delta: Vector2D::default(),
            constrain: false,
            snap: 0,
        })
    }

    /// Move by `delta` more. The first point snaps to the grid; the rest
    /// keep their distance to it.
    pub fn move_by(&mut self, symbol: &mut Symbol, delta: Vector2D) {
        self.delta += delta;
        let d = constrain_snap_vector_offset(self.old_positions[0], self.delta, self.constrain, self.snap);
        let Some(shape) = symbol.shape_mut(self.part) else {
            return;
        };
        for (&i, &old) in self.points.iter().zip(&self.old_positions) {
            if let Some(p) = shape.points.get_mut(i) {
                p.pos = old + d;
            }
        }
    }
}

impl Action<Symbol> for ControlPointMoveAction {
    fn name(&self, _to_undo: bool) -> String {
        if self.points.len() == 1 {
            "Move control point".to_string()
        } else {
            "Move control points".to_string()
        }
    }

    fn perform(&mut self, symbol: &mut Symbol, _to_undo: bool) {
        let Some(shape) = symbol.shape_mut(self.part) else {
            return;
        };
        for (&i, old) in self.points.iter().zip(self.old_positions.iter_mut()) {
            if let Some(p) = shape.points.get_mut(i) {
                std::mem::swap(&mut p.pos, old);
            }
        }
    }

    any_impl!();
}

/// Moves one handle of a control point.
#[derive(Debug)]
pub struct HandleMoveAction {
    part: usize,
    point: usize,
    handle: WhichHandle,
    old_handle: Vector2D,
    /// The other handle may change through the point's lock.
    old_other: Vector2D,
    delta: Vector2D,
    pub constrain: bool,
    pub snap: i32,
}

impl HandleMoveAction {
    #[must_use]
    pub fn new(symbol: &Symbol, part: usize, point: usize, handle: WhichHandle) -> Option<Self> {
        let p = symbol.shape(part)?.points.get(point)?;
        Some(Self {
            part,
            point,
            handle,
            old_handle: p.handle(handle),
            old_other: p.handle(handle.other()),
            delta: Vector2D::default(),
            constrain: false,
            snap: 0,
        })
    }

    /// Move the handle by `delta` more; its end point snaps to the grid.
    pub fn move_by(&mut self, symbol: &mut Symbol, delta: Vector2D) {
        self.delta += delta;
        let Some(p) = symbol.shape_mut(self.part).and_then(|s| s.points.get_mut(self.point)) else {
            return;
        };
        let end = p.pos + self.old_handle;
        let d = constrain_snap_vector_offset(end, self.delta, self.constrain, self.snap);
        *p.handle_mut(self.handle) = self.old_handle + d;
        *p.handle_mut(self.handle.other()) = self.old_other;
        p.on_update_handle(self.handle);
    }
}

impl Action<Symbol> for HandleMoveAction {
    fn name(&self, _to_undo: bool) -> String {
        "Move handle".to_string()
    }

    fn perform(&mut self, symbol: &mut Symbol, _to_undo: bool) {
        let Some(p) = symbol.shape_mut(self.part).and_then(|s| s.points.get_mut(self.point)) else {
            return;
        };
        std::mem::swap(p.handle_mut(self.handle), &mut self.old_handle);
        std::mem::swap(p.handle_mut(self.handle.other()), &mut self.old_other);
    }

    any_impl!();
}

// === Point updates ===

/// Swaps a control point with a modified copy.
///
/// Make the update, change `other`, then perform: each perform toggles
/// between the two versions.
#[derive(Clone, Debug)]
pub struct ControlPointUpdate {
    pub index: usize,
    pub other: ControlPoint,
}

impl ControlPointUpdate {
    /// An update whose `other` starts as a copy of the point.
    #[must_use]
    pub fn new(shape: &SymbolShape, index: usize) -> Option<Self> {
        Some(Self {
            index,
            other: shape.points.get(index)?.clone(),
        })
    }

    pub fn perform(&mut self, shape: &mut SymbolShape) {
        if let Some(p) = shape.points.get_mut(self.index) {
            std::mem::swap(p, &mut self.other);
        }
    }
}

/// Turns the segment after a point into a line or a curve.
#[derive(Debug)]
pub struct SegmentModeAction {
    part: usize,
    mode: SegmentMode,
    point1: ControlPointUpdate,
    point2: ControlPointUpdate,
}

impl SegmentModeAction {
    /// Change the segment from point `index` to the next one.
    #[must_use]
    pub fn new(symbol: &Symbol, part: usize, index: usize, mode: SegmentMode) -> Option<Self> {
        let shape = symbol.shape(part)?;
        let next = shape.next_index(index);
        // a single point has no segment
        if next == index {
            return None;
        }
        let mut point1 = ControlPointUpdate::new(shape, index)?;
        let mut point2 = ControlPointUpdate::new(shape, next)?;
        let (p1, p2) = (&mut point1.other, &mut point2.other);
        match mode {
            SegmentMode::Line => {
                p1.delta_after = Vector2D::default();
                p2.delta_before = Vector2D::default();
                p1.lock = LockMode::Free;
                p2.lock = LockMode::Free;
            }
            SegmentMode::Curve => {
                p1.delta_after = (p2.pos - p1.pos) / 3.0;
                p2.delta_before = (p1.pos - p2.pos) / 3.0;
            }
        }
        p1.segment_after = mode;
        p2.segment_before = mode;
        Some(Self {
            part,
            mode,
            point1,
            point2,
        })
    }

    fn swap(&mut self, symbol: &mut Symbol) {
        if let Some(shape) = symbol.shape_mut(self.part) {
            self.point1.perform(shape);
            self.point2.perform(shape);
        }
    }
}

impl Action<Symbol> for SegmentModeAction {
    fn name(&self, _to_undo: bool) -> String {
        match self.mode {
            SegmentMode::Line => "Convert to line".to_string(),
            SegmentMode::Curve => "Convert to curve".to_string(),
        }
    }

    fn perform(&mut self, symbol: &mut Symbol, _to_undo: bool) {
        self.swap(symbol);
    }

    any_impl!();
}

/// Changes how the handles of a point are locked together.
#[derive(Debug)]
pub struct LockModeAction {
    part: usize,
    point: ControlPointUpdate,
}

impl LockModeAction {
    #[must_use]
    pub fn new(symbol: &Symbol, part: usize, index: usize, mode: LockMode) -> Option<Self> {
        let mut point = ControlPointUpdate::new(symbol.shape(part)?, index)?;
        point.other.lock = mode;
        point.other.on_update_lock();
        Some(Self { part, point })
    }
}

impl Action<Symbol> for LockModeAction {
    fn name(&self, _to_undo: bool) -> String {
        "Lock point".to_string()
    }

    fn perform(&mut self, symbol: &mut Symbol, _to_undo: bool) {
        if let Some(shape) = symbol.shape_mut(self.part) {
            self.point.perform(shape);
        }
    }

    any_impl!();
}

/// Drags a segment by a point on it, turning it into a curve first.
#[derive(Debug)]
pub struct CurveDragAction {
    segment: SegmentModeAction,
}

impl CurveDragAction {
    #[must_use]
    pub fn new(symbol: &Symbol, part: usize, index: usize) -> Option<Self> {
        Some(Self {
            segment: SegmentModeAction::new(symbol, part, index, SegmentMode::Curve)?,
        })
    }

    /// Move the curve by `delta` at the point at time `t` on it.
    ///
    /// Both inner control points move, in proportion to their influence
    /// at `t`, so that the grabbed point moves by exactly `delta`.
    pub fn move_by(&mut self, symbol: &mut Symbol, delta: Vector2D, t: f64) {
        let t = t.clamp(0.01, 0.99);
        let u = 1.0 - t;
        let k = 3.0 * t * u * (u * u + t * t);
        let (i1, i2) = (self.segment.point1.index, self.segment.point2.index);
        let Some(shape) = symbol.shape_mut(self.segment.part) else {
            return;
        };
        if let Some(p1) = shape.points.get_mut(i1) {
            p1.delta_after += delta * (u / k);
            p1.on_update_handle(WhichHandle::After);
        }
        if let Some(p2) = shape.points.get_mut(i2) {
            p2.delta_before += delta * (t / k);
            p2.on_update_handle(WhichHandle::Before);
        }
    }
}

impl Action<Symbol> for CurveDragAction {
    fn name(&self, _to_undo: bool) -> String {
        "Move curve".to_string()
    }

    fn perform(&mut self, symbol: &mut Symbol, to_undo: bool) {
        self.segment.perform(symbol, to_undo);
    }

    any_impl!();
}

// === Adding and removing points ===

/// Inserts a point on a segment, keeping the shape's outline unchanged.
#[derive(Debug)]
pub struct ControlPointAddAction {
    part: usize,
    insert_after: usize,
    new_point: ControlPoint,
    point1: ControlPointUpdate,
    point2: ControlPointUpdate,
}

impl ControlPointAddAction {
    /// Insert at time `t` on the segment after point `insert_after`.
    #[must_use]
    pub fn new(symbol: &Symbol, part: usize, insert_after: usize, t: f64) -> Option<Self> {
        let shape = symbol.shape(part)?;
        let next = shape.next_index(insert_after);
        // a single point has no segment
        if next == insert_after {
            return None;
        }
        let mut point1 = ControlPointUpdate::new(shape, insert_after)?;
        let mut point2 = ControlPointUpdate::new(shape, next)?;
        let (p1, p2) = (&mut point1.other, &mut point2.other);

        let mut new_point = ControlPoint::default();
        match p1.segment_after {
            SegmentMode::Line => {
                new_point.pos = p1.pos.lerp(p2.pos, t);
            }
            SegmentMode::Curve => {
                // de Casteljau split of the cubic at t
                let a = p1.pos;
                let b = p1.pos + p1.delta_after;
                let c = p2.pos + p2.delta_before;
                let d = p2.pos;
                let ab = a.lerp(b, t);
                let bc = b.lerp(c, t);
                let cd = c.lerp(d, t);
                let abc = ab.lerp(bc, t);
                let bcd = bc.lerp(cd, t);
                let abcd = abc.lerp(bcd, t);

                new_point.pos = abcd;
                new_point.delta_before = abc - abcd;
                new_point.delta_after = bcd - abcd;
                new_point.segment_before = SegmentMode::Curve;
                new_point.segment_after = SegmentMode::Curve;
                new_point.lock = LockMode::Direction;

                p1.delta_after = ab - a;
                p2.delta_before = cd - d;
                for p in [&mut *p1, &mut *p2] {
                    if p.lock == LockMode::Size {
                        p.lock = LockMode::Direction;
                    }
                }
            }
        }
        Some(Self {
            part,
            insert_after,
            new_point,
            point1,
            point2,
        })
    }

    /// The point this action inserts.
    #[must_use]
    pub fn new_point(&self) -> &ControlPoint {
        &self.new_point
    }

    /// Index of the inserted point.
    #[must_use]
    pub fn new_index(&self) -> usize {
        self.insert_after + 1
    }
}

impl Action<Symbol> for ControlPointAddAction {
    fn name(&self, _to_undo: bool) -> String {
        "Add control point".to_string()
    }

    fn perform(&mut self, symbol: &mut Symbol, to_undo: bool) {
        let Some(shape) = symbol.shape_mut(self.part) else {
            return;
        };
        let at = self.new_index();
        if to_undo {
            if at < shape.points.len() {
                shape.points.remove(at);
            }
            self.point1.perform(shape);
            self.point2.perform(shape);
        } else {
            // update the neighbours while their indices are still valid
            self.point1.perform(shape);
            self.point2.perform(shape);
            let at = at.min(shape.points.len());
            shape.points.insert(at, self.new_point.clone());
        }
    }

    any_impl!();
}

/// Replaces all points of a shape.
#[derive(Debug)]
struct ReplacePointsAction {
    part: usize,
    points: Vec<ControlPoint>,
    removed: usize,
}

impl Action<Symbol> for ReplacePointsAction {
    fn name(&self, _to_undo: bool) -> String {
        if self.removed == 1 {
            "Delete point".to_string()
        } else {
            "Delete points".to_string()
        }
    }

    fn perform(&mut self, symbol: &mut Symbol, _to_undo: bool) {
        if let Some(shape) = symbol.shape_mut(self.part) {
            std::mem::swap(&mut shape.points, &mut self.points);
        }
    }

    any_impl!();
}

/// An action removing the points at `to_delete` from shape `part`.
///
/// The points on either side of a removed run are joined directly: by a
/// line if both joined segments were lines, otherwise by a curve. Returns
/// `None` if nothing would be removed or fewer than two points would be
/// left.
#[must_use]
pub fn control_point_remove_action(
    symbol: &Symbol,
    part: usize,
    to_delete: &[usize],
) -> Option<Box<dyn Action<Symbol>>> {
    let shape = symbol.shape(part)?;
    let n = shape.points.len();
    let deleted: SmallVec<[bool; 16]> = (0..n).map(|i| to_delete.contains(&i)).collect();
    let removed = deleted.iter().filter(|&&d| d).count();
    if removed == 0 || n - removed < 2 {
        return None;
    }

    let kept: Vec<usize> = (0..n).filter(|&i| !deleted[i]).collect();
    let mut points: Vec<ControlPoint> = kept.iter().map(|&i| shape.points[i].clone()).collect();
    for k in 0..kept.len() {
        let from = kept[k];
        let to = kept[(k + 1) % kept.len()];
        if shape.next_index(from) == to {
            continue;
        }
        let before_to = (to + n - 1) % n;
        let mode = if shape.points[from].segment_after == SegmentMode::Line
            && shape.points[before_to].segment_after == SegmentMode::Line
        {
            SegmentMode::Line
        } else {
            SegmentMode::Curve
        };
        let next = (k + 1) % kept.len();
        points[k].segment_after = mode;
        points[next].segment_before = mode;
        if mode == SegmentMode::Line {
            points[k].delta_after = Vector2D::default();
            points[next].delta_before = Vector2D::default();
        }
    }

    Some(Box::new(ReplacePointsAction {
        part,
        points,
        removed,
    }))
}

// === Symmetries ===

/// Moves the center or the handle of a symmetry.
#[derive(Debug)]
pub struct SymmetryMoveAction {
    part: usize,
    is_handle: bool,
    original: Vector2D,
    delta: Vector2D,
    pub constrain: bool,
    pub snap: i32,
}

impl SymmetryMoveAction {
    #[must_use]
    pub fn new(symbol: &Symbol, part: usize, is_handle: bool) -> Option<Self> {
        let symmetry = symbol.symmetry(part)?;
        Some(Self {
            part,
            is_handle,
            original: if is_handle {
                symmetry.handle
            } else {
                symmetry.center
            },
            delta: Vector2D::default(),
            constrain: false,
            snap: 0,
        })
    }

    /// Move by `delta` more. The handle snaps by its end point.
    pub fn move_by(&mut self, symbol: &mut Symbol, delta: Vector2D) {
        self.delta += delta;
        let Some(symmetry) = symbol.symmetry_mut(self.part) else {
            return;
        };
        if self.is_handle {
            let end = symmetry.center + self.original;
            symmetry.handle =
                self.original + constrain_snap_vector_offset(end, self.delta, self.constrain, self.snap);
        } else {
            symmetry.center = constrain_snap_vector(self.original, self.delta, self.constrain, self.snap);
        }
    }
}

impl Action<Symbol> for SymmetryMoveAction {
    fn name(&self, _to_undo: bool) -> String {
        if self.is_handle {
            "Orient symmetry".to_string()
        } else {
            "Move symmetry center".to_string()
        }
    }

    fn perform(&mut self, symbol: &mut Symbol, _to_undo: bool) {
        if let Some(symmetry) = symbol.symmetry_mut(self.part) {
            let target = if self.is_handle {
                &mut symmetry.handle
            } else {
                &mut symmetry.center
            };
            std::mem::swap(target, &mut self.original);
        }
    }

    any_impl!();
}

/// The name to swap in when a symmetry changes to `kind`/`copies`: the
/// new default name, unless the user renamed it.
fn renamed(symbol: &Symbol, part: usize, kind: SymmetryKind, copies: u32) -> Option<String> {
    let current = symbol.symmetry(part)?;
    if current.name != current.expected_name() {
        return Some(current.name.clone());
    }
    let mut changed = current.clone();
    changed.kind = kind;
    changed.copies = copies;
    Some(changed.expected_name())
}

/// Switches a symmetry between rotation and reflection.
#[derive(Debug)]
pub struct SymmetryTypeAction {
    part: usize,
    kind: SymmetryKind,
    copies: u32,
    name: String,
}

impl SymmetryTypeAction {
    /// A reflection needs an even number of copies, so an odd count is
    /// rounded up.
    #[must_use]
    pub fn new(symbol: &Symbol, part: usize, kind: SymmetryKind) -> Option<Self> {
        let mut copies = symbol.symmetry(part)?.copies;
        if kind == SymmetryKind::Reflection && copies % 2 == 1 {
            copies += 1;
        }
        let name = renamed(symbol, part, kind, copies)?;
        Some(Self {
            part,
            kind,
            copies,
            name,
        })
    }
}

impl Action<Symbol> for SymmetryTypeAction {
    fn name(&self, _to_undo: bool) -> String {
        "Change symmetry type".to_string()
    }

    fn perform(&mut self, symbol: &mut Symbol, _to_undo: bool) {
        if let Some(symmetry) = symbol.symmetry_mut(self.part) {
            std::mem::swap(&mut symmetry.kind, &mut self.kind);
            std::mem::swap(&mut symmetry.copies, &mut self.copies);
            std::mem::swap(&mut symmetry.name, &mut self.name);
        }
    }

    any_impl!();
}

/// Changes the number of copies of a symmetry.
#[derive(Debug)]
pub struct SymmetryCopiesAction {
    part: usize,
    copies: u32,
    name: String,
}

impl SymmetryCopiesAction {
    #[must_use]
    pub fn new(symbol: &Symbol, part: usize, copies: u32) -> Option<Self> {
        let kind = symbol.symmetry(part)?.kind;
        let name = renamed(symbol, part, kind, copies)?;
        Some(Self { part, copies, name })
    }
}

impl Action<Symbol> for SymmetryCopiesAction {
    fn name(&self, _to_undo: bool) -> String {
        "Change symmetry copies".to_string()
    }

    fn perform(&mut self, symbol: &mut Symbol, _to_undo: bool) {
        if let Some(symmetry) = symbol.symmetry_mut(self.part) {
            std::mem::swap(&mut symmetry.copies, &mut self.copies);
            std::mem::swap(&mut symmetry.name, &mut self.name);
        }
    }

    any_impl!();
}
