use crate::input::{Buttons, ControllerSample};
use bitflags::bitflags;
use glam::{Mat4, Vec2, Vec3};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Processing order within a frame.
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Role of a hand in a two-handed drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bimanual {
    #[default]
    Off,
    First,
    Second,
}

impl Bimanual {
    /// Whether this hand performs the work shared by both hands. The second hand of a
    /// bimanual drag only contributes its pose.
    pub fn computes_shared(self) -> bool {
        !matches!(self, Bimanual::Second)
    }

    pub fn is_active(self) -> bool {
        !matches!(self, Bimanual::Off)
    }

    pub fn partner(self) -> Bimanual {
        match self {
            Bimanual::Off => Bimanual::Off,
            Bimanual::First => Bimanual::Second,
            Bimanual::Second => Bimanual::First,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const ALT = 1 << 1;
    }
}

/// Coordinate spaces a pose can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Space {
    /// Tracking space of the headset.
    Real,
    /// Scene space of the host application.
    Scene,
}

/// Pose conversion between spaces. Implementations must be pure.
pub trait SpaceConverter {
    fn convert(&self, pose: Mat4, from: Space, to: Space) -> Mat4;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySpace;

impl SpaceConverter for IdentitySpace {
    fn convert(&self, pose: Mat4, _from: Space, _to: Space) -> Mat4 {
        pose
    }
}

/// Real-to-scene conversion through a navigation matrix.
#[derive(Debug, Clone, Copy)]
pub struct NavigationSpace {
    pub navigation: Mat4,
}

impl NavigationSpace {
    pub fn new(navigation: Mat4) -> Self {
        Self { navigation }
    }
}

impl SpaceConverter for NavigationSpace {
    fn convert(&self, pose: Mat4, from: Space, to: Space) -> Mat4 {
        match (from, to) {
            (Space::Real, Space::Scene) => self.navigation * pose,
            (Space::Scene, Space::Real) => self.navigation.inverse() * pose,
            _ => pose,
        }
    }
}

/// Per-hand input snapshot. Poses are stored in real space.
#[derive(Debug, Clone)]
pub struct Cursor {
    pub side: Side,
    pub position: Mat4,
    /// Anchor captured when the current drag started.
    pub interaction_position: Mat4,
    pub bimanual: Bimanual,
    pub modifiers: Modifiers,
    pub buttons: Buttons,
    pub stick: Vec2,
    pub time_ms: u64,
}

impl Cursor {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            position: Mat4::IDENTITY,
            interaction_position: Mat4::IDENTITY,
            bimanual: Bimanual::Off,
            modifiers: Modifiers::empty(),
            buttons: Buttons::empty(),
            stick: Vec2::ZERO,
            time_ms: 0,
        }
    }

    /// Refreshes the per-frame fields. Anchors are left alone.
    pub fn apply_sample(&mut self, sample: &ControllerSample, time_ms: u64) {
        self.position = sample.pose;
        self.buttons = sample.buttons;
        self.stick = sample.stick;
        self.time_ms = time_ms;
    }

    pub fn anchor(&mut self) {
        self.interaction_position = self.position;
    }

    pub fn pose_in(&self, space: Space, spaces: &dyn SpaceConverter) -> Mat4 {
        spaces.convert(self.position, Space::Real, space)
    }

    pub fn interaction_pose_in(&self, space: Space, spaces: &dyn SpaceConverter) -> Mat4 {
        spaces.convert(self.interaction_position, Space::Real, space)
    }

    pub fn translation(&self) -> Vec3 {
        self.position.w_axis.truncate()
    }

    /// Translation since the drag anchor, in real space.
    pub fn drag_delta(&self) -> Vec3 {
        self.translation() - self.interaction_position.w_axis.truncate()
    }
}

/// Both hands' cursors. The other-hand relation is a lookup through `Side::other`.
#[derive(Debug, Clone)]
pub struct CursorPair {
    left: Cursor,
    right: Cursor,
}

impl CursorPair {
    pub fn new() -> Self {
        Self { left: Cursor::new(Side::Left), right: Cursor::new(Side::Right) }
    }

    pub fn get(&self, side: Side) -> &Cursor {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut Cursor {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// The acting hand mutably and the other hand read-only.
    pub fn split_mut(&mut self, side: Side) -> (&mut Cursor, &Cursor) {
        match side {
            Side::Left => (&mut self.left, &self.right),
            Side::Right => (&mut self.right, &self.left),
        }
    }

    /// Links both hands into a bimanual drag with `side` in the given role.
    pub fn link_bimanual(&mut self, side: Side, role: Bimanual) {
        self.get_mut(side).bimanual = role;
        self.get_mut(side.other()).bimanual = role.partner();
    }

    pub fn reset_bimanual(&mut self) {
        self.left.bimanual = Bimanual::Off;
        self.right.bimanual = Bimanual::Off;
    }
}

impl Default for CursorPair {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bimanual_roles_pair_up() {
        let mut cursors = CursorPair::new();
        cursors.link_bimanual(Side::Right, Bimanual::Second);
        assert_eq!(cursors.get(Side::Right).bimanual, Bimanual::Second);
        assert_eq!(cursors.get(Side::Left).bimanual, Bimanual::First);
        assert!(cursors.get(Side::Left).bimanual.computes_shared());
        assert!(!cursors.get(Side::Right).bimanual.computes_shared());

        cursors.reset_bimanual();
        assert_eq!(cursors.get(Side::Left).bimanual, Bimanual::Off);
        assert_eq!(cursors.get(Side::Right).bimanual, Bimanual::Off);
    }

    #[test]
    fn navigation_space_round_trips() {
        let nav = NavigationSpace::new(Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            glam::Quat::from_rotation_y(0.5),
            Vec3::new(1.0, 2.0, 3.0),
        ));
        let pose = Mat4::from_translation(Vec3::new(0.25, -0.5, 1.0));
        let scene = nav.convert(pose, Space::Real, Space::Scene);
        let back = nav.convert(scene, Space::Scene, Space::Real);
        for (a, b) in back.to_cols_array().iter().zip(pose.to_cols_array().iter()) {
            assert!((a - b).abs() < 1e-5, "round trip mismatch: {a} vs {b}");
        }
    }

    #[test]
    fn drag_delta_measures_from_anchor() {
        let mut cursor = Cursor::new(Side::Left);
        cursor.position = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        cursor.anchor();
        cursor.position = Mat4::from_translation(Vec3::new(1.5, 0.0, -1.0));
        assert_eq!(cursor.drag_delta(), Vec3::new(0.5, 0.0, -1.0));
    }
}
