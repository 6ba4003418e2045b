use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// Outcome of resolving an angle against a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sector {
    Item(usize),
    Exit,
    Empty,
}

use Sector::{Empty as E, Exit as X, Item as I};

// Clockwise from "up". Numerically adjacent items sit on opposite sides of the ring so that
// item N and N+1 mirror each other across the vertical axis.
const RING8_EXIT_BOTTOM: [Sector; 8] = [I(0), I(4), I(2), I(6), X, I(5), I(1), I(3)];
const RING8_EXIT_ARC: [Sector; 8] = [I(0), I(4), I(2), X, X, X, I(1), I(3)];
const RING8_LATERAL: [Sector; 8] = [E, E, I(1), E, E, E, I(0), E];
const RING12_EXIT_BOTTOM: [Sector; 12] = [I(0), I(4), I(6), I(2), I(8), I(10), X, I(9), I(7), I(1), I(5), I(3)];
const RING12_FULL: [Sector; 12] =
    [I(0), I(4), I(6), I(2), I(8), I(10), I(11), I(9), I(7), I(1), I(5), I(3)];

pub const MAX_ITEMS: usize = 12;

/// A fixed ring of sectors plus the number of populated items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorLayout {
    clockwise: &'static [Sector],
    count: usize,
}

impl SectorLayout {
    /// Standard layout for a menu of `count` items: up to 7 items use the 8-ring, larger
    /// menus the 12-ring. Menus of 3 or 5 items back out through the whole lower arc.
    pub fn for_count(count: usize) -> Option<Self> {
        let clockwise: &'static [Sector] = match count {
            1..=5 => &RING8_EXIT_ARC,
            6..=7 => &RING8_EXIT_BOTTOM,
            8..=11 => &RING12_EXIT_BOTTOM,
            MAX_ITEMS => &RING12_FULL,
            _ => return None,
        };
        Some(Self { clockwise, count })
    }

    /// Two-item left/right layout without an exit region.
    pub fn lateral(count: usize) -> Option<Self> {
        (1..=2).contains(&count).then_some(Self { clockwise: &RING8_LATERAL, count })
    }

    pub fn ring(&self) -> usize {
        self.clockwise.len()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of distinct item slots the ring offers.
    pub fn capacity(&self) -> usize {
        self.clockwise.iter().filter(|sector| matches!(sector, Sector::Item(_))).count()
    }

    pub fn has_exit(&self) -> bool {
        self.clockwise.contains(&Sector::Exit)
    }

    /// Slot index the exit icon occupies in the position table.
    pub fn exit_slot(&self) -> Option<usize> {
        self.has_exit().then(|| self.ring() - 1)
    }

    pub fn resolve(&self, angle: f32) -> Sector {
        match self.clockwise[compass_position(angle, self.ring())] {
            Sector::Item(index) if index >= self.count => Sector::Empty,
            sector => sector,
        }
    }

    /// Position-table index of a sector; `None` for empty sectors.
    pub fn slot_of(&self, sector: Sector) -> Option<usize> {
        match sector {
            Sector::Item(index) => Some(index),
            Sector::Exit => self.exit_slot(),
            Sector::Empty => None,
        }
    }

    /// Unit offset of a slot on the ring, `+y` up and `+x` right.
    pub fn slot_direction(&self, slot: usize) -> Option<Vec2> {
        let target = if Some(slot) == self.exit_slot() { Sector::Exit } else { Sector::Item(slot) };
        let ring = self.ring();
        let position = if target == Sector::Exit {
            // The exit icon sits at the bottom even when the region spans an arc.
            (self.clockwise[ring / 2] == Sector::Exit).then_some(ring / 2).or_else(|| self.first(target))?
        } else {
            self.first(target)?
        };
        let angle = position as f32 * TAU / ring as f32;
        Some(Vec2::new(angle.sin(), angle.cos()))
    }

    fn first(&self, target: Sector) -> Option<usize> {
        self.clockwise.iter().position(|sector| *sector == target)
    }
}

/// Sector lookup for the standard layout of `count` items. Counts with no layout resolve to
/// `Empty`.
pub fn resolve_sector(count: usize, angle: f32) -> Sector {
    SectorLayout::for_count(count).map(|layout| layout.resolve(angle)).unwrap_or(Sector::Empty)
}

/// Clockwise compass position of `angle` on a ring of `ring` sectors, position 0 centred on
/// "up". The angle is shifted by half a sector and scaled so each multiple of PI is one
/// boundary; every sector includes its lower bound and excludes its upper bound.
pub fn compass_position(angle: f32, ring: usize) -> usize {
    let n = ring as f32;
    let transformed = (angle + PI / n) * (n / 2.0);
    let boundary = (transformed / PI).floor();
    if !boundary.is_finite() {
        return 0;
    }
    (boundary as i64).rem_euclid(ring as i64) as usize
}

/// Clockwise angle of a stick vector from "up", negative on the left half. `None` for vectors
/// shorter than `deadzone` or with non-finite components.
pub fn stick_angle(stick: Vec2, deadzone: f32) -> Option<f32> {
    if !stick.is_finite() || stick.length() <= deadzone.max(f32::EPSILON) {
        return None;
    }
    Some(stick.x.atan2(stick.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn deg(degrees: f32) -> f32 {
        degrees.to_radians()
    }

    #[test]
    fn cardinal_sticks_map_to_expected_angles() {
        assert_eq!(stick_angle(Vec2::Y, 0.0), Some(0.0));
        assert!((stick_angle(Vec2::X, 0.0).unwrap() - FRAC_PI_2).abs() < 1e-6);
        assert!((stick_angle(-Vec2::X, 0.0).unwrap() + FRAC_PI_2).abs() < 1e-6);
        assert!((stick_angle(-Vec2::Y, 0.0).unwrap().abs() - PI).abs() < 1e-6);
    }

    #[test]
    fn degenerate_sticks_have_no_angle() {
        assert_eq!(stick_angle(Vec2::ZERO, 0.0), None);
        assert_eq!(stick_angle(Vec2::new(0.05, 0.0), 0.1), None);
        assert_eq!(stick_angle(Vec2::new(f32::NAN, 1.0), 0.0), None);
    }

    #[test]
    fn eight_ring_positions_run_clockwise() {
        let expected = [(0.0, 0), (45.0, 1), (90.0, 2), (135.0, 3), (180.0, 4), (-135.0, 5), (-90.0, 6), (-45.0, 7)];
        for (degrees, position) in expected {
            assert_eq!(compass_position(deg(degrees), 8), position, "{degrees} degrees");
        }
        assert_eq!(compass_position(deg(-180.0), 8), 4);
        assert_eq!(compass_position(deg(360.0), 8), 0);
        assert_eq!(compass_position(deg(-315.0), 8), 1);
    }

    #[test]
    fn boundaries_are_closed_open() {
        // Upper edge of "up" is 22.5 degrees; anything just under stays up, the edge moves on.
        assert_eq!(compass_position(deg(22.4), 8), 0);
        assert_eq!(compass_position(deg(22.6), 8), 1);
        assert_eq!(compass_position(deg(-22.4), 8), 0);
        assert_eq!(compass_position(deg(-22.6), 8), 7);
        let edge = PI / 8.0;
        assert_eq!(compass_position(edge, 8), compass_position(edge, 8));
    }

    #[test]
    fn seven_item_menu_exits_at_the_bottom() {
        let layout = SectorLayout::for_count(7).expect("seven item layout");
        assert_eq!(layout.ring(), 8);
        assert_eq!(layout.resolve(0.0), Sector::Item(0));
        assert_eq!(layout.resolve(FRAC_PI_2), Sector::Item(2));
        assert_eq!(layout.resolve(-FRAC_PI_2), Sector::Item(1));
        assert_eq!(layout.resolve(3.0 * FRAC_PI_4), Sector::Item(6));
        assert_eq!(layout.resolve(PI), Sector::Exit);
        assert_eq!(layout.exit_slot(), Some(7));
    }

    #[test]
    fn small_menus_exit_through_the_lower_arc() {
        let layout = SectorLayout::for_count(3).expect("three item layout");
        assert_eq!(layout.resolve(3.0 * FRAC_PI_4), Sector::Exit);
        assert_eq!(layout.resolve(PI), Sector::Exit);
        assert_eq!(layout.resolve(-3.0 * FRAC_PI_4), Sector::Exit);
        assert_eq!(layout.resolve(FRAC_PI_4), Sector::Empty, "slot 4 is unpopulated");
        assert_eq!(layout.resolve(-FRAC_PI_2), Sector::Item(1));
    }

    #[test]
    fn twelve_ring_reserves_slot_eleven_for_exit() {
        let layout = SectorLayout::for_count(11).expect("eleven item layout");
        assert_eq!(layout.ring(), 12);
        assert_eq!(layout.resolve(PI), Sector::Exit);
        assert_eq!(layout.resolve(deg(30.0)), Sector::Item(4));
        assert_eq!(layout.resolve(deg(-30.0)), Sector::Item(3));
        assert_eq!(layout.exit_slot(), Some(11));

        let full = SectorLayout::for_count(12).expect("twelve item layout");
        assert!(!full.has_exit());
        assert_eq!(full.resolve(PI), Sector::Item(11));
    }

    #[test]
    fn lateral_layout_has_no_exit() {
        let layout = SectorLayout::lateral(2).expect("lateral layout");
        assert!(!layout.has_exit());
        assert_eq!(layout.resolve(-FRAC_PI_2), Sector::Item(0));
        assert_eq!(layout.resolve(FRAC_PI_2), Sector::Item(1));
        assert_eq!(layout.resolve(0.0), Sector::Empty);
        assert_eq!(layout.resolve(PI), Sector::Empty);
    }

    #[test]
    fn unsupported_counts_have_no_layout() {
        assert!(SectorLayout::for_count(0).is_none());
        assert!(SectorLayout::for_count(13).is_none());
        assert_eq!(resolve_sector(0, 0.0), Sector::Empty);
    }

    #[test]
    fn slot_directions_match_resolution() {
        for count in [3, 5, 7, 11, 12] {
            let layout = SectorLayout::for_count(count).expect("layout");
            for slot in 0..count {
                let dir = layout.slot_direction(slot).expect("slot direction");
                let angle = stick_angle(dir, 0.0).expect("unit direction");
                assert_eq!(layout.resolve(angle), Sector::Item(slot), "count {count} slot {slot}");
            }
            if let Some(exit) = layout.exit_slot() {
                let dir = layout.slot_direction(exit).expect("exit direction");
                assert_eq!(layout.resolve(stick_angle(dir, 0.0).expect("exit")), Sector::Exit);
            }
        }
    }
}
