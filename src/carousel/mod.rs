//! The four visible carousel slots and the poses their quads take.

pub mod captions;
pub mod curve;
pub mod runtime;
pub mod transition;

use glam::{IVec3, Vec3};
use tracing::debug;

use crate::events::{Direction, NavigationState};
use crate::picture::{PictureCatalog, QuadProducer, request_quad};
use crate::render::renderable::{Renderable, Transform};

/// World-space width of every carousel quad.
pub const QUAD_WIDTH: f32 = 60.0;

const SELECTED_X: f32 = -7.0;
const LEFT_X: f32 = SELECTED_X - QUAD_WIDTH * 2.0;
const NEXT_X: f32 = 36.0;
const RIGHT_X: f32 = 196.0;
const SIDE_Z: f32 = 30.0;
const SIDE_SCALE: f32 = 0.5;
const FRONT_TILT: i32 = 30;
const SIDE_TILT: i32 = -20;
const ZOOM_SIDE_SHIFT: f32 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Left,
    Selected,
    Next,
    Right,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::Left, Slot::Selected, Slot::Next, Slot::Right];

    fn index(self) -> usize {
        match self {
            Slot::Left => 0,
            Slot::Selected => 1,
            Slot::Next => 2,
            Slot::Right => 3,
        }
    }

    /// Resting pose for a quad of the given (unscaled) height.
    pub fn resting_pose(self, height: f32) -> Transform {
        match self {
            Slot::Left => Transform {
                position: Vec3::new(LEFT_X, 0.0, 0.0),
                rotation: IVec3::new(0, FRONT_TILT, 0),
                scale: Vec3::ONE,
            },
            Slot::Selected => Transform {
                position: Vec3::new(SELECTED_X, 0.0, 0.0),
                rotation: IVec3::new(0, FRONT_TILT, 0),
                scale: Vec3::ONE,
            },
            Slot::Next => Transform {
                position: Vec3::new(NEXT_X, -height / 2.0, SIDE_Z),
                rotation: IVec3::new(0, SIDE_TILT, 0),
                scale: Vec3::splat(SIDE_SCALE),
            },
            Slot::Right => Transform {
                position: Vec3::new(RIGHT_X, -height / 2.0, SIDE_Z),
                rotation: IVec3::new(0, SIDE_TILT, 0),
                scale: Vec3::splat(SIDE_SCALE),
            },
        }
    }
}

fn place(quad: &mut Renderable, pose: Transform) {
    quad.set_position(pose.position);
    quad.set_rotation(pose.rotation);
    quad.set_scale(pose.scale);
}

fn set_x(quad: &mut Renderable, x: f32) {
    let position = quad.position();
    quad.set_position(Vec3::new(x, position.y, position.z));
}

/// Pose of a quad growing from the Next slot into the Selected slot at
/// progress `factor`.
fn rise_to_front(quad: &mut Renderable, factor: f64) {
    let scale = (0.5 + 0.5 * factor) as f32;
    quad.set_uniform_scale(scale);
    quad.set_rotation(IVec3::new(0, (-20.0 + 50.0 * factor) as i32, 0));
    quad.set_position(Vec3::new(
        (36.0 - 43.0 * factor) as f32,
        -quad.height() * (1.0 - scale),
        (30.0 * (1.0 - factor)) as f32,
    ));
}

/// Read-only view of one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSnapshot {
    pub slot: Slot,
    pub name: String,
    pub transform: Transform,
    pub initialized: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowSnapshot {
    pub selected: usize,
    pub showing: bool,
    pub slots: [Option<SlotSnapshot>; 4],
}

impl WindowSnapshot {
    pub fn slot(&self, slot: Slot) -> Option<&SlotSnapshot> {
        self.slots[slot.index()].as_ref()
    }
}

/// Left, Selected, Next and Right quads around the selected picture.
///
/// Slots only ever hold quads for pictures `selected - 1 ..= selected + 2`.
/// A quad leaves a slot either into another slot or into the dispose queue.
#[derive(Debug, Default)]
pub struct CarouselWindow {
    slots: [Option<Renderable>; 4],
    selected: usize,
    showing: bool,
}

impl CarouselWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn next_index(&self) -> usize {
        self.selected + 1
    }

    /// True while the selected picture is zoomed in.
    pub fn is_showing(&self) -> bool {
        self.showing
    }

    pub(crate) fn set_showing(&mut self, showing: bool) {
        self.showing = showing;
    }

    pub fn slot(&self, slot: Slot) -> Option<&Renderable> {
        self.slots[slot.index()].as_ref()
    }

    fn slot_mut(&mut self, slot: Slot) -> Option<&mut Renderable> {
        self.slots[slot.index()].as_mut()
    }

    /// Slot contents in Left, Selected, Next, Right order.
    pub fn renderables(&self) -> impl Iterator<Item = Option<&Renderable>> {
        self.slots.iter().map(Option::as_ref)
    }

    /// Which empty slot a quad for `picture` belongs in, if any.
    pub fn slot_for(&self, picture: usize) -> Option<Slot> {
        let slot = if picture == self.selected {
            Slot::Selected
        } else if picture == self.selected + 1 {
            Slot::Next
        } else if picture == self.selected + 2 {
            Slot::Right
        } else if self.selected > 0 && picture == self.selected - 1 {
            Slot::Left
        } else {
            return None;
        };
        self.slots[slot.index()].is_none().then_some(slot)
    }

    /// Put `quad` into the empty `slot` at its resting pose. Hands the quad
    /// back if the slot is taken.
    pub fn install(&mut self, slot: Slot, mut quad: Renderable) -> Result<(), Renderable> {
        if self.slots[slot.index()].is_some() {
            return Err(quad);
        }
        let mut pose = slot.resting_pose(quad.height());
        if self.showing && slot == Slot::Next {
            pose.position.x += ZOOM_SIDE_SHIFT;
        }
        place(&mut quad, pose);
        debug!(?slot, name = quad.name(), "quad installed");
        self.slots[slot.index()] = Some(quad);
        Ok(())
    }

    pub fn can_next(&self, len: usize) -> bool {
        self.selected + 1 < len && self.slot(Slot::Next).is_some()
    }

    pub fn can_previous(&self) -> bool {
        self.selected > 0 && self.slot(Slot::Left).is_some()
    }

    pub fn can_show(&self) -> bool {
        self.slot(Slot::Selected).is_some()
    }

    pub fn navigation(&self, len: usize) -> NavigationState {
        NavigationState {
            can_next: self.can_next(len),
            can_previous: self.can_previous(),
            can_show: self.can_show(),
        }
    }

    /// Interpolate a slide at eased `progress`. Progress 0 is the current
    /// resting layout, 1 the layout after the slide.
    pub fn apply_slide(&mut self, direction: Direction, progress: f64) {
        match direction {
            Direction::Forward => {
                let f = progress;
                if let Some(quad) = self.slot_mut(Slot::Selected) {
                    set_x(quad, SELECTED_X - QUAD_WIDTH * 2.0 * f as f32);
                }
                if let Some(quad) = self.slot_mut(Slot::Next) {
                    rise_to_front(quad, f);
                }
                if let Some(quad) = self.slot_mut(Slot::Right) {
                    set_x(quad, NEXT_X + 160.0 * (1.0 - f) as f32);
                }
            }
            Direction::Backward => {
                let g = 1.0 - progress;
                if let Some(quad) = self.slot_mut(Slot::Selected) {
                    rise_to_front(quad, g);
                }
                if let Some(quad) = self.slot_mut(Slot::Next) {
                    set_x(quad, NEXT_X + 160.0 * (1.0 - g) as f32);
                }
                if let Some(quad) = self.slot_mut(Slot::Left) {
                    set_x(quad, SELECTED_X - QUAD_WIDTH * 2.0 * g as f32);
                }
            }
        }
    }

    /// Interpolate between the resting tilt and the flat, forward pose.
    /// `progress` runs 0 → 1 in both directions.
    pub fn apply_zoom(&mut self, progress: f64, opening: bool) {
        let f = if opening { progress } else { 1.0 - progress };
        if let Some(quad) = self.slot_mut(Slot::Selected) {
            let y = quad.position().y;
            quad.set_rotation(IVec3::new(0, (30.0 * (1.0 - f)) as i32, 0));
            quad.set_position(Vec3::new(
                (SELECTED_X as f64 * (1.0 - f)) as f32,
                y,
                (30.0 * f) as f32,
            ));
        }
        if let Some(quad) = self.slot_mut(Slot::Next) {
            set_x(quad, NEXT_X + (ZOOM_SIDE_SHIFT as f64 * f) as f32);
        }
    }

    /// Rotate slot ownership once a slide has finished.
    ///
    /// The quad leaving the window goes to the dispose queue; quads for
    /// pictures that enter the window are requested through the init queue
    /// and installed when the render thread drains it.
    pub fn finish_slide(
        &mut self,
        direction: Direction,
        catalog: &PictureCatalog,
        producer: &QuadProducer,
    ) {
        let len = catalog.len();
        match direction {
            Direction::Forward => {
                self.selected += 1;
                self.retire(Slot::Left, producer);
                self.shift(Slot::Selected, Slot::Left);
                self.shift(Slot::Next, Slot::Selected);
                if self.next_index() < len {
                    self.shift(Slot::Right, Slot::Next);
                } else {
                    self.retire(Slot::Next, producer);
                    self.retire(Slot::Right, producer);
                }
            }
            Direction::Backward => {
                self.selected -= 1;
                self.retire(Slot::Right, producer);
                self.shift(Slot::Next, Slot::Right);
                self.shift(Slot::Selected, Slot::Next);
                self.shift(Slot::Left, Slot::Selected);
            }
        }
        debug!(selected = self.selected, ?direction, "slide finished");
        self.request_missing(catalog, producer);
    }

    /// Ask for quads for every slot whose picture exists but has no quad.
    pub fn request_missing(&self, catalog: &PictureCatalog, producer: &QuadProducer) {
        let len = catalog.len();
        let mut wanted = Vec::with_capacity(4);
        if self.selected > 0 && self.slot(Slot::Left).is_none() {
            wanted.push(self.selected - 1);
        }
        for (slot, picture) in [
            (Slot::Selected, self.selected),
            (Slot::Next, self.selected + 1),
            (Slot::Right, self.selected + 2),
        ] {
            if picture < len && self.slot(slot).is_none() {
                wanted.push(picture);
            }
        }
        for picture in wanted {
            debug!(picture, "requesting quad");
            request_quad(catalog, producer, picture);
        }
    }

    fn retire(&mut self, slot: Slot, producer: &QuadProducer) {
        if let Some(quad) = self.slots[slot.index()].take() {
            debug!(?slot, name = quad.name(), "quad retired");
            producer.request_dispose(quad);
        }
    }

    fn shift(&mut self, from: Slot, to: Slot) {
        let moved = self.slots[from.index()].take().map(|mut quad| {
            let pose = to.resting_pose(quad.height());
            place(&mut quad, pose);
            quad
        });
        self.slots[to.index()] = moved;
    }

    /// Empty every slot, for shutdown.
    pub fn take_all(&mut self) -> Vec<Renderable> {
        self.slots.iter_mut().filter_map(Option::take).collect()
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        let slots = Slot::ALL.map(|slot| {
            self.slot(slot).map(|quad| SlotSnapshot {
                slot,
                name: quad.name().to_owned(),
                transform: quad.transform(),
                initialized: quad.is_initialized(),
            })
        });
        WindowSnapshot {
            selected: self.selected,
            showing: self.showing,
            slots,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use image::RgbaImage;

    use super::*;
    use crate::render::renderable::Quad;

    fn quad(name: &str) -> Renderable {
        Renderable::reflected(Quad::new(name, Arc::new(RgbaImage::new(1, 1)), QUAD_WIDTH, 40.0))
    }

    fn assert_pose(quad: &Renderable, pose: Transform) {
        assert!(
            (quad.position() - pose.position).length() < 1e-4,
            "{:?} != {:?}",
            quad.position(),
            pose.position
        );
        assert_eq!(quad.rotation(), pose.rotation);
        assert!((quad.scale() - pose.scale).length() < 1e-6);
    }

    fn full_window() -> CarouselWindow {
        let mut window = CarouselWindow::new();
        window.selected = 1;
        for (slot, name) in Slot::ALL.into_iter().zip(["l", "s", "n", "r"]) {
            window.install(slot, quad(name)).unwrap();
        }
        window
    }

    #[test]
    fn slot_for_maps_neighbourhood_and_skips_occupied() {
        let mut window = CarouselWindow::new();
        assert_eq!(window.slot_for(0), Some(Slot::Selected));
        assert_eq!(window.slot_for(1), Some(Slot::Next));
        assert_eq!(window.slot_for(2), Some(Slot::Right));
        assert_eq!(window.slot_for(3), None);
        window.install(Slot::Selected, quad("a")).unwrap();
        assert_eq!(window.slot_for(0), None);
        assert!(window.install(Slot::Selected, quad("b")).is_err());
    }

    #[test]
    fn forward_slide_endpoints_match_resting_poses() {
        let mut window = full_window();
        window.apply_slide(Direction::Forward, 0.0);
        for slot in [Slot::Selected, Slot::Next, Slot::Right] {
            assert_pose(window.slot(slot).unwrap(), slot.resting_pose(40.0));
        }

        window.apply_slide(Direction::Forward, 1.0);
        assert_pose(window.slot(Slot::Selected).unwrap(), Slot::Left.resting_pose(40.0));
        assert_pose(window.slot(Slot::Next).unwrap(), Slot::Selected.resting_pose(40.0));
        assert_pose(window.slot(Slot::Right).unwrap(), Slot::Next.resting_pose(40.0));
    }

    #[test]
    fn backward_slide_endpoints_match_resting_poses() {
        let mut window = full_window();
        window.apply_slide(Direction::Backward, 0.0);
        for slot in [Slot::Left, Slot::Selected, Slot::Next] {
            assert_pose(window.slot(slot).unwrap(), slot.resting_pose(40.0));
        }

        window.apply_slide(Direction::Backward, 1.0);
        assert_pose(window.slot(Slot::Left).unwrap(), Slot::Selected.resting_pose(40.0));
        assert_pose(window.slot(Slot::Selected).unwrap(), Slot::Next.resting_pose(40.0));
        assert_pose(window.slot(Slot::Next).unwrap(), Slot::Right.resting_pose(40.0));
    }

    #[test]
    fn zoom_flattens_and_returns() {
        let mut window = full_window();
        window.apply_zoom(1.0, true);
        let selected = window.slot(Slot::Selected).unwrap();
        assert_eq!(selected.rotation(), IVec3::ZERO);
        assert!((selected.position() - Vec3::new(0.0, 0.0, 30.0)).length() < 1e-4);
        assert!((window.slot(Slot::Next).unwrap().position().x - 156.0).abs() < 1e-4);

        window.apply_zoom(1.0, false);
        assert_pose(window.slot(Slot::Selected).unwrap(), Slot::Selected.resting_pose(40.0));
        assert_pose(window.slot(Slot::Next).unwrap(), Slot::Next.resting_pose(40.0));
    }

    #[test]
    fn next_installed_while_showing_stays_out_of_the_way() {
        let mut window = CarouselWindow::new();
        window.install(Slot::Selected, quad("s")).unwrap();
        window.set_showing(true);
        window.install(Slot::Next, quad("n")).unwrap();
        assert!((window.slot(Slot::Next).unwrap().position().x - 156.0).abs() < 1e-4);
    }

    #[test]
    fn navigation_requires_populated_neighbours() {
        let mut window = CarouselWindow::new();
        assert_eq!(window.navigation(3), NavigationState::default());
        window.install(Slot::Selected, quad("s")).unwrap();
        assert!(window.can_show());
        assert!(!window.can_next(3));
        window.install(Slot::Next, quad("n")).unwrap();
        assert!(window.can_next(3));
        assert!(!window.can_next(1));
        assert!(!window.can_previous());
    }
}
