use std::cmp::Ordering;

use glam::Mat4;

use super::renderable::Renderable;

/// Back-to-front ordering by camera-space distance.
///
/// Empty entries sort after every renderable and compare equal to each
/// other. Use with a stable sort so ties keep slot order.
#[derive(Debug, Clone, Copy)]
pub struct DepthSort {
    view: Mat4,
}

impl DepthSort {
    pub fn new(view: Mat4) -> Self {
        Self { view }
    }

    /// Distance from the camera to the item's centre.
    pub fn distance(&self, item: &Renderable) -> f32 {
        self.view
            .transform_point3(item.world_position(self.view))
            .length()
    }

    /// Farther items first.
    pub fn compare(&self, a: Option<&Renderable>, b: Option<&Renderable>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => self.distance(b).total_cmp(&self.distance(a)),
        }
    }

    pub fn sort(&self, items: &mut [Option<&Renderable>]) {
        items.sort_by(|a, b| self.compare(*a, *b));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;
    use image::RgbaImage;

    use super::*;
    use crate::render::Camera;
    use crate::render::renderable::Quad;

    fn at(name: &str, z: f32) -> Renderable {
        let mut item = Renderable::quad(Quad::new(name, Arc::new(RgbaImage::new(1, 1)), 1.0, 1.0));
        item.set_position(Vec3::new(0.0, 0.0, z));
        item
    }

    #[test]
    fn farther_items_come_first() {
        let sort = DepthSort::new(Camera::default().view());
        let near = at("near", 50.0);
        let far = at("far", -50.0);
        assert_eq!(sort.compare(Some(&far), Some(&near)), Ordering::Less);
        assert_eq!(sort.compare(Some(&near), Some(&far)), Ordering::Greater);
        assert_eq!(sort.compare(Some(&near), Some(&near)), Ordering::Equal);
    }

    #[test]
    fn empty_entries_sort_last_and_keep_order() {
        let sort = DepthSort::new(Camera::default().view());
        let a = at("a", 0.0);
        let b = at("b", 30.0);
        let c = at("c", 0.0);
        let mut items = vec![None, Some(&b), Some(&a), None, Some(&c)];
        sort.sort(&mut items);
        let names: Vec<_> = items.iter().map(|i| i.map(Renderable::name)).collect();
        assert_eq!(names, vec![Some("a"), Some("c"), Some("b"), None, None]);
    }

    #[test]
    fn moving_items_across_each_other_flips_the_sign() {
        let sort = DepthSort::new(Camera::default().view());
        let mut a = at("a", 10.0);
        let mut b = at("b", -10.0);
        let before = sort.compare(Some(&a), Some(&b));
        a.set_position(Vec3::new(0.0, 0.0, -10.0));
        b.set_position(Vec3::new(0.0, 0.0, 10.0));
        let after = sort.compare(Some(&a), Some(&b));
        assert_eq!(before, after.reverse());
    }

    #[test]
    fn distance_accounts_for_scale() {
        let sort = DepthSort::new(Camera::default().view());
        let mut item = at("scaled", 40.0);
        item.set_uniform_scale(0.5);
        // Scale applies to the translation: centre sits at z = 20.
        let expected = Camera::default().view().transform_point3(Vec3::new(0.0, 0.0, 20.0));
        assert!((sort.distance(&item) - expected.length()).abs() < 1e-3);
    }
}
