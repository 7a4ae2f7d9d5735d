use backtrack::landmark::{LEFT_SHOULDER, NOSE, POSE_LANDMARK_COUNT, RIGHT_SHOULDER};
use backtrack::{Landmark, LandmarkSet};

/// Full frame with every point visible at the image center
pub fn base_frame() -> Vec<Landmark> {
    vec![Landmark::new(0.5, 0.5, 0.0).with_visibility(1.0); POSE_LANDMARK_COUNT]
}

/// Frame with level shoulders `width` apart and the nose `head_height`
/// above the shoulder line
pub fn posed_frame(width: f32, head_height: f32) -> LandmarkSet {
    let mut points = base_frame();
    points[LEFT_SHOULDER] = Landmark::new(0.5 + width / 2.0, 0.6, 0.0).with_visibility(1.0);
    points[RIGHT_SHOULDER] = Landmark::new(0.5 - width / 2.0, 0.6, 0.0).with_visibility(1.0);
    points[NOSE] = Landmark::new(0.5, 0.6 - head_height, 0.0).with_visibility(1.0);
    LandmarkSet::from(points)
}

/// Raise the left shoulder so the lean angle is `degrees` (positive = right)
pub fn lean(set: &mut LandmarkSet, degrees: f64) {
    let (left, right) = {
        let (l, r) = set.shoulders().expect("shoulders present");
        (*l, *r)
    };
    let dx = (left.x as f64 - right.x as f64).abs();
    let dy = dx * degrees.to_radians().tan();
    let mut raised = left;
    raised.y = (right.y as f64 - dy) as f32;
    set.set(LEFT_SHOULDER, Some(raised));
}
