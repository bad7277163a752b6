use crate::shared::detection::Detection;
use crate::shared::face_rect::FaceRect;

/// Keeps detections scoring strictly above `threshold`, preserving order.
///
/// Dropped detections are neither reported nor drawn.
pub fn accept_faces(detections: &[Detection], threshold: f32) -> Vec<Detection> {
    detections
        .iter()
        .filter(|d| d.exceeds(threshold))
        .copied()
        .collect()
}

pub fn to_face_rects(faces: &[Detection]) -> Vec<FaceRect> {
    faces.iter().map(FaceRect::from_detection).collect()
}
