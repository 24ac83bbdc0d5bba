//! Eye aspect ratio (EAR)
//!
//! Openness of one eye from its six contour landmarks, ordered:
//! outer corner, upper lid (2), inner corner, lower lid (2).
//!
//! ```text
//!        p1   p2
//!   p0            p3
//!        p5   p4
//! ```

use crate::detector::{EyePoints, FaceLandmarks};
use crate::DmsError;

/// Eye widths below this are treated as a collapsed contour
pub const MIN_EYE_WIDTH: f32 = 1e-6;

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Compute the eye aspect ratio: `(|p1-p5| + |p2-p4|) / (2 * |p0-p3|)`
pub fn eye_aspect_ratio(eye: &EyePoints) -> Result<f32, DmsError> {
    let a = distance(eye[1], eye[5]);
    let b = distance(eye[2], eye[4]);
    let c = distance(eye[0], eye[3]);

    if c.is_nan() || c < MIN_EYE_WIDTH {
        return Err(DmsError::DegenerateGeometry { width: c });
    }

    Ok((a + b) / (2.0 * c))
}

/// Average EAR over both eyes of a face.
///
/// A degenerate contour on either eye voids the whole frame.
pub fn mean_eye_aspect_ratio(face: &FaceLandmarks) -> Result<f32, DmsError> {
    let left = eye_aspect_ratio(&face.left_eye)?;
    let right = eye_aspect_ratio(&face.right_eye)?;
    Ok((left + right) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn open_eye() -> EyePoints {
        [
            (0.0, 0.0),
            (1.0, -1.0),
            (2.0, -1.0),
            (3.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
        ]
    }

    #[test]
    fn test_known_ratio() {
        // Both verticals are 2, width is 3
        let ear = eye_aspect_ratio(&open_eye()).unwrap();
        assert!((ear - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_closed_eye_is_zero() {
        let eye = [
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (3.0, 0.0),
            (2.0, 0.0),
            (1.0, 0.0),
        ];
        assert_eq!(eye_aspect_ratio(&eye).unwrap(), 0.0);
    }

    #[test]
    fn test_coincident_corners_are_degenerate() {
        let mut eye = open_eye();
        eye[3] = eye[0];
        assert!(matches!(
            eye_aspect_ratio(&eye),
            Err(DmsError::DegenerateGeometry { .. })
        ));
    }

    #[test]
    fn test_nan_width_is_degenerate() {
        let mut eye = open_eye();
        eye[3] = (f32::NAN, 0.0);
        assert!(eye_aspect_ratio(&eye).is_err());
    }

    #[test]
    fn test_mean_over_both_eyes() {
        let mut squint = open_eye();
        squint[1].1 = -0.5;
        squint[2].1 = -0.5;
        squint[4].1 = 0.5;
        squint[5].1 = 0.5;
        let face = FaceLandmarks {
            left_eye: open_eye(),
            right_eye: squint,
        };
        let ear = mean_eye_aspect_ratio(&face).unwrap();
        assert!((ear - (2.0 / 3.0 + 1.0 / 3.0) / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_one_degenerate_eye_voids_frame() {
        let mut bad = open_eye();
        bad[0] = bad[3];
        let face = FaceLandmarks {
            left_eye: open_eye(),
            right_eye: bad,
        };
        assert!(mean_eye_aspect_ratio(&face).is_err());
    }

    proptest! {
        #[test]
        fn prop_scale_invariant(
            pts in proptest::array::uniform6((-100.0f32..100.0, -100.0f32..100.0)),
            k in 0.1f32..10.0,
        ) {
            prop_assume!(distance(pts[0], pts[3]) > 1.0);
            let scaled = pts.map(|(x, y)| (x * k, y * k));
            let base = eye_aspect_ratio(&pts).unwrap();
            let other = eye_aspect_ratio(&scaled).unwrap();
            prop_assert!((base - other).abs() <= 1e-3 * base.max(1.0));
        }

        #[test]
        fn prop_non_negative(
            pts in proptest::array::uniform6((-50.0f32..50.0, -50.0f32..50.0)),
        ) {
            if let Ok(ear) = eye_aspect_ratio(&pts) {
                prop_assert!(ear >= 0.0);
            }
        }
    }
}
