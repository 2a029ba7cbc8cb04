//! Camera placement as a world-to-camera transform sequence.
//!
//! # Invariants
//! - Steps come out in emission order: identity, roll about the view
//!   axis, the two aim rotations, then the translation to the camera
//!   position. Backends write them verbatim.
//! - A zero direction contributes no aim rotations. Sessions validate
//!   the camera before building a placement, so that case only arises
//!   for placements built by hand.

use glam::Vec3;

use crate::renderer::CameraPlacement;

/// One step of the camera placement transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformStep {
    /// Reset the current transform.
    Identity,
    /// Rotate by `angle_degrees` about the axis `(x, y, z)`.
    Rotate {
        angle_degrees: f32,
        x: f32,
        y: f32,
        z: f32,
    },
    /// Translate by `(x, y, z)`.
    Translate { x: f32, y: f32, z: f32 },
}

/// Decompose a camera placement into the transform calls that carry world
/// space into camera space.
///
/// The aim rotations align the +z axis with the viewing direction: a
/// rotation about x lifts the direction out of the xz plane, then a
/// rotation about y swings it onto +z. Roll is emitted first so that it
/// ends up applied about the final viewing axis.
pub fn placement_steps(placement: &CameraPlacement) -> Vec<TransformStep> {
    let mut steps = vec![
        TransformStep::Identity,
        TransformStep::Rotate {
            angle_degrees: -placement.roll_degrees,
            x: 0.0,
            y: 0.0,
            z: 1.0,
        },
    ];
    aim_z(placement.direction, &mut steps);
    steps.push(TransformStep::Translate {
        x: -placement.position.x,
        y: -placement.position.y,
        z: -placement.position.z,
    });
    steps
}

/// Rotations aligning the +z axis with `direction`.
fn aim_z(direction: Vec3, steps: &mut Vec<TransformStep>) {
    if direction == Vec3::ZERO {
        return;
    }

    let xz_len = (direction.x * direction.x + direction.z * direction.z).sqrt();
    // Straight up or down has no heading; pick 0 or 180 by the sign of y.
    let y_rot = if xz_len == 0.0 {
        if direction.y < 0.0 { 180.0 } else { 0.0 }
    } else {
        (direction.z / xz_len).acos().to_degrees()
    };

    let yz_len = (direction.y * direction.y + xz_len * xz_len).sqrt();
    let x_rot = (xz_len / yz_len).acos().to_degrees();

    steps.push(TransformStep::Rotate {
        angle_degrees: if direction.y > 0.0 { x_rot } else { -x_rot },
        x: 1.0,
        y: 0.0,
        z: 0.0,
    });
    steps.push(TransformStep::Rotate {
        angle_degrees: if direction.x > 0.0 { -y_rot } else { y_rot },
        x: 0.0,
        y: 1.0,
        z: 0.0,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps_for(position: Vec3, direction: Vec3, roll_degrees: f32) -> Vec<TransformStep> {
        placement_steps(&CameraPlacement {
            position,
            direction,
            roll_degrees,
        })
    }

    fn rotation_angle(step: &TransformStep) -> f32 {
        match step {
            TransformStep::Rotate { angle_degrees, .. } => *angle_degrees,
            other => panic!("expected a rotation, got {other:?}"),
        }
    }

    #[test]
    fn sequence_shape_is_fixed() {
        let steps = steps_for(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 0.0, -1.0), 30.0);
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0], TransformStep::Identity);
        assert_eq!(rotation_angle(&steps[1]), -30.0);
        assert_eq!(
            steps[4],
            TransformStep::Translate {
                x: -1.0,
                y: -2.0,
                z: -3.0
            }
        );
    }

    #[test]
    fn view_down_negative_z_turns_half_around() {
        let steps = steps_for(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        // No tilt about x; a half turn about y to face -z.
        assert!(rotation_angle(&steps[2]).abs() < 1e-4);
        assert!((rotation_angle(&steps[3]) - 180.0).abs() < 1e-3);
    }

    #[test]
    fn view_down_positive_z_needs_no_aim() {
        let steps = steps_for(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), 0.0);
        assert!(rotation_angle(&steps[2]).abs() < 1e-4);
        assert!(rotation_angle(&steps[3]).abs() < 1e-4);
    }

    #[test]
    fn view_straight_up_tilts_ninety() {
        let steps = steps_for(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), 0.0);
        assert!((rotation_angle(&steps[2]) - 90.0).abs() < 1e-3);
        assert!(rotation_angle(&steps[3]).abs() < 1e-4);
    }

    #[test]
    fn view_straight_down_tilts_back_and_turns() {
        let steps = steps_for(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), 0.0);
        assert!((rotation_angle(&steps[2]) + 90.0).abs() < 1e-3);
        assert!((rotation_angle(&steps[3]) - 180.0).abs() < 1e-3);
    }

    #[test]
    fn heading_sign_follows_x() {
        let east = steps_for(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0), 0.0);
        assert!((rotation_angle(&east[3]) + 45.0).abs() < 1e-3);

        let west = steps_for(Vec3::ZERO, Vec3::new(-1.0, 0.0, 1.0), 0.0);
        assert!((rotation_angle(&west[3]) - 45.0).abs() < 1e-3);
    }

    #[test]
    fn tilt_sign_follows_y() {
        let up = steps_for(Vec3::ZERO, Vec3::new(0.0, 1.0, 1.0), 0.0);
        assert!((rotation_angle(&up[2]) - 45.0).abs() < 1e-3);

        let down = steps_for(Vec3::ZERO, Vec3::new(0.0, -1.0, 1.0), 0.0);
        assert!((rotation_angle(&down[2]) + 45.0).abs() < 1e-3);
    }

    #[test]
    fn zero_direction_skips_aim_rotations() {
        let steps = steps_for(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 0.0);
        assert_eq!(steps.len(), 3);
        assert!(matches!(steps[2], TransformStep::Translate { .. }));
    }
}
