//! Cosmetic hand-skeleton overlay drawn into RGBA frames. Not part of the
//! recognition contract; purely visual feedback for the camera view.

use crate::types::{Landmark, LANDMARK_COUNT};

/// Landmark index pairs joined by skeleton lines: the five finger chains
/// from the wrist plus the palm arc.
pub const HAND_CONNECTIONS: [(usize, usize); 23] = [
    // Thumb
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    // Index
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    // Middle
    (0, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    // Ring
    (0, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    // Pinky
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
    // Palm
    (5, 9),
    (9, 13),
    (13, 17),
];

const BONE_COLOR: [u8; 4] = [0, 255, 0, 255];
const JOINT_COLOR: [u8; 4] = [255, 0, 0, 255];
const JOINT_RADIUS: i32 = 3;

/// Draws one hand's skeleton over an RGBA frame. Landmarks are in the
/// detector's normalized space and are scaled to the frame here; a hand
/// with the wrong landmark count is skipped.
pub fn draw_skeleton(rgba: &mut [u8], width: u32, height: u32, landmarks: &[Landmark]) {
    if landmarks.len() != LANDMARK_COUNT {
        return;
    }

    let to_px = |lm: &Landmark| {
        (
            (lm.x * width as f32).round() as i32,
            (lm.y * height as f32).round() as i32,
        )
    };

    for (start, end) in HAND_CONNECTIONS {
        let (x0, y0) = to_px(&landmarks[start]);
        let (x1, y1) = to_px(&landmarks[end]);
        draw_line(rgba, width, height, x0, y0, x1, y1, BONE_COLOR);
    }

    for lm in landmarks {
        let (cx, cy) = to_px(lm);
        draw_disc(rgba, width, height, cx, cy, JOINT_RADIUS, JOINT_COLOR);
    }
}

fn put_pixel(rgba: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return;
    }
    let offset = (y as usize * width as usize + x as usize) * 4;
    if let Some(px) = rgba.get_mut(offset..offset + 4) {
        px.copy_from_slice(&color);
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_line(
    rgba: &mut [u8],
    width: u32,
    height: u32,
    mut x0: i32,
    mut y0: i32,
    x1: i32,
    y1: i32,
    color: [u8; 4],
) {
    // Bresenham.
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_pixel(rgba, width, height, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x0 += sx;
        }
        if doubled <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_disc(rgba: &mut [u8], width: u32, height: u32, cx: i32, cy: i32, radius: i32, color: [u8; 4]) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel(rgba, width, height, cx + dx, cy + dy, color);
            }
        }
    }
}
