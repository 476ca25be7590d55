//! Platforms and their oscillating motion

use serde::{Deserialize, Serialize};

use super::geom::Rect;

/// How a platform moves each tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PlatformMotion {
    #[default]
    Static,
    /// Slides horizontally; the whole platform stays within `[min, max]`
    OscillateX { speed: f32, min: f32, max: f32 },
    /// Slides vertically; the top edge stays within `[min, max]`
    OscillateY { speed: f32, min: f32, max: f32 },
}

/// A solid platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    #[serde(default)]
    pub motion: PlatformMotion,
}

impl Platform {
    pub const fn fixed(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            motion: PlatformMotion::Static,
        }
    }

    pub const fn sliding(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        speed: f32,
        min: f32,
        max: f32,
    ) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            motion: PlatformMotion::OscillateX { speed, min, max },
        }
    }

    pub const fn lifting(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        speed: f32,
        min: f32,
        max: f32,
    ) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            motion: PlatformMotion::OscillateY { speed, min, max },
        }
    }

    /// Advance one tick, bouncing off the range ends
    pub fn advance(&mut self) {
        match &mut self.motion {
            PlatformMotion::Static => {}
            PlatformMotion::OscillateX { speed, min, max } => {
                let pos = &mut self.rect.pos;
                pos.x += *speed;
                let width = self.rect.size.x;
                if pos.x < *min || pos.x + width > *max {
                    *speed = -*speed;
                    if pos.x < *min {
                        pos.x = *min;
                    }
                    if pos.x + width > *max {
                        pos.x = *max - width;
                    }
                }
            }
            PlatformMotion::OscillateY { speed, min, max } => {
                let pos = &mut self.rect.pos;
                pos.y += *speed;
                if pos.y < *min || pos.y > *max {
                    *speed = -*speed;
                    pos.y = pos.y.clamp(*min, *max);
                }
            }
        }
    }

    pub fn is_moving(&self) -> bool {
        !matches!(self.motion, PlatformMotion::Static)
    }
}

/// Advance every moving platform by one tick
pub fn update_platforms(platforms: &mut [Platform]) {
    for platform in platforms {
        platform.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_platform_never_moves() {
        let mut p = Platform::fixed(100.0, 200.0, 150.0, 50.0);
        for _ in 0..100 {
            p.advance();
        }
        assert_eq!(p.rect, Rect::new(100.0, 200.0, 150.0, 50.0));
    }

    #[test]
    fn test_horizontal_bounce_accounts_for_width() {
        let mut p = Platform::sliding(1800.0, 300.0, 200.0, 50.0, 1.2, 1750.0, 2050.0);
        let mut bounced = false;
        for _ in 0..500 {
            p.advance();
            assert!(p.rect.left() >= 1750.0);
            assert!(p.rect.right() <= 2050.0);
            if let PlatformMotion::OscillateX { speed, .. } = p.motion {
                bounced |= speed < 0.0;
            }
        }
        assert!(bounced);
    }

    #[test]
    fn test_horizontal_clamps_on_overshoot() {
        // 1.5 per tick overshoots the right bound by 0.5 on the third tick
        let mut p = Platform::sliding(0.0, 300.0, 100.0, 50.0, 1.5, 0.0, 104.0);
        p.advance();
        p.advance();
        p.advance();
        assert_eq!(p.rect.right(), 104.0);
        assert!(matches!(p.motion, PlatformMotion::OscillateX { speed, .. } if speed == -1.5));
    }

    #[test]
    fn test_vertical_is_point_bounded() {
        let mut p = Platform::lifting(8600.0, 250.0, 150.0, 50.0, 0.8, 200.0, 300.0);
        for _ in 0..1000 {
            p.advance();
            assert!((200.0..=300.0).contains(&p.rect.top()));
        }
    }

    #[test]
    fn test_vertical_bounce_negates_speed() {
        let speed_of = |p: &Platform| match p.motion {
            PlatformMotion::OscillateY { speed, .. } => speed,
            _ => panic!("not a vertical platform"),
        };
        let mut p = Platform::lifting(0.0, 250.0, 100.0, 50.0, 2.0, 200.0, 300.0);

        // 25 ticks reach the lower bound exactly; the 26th overshoots and turns
        for _ in 0..25 {
            p.advance();
        }
        assert_eq!((p.rect.top(), speed_of(&p)), (300.0, 2.0));
        p.advance();
        assert_eq!((p.rect.top(), speed_of(&p)), (300.0, -2.0));

        for _ in 0..50 {
            p.advance();
        }
        assert_eq!((p.rect.top(), speed_of(&p)), (200.0, -2.0));
        p.advance();
        assert_eq!((p.rect.top(), speed_of(&p)), (200.0, 2.0));
    }
}
