//! Pure style factories. Every call returns a fresh style for the given map
//! resolution (meters per pixel); nothing is cached or shared between features.

use foundation::color::{Rgb, lerp};
use scene::components::Symbol;

pub const SYNCED_STOP: Rgb = Rgb::new(64, 175, 69);
pub const SYNCED_ROUTE: Rgb = Rgb::new(0, 170, 9);
pub const UNSYNCED: Rgb = Rgb::new(255, 119, 0);
pub const NEUTRAL: Rgb = Rgb::new(118, 118, 118);
pub const OBSTACLE: Rgb = Rgb::new(246, 92, 20);
pub const CLUSTER_OUTLINE: Rgb = Rgb::new(53, 53, 53);
pub const WHITE: Rgb = Rgb::new(255, 255, 255);
pub const BBOX_OUTLINE: Rgb = Rgb::new(0x33, 0x99, 0xcc);

pub const SPEED_SLOW: Rgb = Rgb::new(0xaa, 0x00, 0x00);
pub const SPEED_MEDIUM: Rgb = Rgb::new(0xaa, 0xaa, 0x00);
pub const SPEED_FAST: Rgb = Rgb::new(0x00, 0xaa, 0x00);
/// Speed (km/h) at which the ramp saturates.
pub const SPEED_SATURATION_KMH: f64 = 60.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape {
    Circle { radius: f64 },
    /// Regular polygon, e.g. 4 points at π/4 is an axis-aligned square.
    Regular { points: u8, radius: f64, angle: f64 },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Marker {
    pub shape: Shape,
    pub fill: Rgb,
    pub stroke: Stroke,
    pub scale: f64,
}

/// Resolved drawing instructions for one feature. `Style::default()` draws nothing.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Style {
    pub marker: Option<Marker>,
    pub stroke: Option<Stroke>,
    pub fill: Option<[f32; 4]>,
}

impl Style {
    pub fn is_empty(&self) -> bool {
        self.marker.is_none() && self.stroke.is_none() && self.fill.is_none()
    }
}

pub fn style_for(symbol: Symbol, resolution: f64) -> Style {
    let r6 = resolution.max(f64::MIN_POSITIVE).powf(1.0 / 6.0);
    let r8 = resolution.max(f64::MIN_POSITIVE).powf(1.0 / 8.0);

    match symbol {
        Symbol::Hidden => Style::default(),
        Symbol::Stop { synced } => {
            let color = if synced { SYNCED_STOP } else { UNSYNCED };
            circle(color, 10.0, 25.0, WHITE, 1.0 / 3.0 / r6)
        }
        Symbol::RouteLine { synced } => {
            let color = if synced { SYNCED_ROUTE } else { UNSYNCED };
            line(color, 4.0 / r6)
        }
        Symbol::StopPosition { synced } => {
            let color = if synced { SYNCED_ROUTE } else { UNSYNCED };
            square(color, 1.0 / 2.0 / r6)
        }
        Symbol::TrafficStop => circle(NEUTRAL, 8.0, 20.0, WHITE, 1.0 / 3.0 / r6),
        Symbol::TrafficStopPosition => square(NEUTRAL, 1.0 / 2.0 / r6),
        Symbol::TrafficLine { speed } => line(speed_color(speed), 4.0 / r6),
        Symbol::Obstacle => Style {
            marker: Some(Marker {
                shape: Shape::Regular {
                    points: 3,
                    radius: 8.0,
                    angle: 0.0,
                },
                fill: WHITE,
                stroke: Stroke {
                    color: OBSTACLE,
                    width: 3.0,
                },
                scale: 1.0 / r6,
            }),
            ..Style::default()
        },
        Symbol::ReferenceStop => circle(NEUTRAL, 2.0, 8.0, WHITE, 1.0 / r8),
        Symbol::ClusteredStop { fill } => circle(CLUSTER_OUTLINE, 1.0, 8.0, fill.to_rgb(), 1.0 / r8),
        Symbol::BoundingBox => Style {
            stroke: Some(Stroke {
                color: BBOX_OUTLINE,
                width: 1.25,
            }),
            fill: Some(WHITE.to_rgba_f32(0.4)),
            ..Style::default()
        },
    }
}

/// Traffic color ramp: red below, yellow at half, green at and above
/// `SPEED_SATURATION_KMH`. Grey without data.
pub fn speed_color(speed: Option<f64>) -> Rgb {
    // A zero speed is treated as missing data.
    let Some(speed) = speed.filter(|s| *s != 0.0 && s.is_finite()) else {
        return NEUTRAL;
    };
    let ratio = (speed / SPEED_SATURATION_KMH).min(1.0);
    if ratio < 0.5 {
        lerp(SPEED_SLOW, SPEED_MEDIUM, 2.0 * ratio)
    } else {
        lerp(SPEED_MEDIUM, SPEED_FAST, 2.0 * (ratio - 0.5))
    }
}

fn circle(stroke: Rgb, width: f64, radius: f64, fill: Rgb, scale: f64) -> Style {
    Style {
        marker: Some(Marker {
            shape: Shape::Circle { radius },
            fill,
            stroke: Stroke {
                color: stroke,
                width,
            },
            scale,
        }),
        ..Style::default()
    }
}

fn square(stroke: Rgb, scale: f64) -> Style {
    Style {
        marker: Some(Marker {
            shape: Shape::Regular {
                points: 4,
                radius: 15.0,
                angle: std::f64::consts::FRAC_PI_4,
            },
            fill: WHITE,
            stroke: Stroke {
                color: stroke,
                width: 4.0,
            },
            scale,
        }),
        ..Style::default()
    }
}

fn line(color: Rgb, width: f64) -> Style {
    Style {
        stroke: Some(Stroke { color, width }),
        ..Style::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::color::Hsl;

    #[test]
    fn sync_tier_picks_color() {
        let synced = style_for(Symbol::Stop { synced: true }, 1.0);
        let unsynced = style_for(Symbol::Stop { synced: false }, 1.0);
        assert_eq!(synced.marker.map(|m| m.stroke.color), Some(SYNCED_STOP));
        assert_eq!(unsynced.marker.map(|m| m.stroke.color), Some(UNSYNCED));
    }

    #[test]
    fn scale_shrinks_with_resolution() {
        let near = style_for(Symbol::RouteLine { synced: true }, 1.0);
        let far = style_for(Symbol::RouteLine { synced: true }, 64.0);
        assert_eq!(near.stroke.map(|s| s.width), Some(4.0));
        let far_width = far.stroke.map(|s| s.width).expect("stroke");
        assert!((far_width - 2.0).abs() < 1e-9);
    }

    #[test]
    fn hidden_draws_nothing() {
        assert!(style_for(Symbol::Hidden, 10.0).is_empty());
    }

    #[test]
    fn speed_ramp() {
        assert_eq!(speed_color(None), NEUTRAL);
        assert_eq!(speed_color(Some(0.0)), NEUTRAL);
        assert_eq!(speed_color(Some(30.0)), SPEED_MEDIUM);
        assert_eq!(speed_color(Some(60.0)), SPEED_FAST);
        assert_eq!(speed_color(Some(120.0)), SPEED_FAST);
        assert_eq!(speed_color(Some(15.0)), Rgb::new(0xaa, 0x55, 0x00));
    }

    #[test]
    fn clustered_stop_uses_palette_fill() {
        let fill = Hsl::new(0.0, 100.0, 50.0);
        let style = style_for(Symbol::ClusteredStop { fill }, 1.0);
        let marker = style.marker.expect("marker");
        assert_eq!(marker.fill, Rgb::new(255, 0, 0));
        assert_eq!(marker.stroke.color, CLUSTER_OUTLINE);
    }
}
