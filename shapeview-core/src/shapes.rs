/// Built-in parametric shapes
use std::f32::consts::{PI, TAU};

use crate::math::{IVec2, Vec2, Vec3};
use crate::parametric::{Evaluator, ParametricInterval};

fn interval(divisions: (i32, i32), upper_bound: (f32, f32), texture_repeat: (f32, f32)) -> ParametricInterval {
    ParametricInterval {
        divisions: IVec2::new(divisions.0, divisions.1),
        upper_bound: Vec2::new(upper_bound.0, upper_bound.1),
        texture_repeat: Vec2::new(texture_repeat.0, texture_repeat.1),
    }
}

/// Cone standing on the xz plane, apex up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    pub height: f32,
    pub radius: f32,
}

impl Evaluator for Cone {
    fn interval(&self) -> ParametricInterval {
        interval((20, 20), (TAU, 1.0), (30.0, 20.0))
    }

    fn evaluate(&self, domain: &Vec2) -> Vec3 {
        let u = domain.x;
        let v = domain.y;
        let ring = self.radius * (1.0 - v);
        Vec3::new(ring * u.cos(), self.height * (v - 0.5), -ring * u.sin())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub radius: f32,
}

impl Evaluator for Sphere {
    fn interval(&self) -> ParametricInterval {
        interval((20, 20), (PI, TAU), (20.0, 35.0))
    }

    fn evaluate(&self, domain: &Vec2) -> Vec3 {
        let u = domain.x;
        let v = domain.y;
        Vec3::new(
            self.radius * u.sin() * v.cos(),
            self.radius * u.cos(),
            -self.radius * u.sin() * v.sin(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Torus {
    pub major_radius: f32,
    pub minor_radius: f32,
}

impl Evaluator for Torus {
    fn interval(&self) -> ParametricInterval {
        interval((20, 20), (TAU, TAU), (40.0, 10.0))
    }

    fn evaluate(&self, domain: &Vec2) -> Vec3 {
        let u = domain.x;
        let v = domain.y;
        let ring = self.major_radius + self.minor_radius * v.cos();
        Vec3::new(ring * u.cos(), ring * u.sin(), self.minor_radius * v.sin())
    }
}

/// A thin tube swept along a (2, 3) torus knot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrefoilKnot {
    pub scale: f32,
}

impl Evaluator for TrefoilKnot {
    fn interval(&self) -> ParametricInterval {
        interval((60, 15), (TAU, TAU), (100.0, 8.0))
    }

    fn evaluate(&self, domain: &Vec2) -> Vec3 {
        const A: f32 = 0.5;
        const B: f32 = 0.3;
        const C: f32 = 0.5;
        const D: f32 = 0.1;

        let u = (TAU - domain.x) * 2.0;
        let v = domain.y;

        let r = A + B * (1.5 * u).cos();
        let center = Vec3::new(r * u.cos(), r * u.sin(), C * (1.5 * u).sin());

        // Derivative of the centre curve, then a frame around it
        let tangent = Vec3::new(
            -1.5 * B * (1.5 * u).sin() * u.cos() - r * u.sin(),
            -1.5 * B * (1.5 * u).sin() * u.sin() + r * u.cos(),
            1.5 * C * (1.5 * u).cos(),
        )
        .normalize();
        let side = Vec3::new(tangent.y, -tangent.x, 0.0).normalize();
        let up = tangent.cross(&side);

        let range = Vec3::new(
            center.x + D * (side.x * v.cos() + up.x * v.sin()),
            center.y + D * (side.y * v.cos() + up.y * v.sin()),
            center.z + D * up.z * v.sin(),
        );
        range * self.scale
    }
}

/// An elliptical cross-section making a half twist around a circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MobiusStrip {
    pub scale: f32,
}

impl Evaluator for MobiusStrip {
    fn interval(&self) -> ParametricInterval {
        interval((40, 20), (TAU, TAU), (40.0, 15.0))
    }

    fn evaluate(&self, domain: &Vec2) -> Vec3 {
        const MAJOR: f32 = 1.25;
        const A: f32 = 0.125;
        const B: f32 = 0.5;

        let u = domain.x;
        let t = domain.y;
        let phi = u / 2.0;

        // Ellipse whose major axis makes angle phi with the x axis
        let x = A * t.cos() * phi.cos() - B * t.sin() * phi.sin();
        let y = A * t.cos() * phi.sin() + B * t.sin() * phi.cos();

        Vec3::new((MAJOR + x) * u.cos(), (MAJOR + x) * u.sin(), y) * self.scale
    }
}

/// Figure-eight free Klein bottle, flipped so its normals face outwards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KleinBottle {
    pub scale: f32,
}

impl Evaluator for KleinBottle {
    fn interval(&self) -> ParametricInterval {
        interval((20, 20), (TAU, TAU), (15.0, 50.0))
    }

    fn evaluate(&self, domain: &Vec2) -> Vec3 {
        let v = 1.0 - domain.x;
        let u = domain.y;
        let tube = 2.0 * (1.0 - u.cos() / 2.0);

        let (x, y) = if u < PI {
            (
                3.0 * u.cos() * (1.0 + u.sin()) + tube * u.cos() * v.cos(),
                8.0 * u.sin() + tube * u.sin() * v.cos(),
            )
        } else {
            (3.0 * u.cos() * (1.0 + u.sin()) + tube * (v + PI).cos(), 8.0 * u.sin())
        };

        Vec3::new(x, -y, -tube * v.sin()) * self.scale
    }

    fn invert_normal(&self, domain: &Vec2) -> bool {
        domain.y > 3.0 * PI / 2.0
    }
}
