// Copyright 2025 The planar-dcel Authors
// License: MIT
//
// Exact rational geometry.
//
// Every coordinate is a BigRational, so orientation, intersection and area
// are exact. Points order row-major: y first, then x. Angular order around a
// point goes through the AngleOrder trait so the subdivision code never
// touches trigonometry.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

pub type Rat = BigRational;

/// Rational n/d. Panics if `d == 0`, like `Ratio::new`.
pub fn rat(n: i64, d: i64) -> Rat {
    Rat::new(BigInt::from(n), BigInt::from(d))
}

/// Rational n/1.
pub fn int(n: i64) -> Rat {
    Rat::from_integer(BigInt::from(n))
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RatPoint {
    pub x: Rat,
    pub y: Rat,
}

impl RatPoint {
    pub fn new(x: Rat, y: Rat) -> Self {
        Self { x, y }
    }

    pub fn from_ints(x: i64, y: i64) -> Self {
        Self::new(int(x), int(y))
    }

    pub fn origin() -> Self {
        Self::new(Rat::zero(), Rat::zero())
    }

    /// Lossy conversion for rendering only.
    pub fn to_f64(&self) -> (f64, f64) {
        (rat_to_f64(&self.x), rat_to_f64(&self.y))
    }
}

impl<'a> Sub for &'a RatPoint {
    type Output = RatPoint;

    fn sub(self, other: &'a RatPoint) -> RatPoint {
        RatPoint::new(&self.x - &other.x, &self.y - &other.y)
    }
}

impl<'a> Add for &'a RatPoint {
    type Output = RatPoint;

    fn add(self, other: &'a RatPoint) -> RatPoint {
        RatPoint::new(&self.x + &other.x, &self.y + &other.y)
    }
}

impl Ord for RatPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then_with(|| self.x.cmp(&other.x))
    }
}

impl PartialOrd for RatPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RatPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

pub fn rat_to_f64(r: &Rat) -> f64 {
    use num_traits::ToPrimitive;
    r.to_f64().unwrap_or(f64::NAN)
}

// ─────────────────────────── Vector predicates ───────────────────────────

/// 2D cross product of the vectors (a - o) and (b - o).
#[inline]
pub fn cross(o: &RatPoint, a: &RatPoint, b: &RatPoint) -> Rat {
    (&a.x - &o.x) * (&b.y - &o.y) - (&a.y - &o.y) * (&b.x - &o.x)
}

#[inline]
fn cross_vec(u: &RatPoint, v: &RatPoint) -> Rat {
    &u.x * &v.y - &u.y * &v.x
}

#[inline]
fn dot_vec(u: &RatPoint, v: &RatPoint) -> Rat {
    &u.x * &v.x + &u.y * &v.y
}

/// Sign of the turn a -> b -> c. Greater means counter-clockwise.
#[inline]
pub fn orient(a: &RatPoint, b: &RatPoint, c: &RatPoint) -> Ordering {
    cross(a, b, c).cmp(&Rat::zero())
}

/// Signed area of triangle (a, b, c); positive when counter-clockwise.
pub fn triangle_area(a: &RatPoint, b: &RatPoint, c: &RatPoint) -> Rat {
    cross(a, b, c) / int(2)
}

/// Shoelace area of a closed polygon; positive when counter-clockwise.
pub fn signed_area<'a, I>(points: I) -> Rat
where
    I: IntoIterator<Item = &'a RatPoint>,
{
    let pts: Vec<&RatPoint> = points.into_iter().collect();
    let n = pts.len();
    let mut twice = Rat::zero();
    for i in 0..n {
        let p = pts[i];
        let q = pts[(i + 1) % n];
        twice += &p.x * &q.y - &q.x * &p.y;
    }
    twice / int(2)
}

/// Winding number of a closed polygon around `p`. `p` must not lie on the
/// polygon boundary.
pub fn winding_number<'a, I>(polygon: I, p: &RatPoint) -> i64
where
    I: IntoIterator<Item = &'a RatPoint>,
{
    let pts: Vec<&RatPoint> = polygon.into_iter().collect();
    let n = pts.len();
    let mut wn = 0i64;
    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        if a.y <= p.y {
            if b.y > p.y && orient(a, b, p) == Ordering::Greater {
                wn += 1;
            }
        } else if b.y <= p.y && orient(a, b, p) == Ordering::Less {
            wn -= 1;
        }
    }
    wn
}

// ─────────────────────────── Segments ───────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RatSegment {
    pub a: RatPoint,
    pub b: RatPoint,
}

impl RatSegment {
    pub fn new(a: RatPoint, b: RatPoint) -> Self {
        Self { a, b }
    }

    pub fn from_ints(ax: i64, ay: i64, bx: i64, by: i64) -> Self {
        Self::new(RatPoint::from_ints(ax, ay), RatPoint::from_ints(bx, by))
    }

    pub fn is_degenerate(&self) -> bool {
        self.a == self.b
    }

    pub fn is_horizontal(&self) -> bool {
        self.a.y == self.b.y
    }

    pub fn is_vertical(&self) -> bool {
        self.a.x == self.b.x
    }

    pub fn reversed(&self) -> RatSegment {
        RatSegment::new(self.b.clone(), self.a.clone())
    }

    /// Same segment with endpoints in row-major order.
    pub fn canonical(&self) -> RatSegment {
        if self.b < self.a {
            self.reversed()
        } else {
            self.clone()
        }
    }

    /// True if `p` lies on the closed segment.
    pub fn contains(&self, p: &RatPoint) -> bool {
        if !cross(&self.a, &self.b, p).is_zero() {
            return false;
        }
        let (lx, hx) = min_max(&self.a.x, &self.b.x);
        let (ly, hy) = min_max(&self.a.y, &self.b.y);
        lx <= &p.x && &p.x <= hx && ly <= &p.y && &p.y <= hy
    }

    /// x-coordinate of the supporting line at height `y`; None when horizontal.
    pub fn x_at(&self, y: &Rat) -> Option<Rat> {
        if self.is_horizontal() {
            return None;
        }
        let t = (y - &self.a.y) / (&self.b.y - &self.a.y);
        Some(&self.a.x + t * (&self.b.x - &self.a.x))
    }

    fn point_at(&self, t: &Rat) -> RatPoint {
        RatPoint::new(
            &self.a.x + t * (&self.b.x - &self.a.x),
            &self.a.y + t * (&self.b.y - &self.a.y),
        )
    }

    /// Point of the closed segment nearest to `p`.
    pub fn closest_point(&self, p: &RatPoint) -> RatPoint {
        let r = &self.b - &self.a;
        let len2 = dot_vec(&r, &r);
        if len2.is_zero() {
            return self.a.clone();
        }
        let t = dot_vec(&(p - &self.a), &r) / len2;
        if t <= Rat::zero() {
            self.a.clone()
        } else if t >= Rat::one() {
            self.b.clone()
        } else {
            self.point_at(&t)
        }
    }
}

impl fmt::Display for RatSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

fn min_max<'a>(a: &'a Rat, b: &'a Rat) -> (&'a Rat, &'a Rat) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SegmentIntersection {
    None,
    Point(RatPoint),
    /// Collinear overlap of positive length, endpoints in row-major order.
    Overlap(RatPoint, RatPoint),
}

pub fn are_parallel(s: &RatSegment, t: &RatSegment) -> bool {
    cross_vec(&(&s.b - &s.a), &(&t.b - &t.a)).is_zero()
}

/// Intersection of the supporting lines; None when parallel.
pub fn line_intersection(s: &RatSegment, t: &RatSegment) -> Option<RatPoint> {
    let r = &s.b - &s.a;
    let v = &t.b - &t.a;
    let denom = cross_vec(&r, &v);
    if denom.is_zero() {
        return None;
    }
    let u = cross_vec(&(&t.a - &s.a), &v) / denom;
    Some(s.point_at(&u))
}

pub fn is_intersecting(s: &RatSegment, t: &RatSegment) -> bool {
    segment_intersection(s, t) != SegmentIntersection::None
}

/// Exact intersection of two closed segments.
pub fn segment_intersection(s: &RatSegment, t: &RatSegment) -> SegmentIntersection {
    if s.is_degenerate() {
        return if t.contains(&s.a) {
            SegmentIntersection::Point(s.a.clone())
        } else {
            SegmentIntersection::None
        };
    }
    if t.is_degenerate() {
        return if s.contains(&t.a) {
            SegmentIntersection::Point(t.a.clone())
        } else {
            SegmentIntersection::None
        };
    }

    let r = &s.b - &s.a;
    let v = &t.b - &t.a;
    let qp = &t.a - &s.a;
    let denom = cross_vec(&r, &v);
    let zero = Rat::zero();
    let one = Rat::one();

    if !denom.is_zero() {
        let u = cross_vec(&qp, &v) / &denom;
        let w = cross_vec(&qp, &r) / &denom;
        if u >= zero && u <= one && w >= zero && w <= one {
            return SegmentIntersection::Point(s.point_at(&u));
        }
        return SegmentIntersection::None;
    }
    if !cross_vec(&qp, &r).is_zero() {
        return SegmentIntersection::None;
    }

    // Collinear: project t onto s's parameter range.
    let rr = dot_vec(&r, &r);
    let t0 = dot_vec(&qp, &r) / &rr;
    let t1 = &t0 + dot_vec(&v, &r) / &rr;
    let (lo, hi) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
    let lo = if lo > zero { lo } else { zero };
    let hi = if hi < one { hi } else { one };
    match lo.cmp(&hi) {
        Ordering::Greater => SegmentIntersection::None,
        Ordering::Equal => SegmentIntersection::Point(s.point_at(&lo)),
        Ordering::Less => {
            let p = s.point_at(&lo);
            let q = s.point_at(&hi);
            if q < p {
                SegmentIntersection::Overlap(q, p)
            } else {
                SegmentIntersection::Overlap(p, q)
            }
        }
    }
}

// ─────────────────────────── Angular order ───────────────────────────

/// Orders directions leaving a common origin counter-clockwise, starting
/// at the positive x-axis.
pub trait AngleOrder {
    fn compare(&self, origin: &RatPoint, a: &RatPoint, b: &RatPoint) -> Ordering;
}

/// Exact angular order from half-plane classification and cross products.
#[derive(Clone, Copy, Debug, Default)]
pub struct CrossProductOrder;

impl CrossProductOrder {
    // Upper half: angle in [0, pi).
    fn upper(d: &RatPoint) -> bool {
        d.y.is_positive() || (d.y.is_zero() && d.x.is_positive())
    }
}

impl AngleOrder for CrossProductOrder {
    fn compare(&self, origin: &RatPoint, a: &RatPoint, b: &RatPoint) -> Ordering {
        let da = a - origin;
        let db = b - origin;
        match (Self::upper(&da), Self::upper(&db)) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => cross_vec(&db, &da).cmp(&Rat::zero()),
        }
    }
}
