/*
 * Copyright (c) 2024, United States Government, as represented by the
 * Administrator of the National Aeronautics and Space Administration.
 * All rights reserved.
 *
 * The ODIN - Open Data Integration Framework is licensed under the
 * Apache License, Version 2.0 (the "License"); you may not use this file
 * except in compliance with the License. You may obtain a copy of the
 * License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! turning a sparse route into a dense sequence of points we can animate along

use std::ops::Index;
use serde::{Serialize,Deserialize};
use uom::si::f64::Length;
use uom::si::length::meter;
use tracing::debug;

use routeanim_common::geo::{GeoPoint,GeoLineString};
use crate::errors::{Result, invalid_input};

pub const DEFAULT_SUBDIVISIONS: usize = 10;

/// upper bound for the number of points of an interpolated path. Policies that would exceed it are rejected
pub const MAX_PATH_POINTS: usize = 10_000_000;

/// how we fill in points between consecutive waypoints
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub enum InterpolationPolicy {
    /// `subdivisions` planar interpolated points per segment. Cheap and adequate at city/regional scale
    FixedSubdivision { subdivisions: usize },

    /// great circle interpolation with points at most `spacing` apart (uom lengths serialize as meters)
    DistanceBased { spacing: Length },
}

impl Default for InterpolationPolicy {
    fn default()->Self { InterpolationPolicy::FixedSubdivision { subdivisions: DEFAULT_SUBDIVISIONS } }
}

impl InterpolationPolicy {
    pub fn fixed (subdivisions: usize)->Self { InterpolationPolicy::FixedSubdivision { subdivisions } }
    pub fn by_distance (spacing: Length)->Self { InterpolationPolicy::DistanceBased { spacing } }
    pub fn by_meters (spacing: f64)->Self { InterpolationPolicy::DistanceBased { spacing: Length::new::<meter>(spacing) } }

    fn check (&self)->Result<()> {
        match self {
            InterpolationPolicy::FixedSubdivision { subdivisions } => {
                if *subdivisions == 0 { return Err( invalid_input("subdivision count has to be positive")) }
                if *subdivisions > MAX_PATH_POINTS {
                    return Err( invalid_input( format!("subdivision count {subdivisions} exceeds {MAX_PATH_POINTS}")))
                }
            }
            InterpolationPolicy::DistanceBased { spacing } => {
                let s = spacing.get::<meter>();
                if !(s.is_finite() && s > 0.0) { return Err( invalid_input( format!("invalid point spacing {s}m"))) }
            }
        }
        Ok(())
    }

    /// number of points to emit for a non-degenerate segment from a to b (excluding b)
    fn segment_points (&self, a: &GeoPoint, b: &GeoPoint)->usize {
        match self {
            InterpolationPolicy::FixedSubdivision { subdivisions } => *subdivisions,
            InterpolationPolicy::DistanceBased { spacing } => {
                let n = (a.haversine_distance(b).get::<meter>() / spacing.get::<meter>()).ceil();
                if n.is_finite() && n >= 1.0 { n as usize } else { 1 }
            }
        }
    }

    fn point_at (&self, a: &GeoPoint, b: &GeoPoint, j: usize, n: usize)->GeoPoint {
        if j == 0 { return *a } // no endpoint drift

        let fraction = j as f64 / n as f64;
        match self {
            InterpolationPolicy::FixedSubdivision {..} => a.lerp( b, fraction),
            InterpolationPolicy::DistanceBased {..} => a.slerp( b, fraction),
        }
    }
}

/// the dense, never empty point sequence we animate along. Instances are immutable - if the route changes
/// we interpolate a new one
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct InterpolatedPath {
    points: Vec<GeoPoint>
}

impl InterpolatedPath {
    /// wrap an explicitly supplied point sequence
    pub fn new (points: Vec<GeoPoint>)->Result<Self> {
        if points.is_empty() { return Err( invalid_input("empty path")) }
        Ok( InterpolatedPath { points })
    }

    pub fn len (&self)->usize { self.points.len() }

    pub fn get (&self, i: usize)->Option<&GeoPoint> { self.points.get(i) }

    pub fn first (&self)->&GeoPoint { &self.points[0] } // never empty
    pub fn last (&self)->&GeoPoint { &self.points[self.points.len()-1] }

    pub fn points (&self)->&[GeoPoint] { &self.points }

    pub fn iter (&self)->std::slice::Iter<'_,GeoPoint> { self.points.iter() }

    pub fn haversine_length (&self)->Length { route_length( &self.points) }

    /// the polyline a map surface would draw for this path
    pub fn to_line_string (&self)->GeoLineString { GeoLineString::from_geo_points( &self.points) }

    pub fn into_points (self)->Vec<GeoPoint> { self.points }
}

impl Index<usize> for InterpolatedPath {
    type Output = GeoPoint;
    fn index (&self, i: usize)->&GeoPoint { &self.points[i] }
}

impl<'a> IntoIterator for &'a InterpolatedPath {
    type Item = &'a GeoPoint;
    type IntoIter = std::slice::Iter<'a,GeoPoint>;
    fn into_iter (self)->Self::IntoIter { self.points.iter() }
}

/// compute the dense path for the given waypoints and policy.
///
/// For each consecutive waypoint pair (a,b) we emit the points at fractions `0/n .. (n-1)/n` (with `n` depending
/// on the policy), followed by the last waypoint. Consecutive segments therefore never duplicate their shared
/// waypoint. Coincident pairs only contribute a single point.
/// This is a pure function - same input always yields the same output.
pub fn interpolate (waypoints: &[GeoPoint], policy: InterpolationPolicy)->Result<InterpolatedPath> {
    if waypoints.len() < 2 {
        return Err( invalid_input( format!("need at least 2 waypoints, got {}", waypoints.len())))
    }
    policy.check()?;

    let mut points: Vec<GeoPoint> = Vec::with_capacity( estimated_len( waypoints, &policy));

    for seg in waypoints.windows(2) {
        let (a,b) = (&seg[0], &seg[1]);
        if a.is_coincident(b) {
            points.push(*a);
        } else {
            let n = policy.segment_points( a, b);
            if n >= MAX_PATH_POINTS.saturating_sub( points.len()) { // leave room for the final waypoint
                return Err( invalid_input( format!("route would exceed {MAX_PATH_POINTS} points, use a coarser policy")))
            }
            for j in 0..n {
                points.push( policy.point_at( a, b, j, n));
            }
        }
    }
    points.push( waypoints[waypoints.len()-1]);

    debug!("interpolated {} waypoints into {} points using {:?}", waypoints.len(), points.len(), policy);
    Ok( InterpolatedPath { points })
}

pub fn interpolate_fixed (waypoints: &[GeoPoint], subdivisions: usize)->Result<InterpolatedPath> {
    interpolate( waypoints, InterpolationPolicy::fixed( subdivisions))
}

pub fn interpolate_by_distance (waypoints: &[GeoPoint], spacing: Length)->Result<InterpolatedPath> {
    interpolate( waypoints, InterpolationPolicy::by_distance( spacing))
}

/// total great circle length of a point sequence
pub fn route_length (points: &[GeoPoint])->Length {
    points.windows(2).fold( Length::new::<meter>(0.0), |acc,w| acc + w[0].haversine_distance( &w[1]))
}

fn estimated_len (waypoints: &[GeoPoint], policy: &InterpolationPolicy)->usize {
    match policy {
        InterpolationPolicy::FixedSubdivision { subdivisions } => {
            subdivisions.saturating_mul( waypoints.len()-1).saturating_add(1).min( MAX_PATH_POINTS)
        }
        InterpolationPolicy::DistanceBased {..} => waypoints.len()
    }
}
