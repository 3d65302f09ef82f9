/*
 * Copyright © 2024, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! normalized geodetic angles. `GeoPoint` constructors and the great circle math go through these so that
//! coordinates are always within their canonical ranges

use std::{fmt, marker::PhantomData};

/// normalize to [-90,90]. Values beyond the pole are folded back, i.e. 100 becomes 80
#[inline]
pub fn normalize_90 (d:f64) -> f64 {
    let x = normalize_180(d);

    if x < -90.0 { -180.0 - x }
    else if x > 90.0 { 180.0 - x }
    else { x }
}

/// normalize to [-180,180]
#[inline]
pub fn normalize_180 (d: f64) -> f64 {
    let x = d % 360.0;

    if x < -180.0 { 360.0 + x }
    else if x > 180.0 { x - 360.0 }
    else { x }
}

pub trait AngleKind {
    const NAME: &'static str;
    fn normalize (deg: f64)->f64;
}

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct LatitudeKind;
impl AngleKind for LatitudeKind {
    const NAME: &'static str = "Latitude";
    fn normalize (deg: f64)->f64 { normalize_90(deg) }
}

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct LongitudeKind;
impl AngleKind for LongitudeKind {
    const NAME: &'static str = "Longitude";
    fn normalize (deg: f64)->f64 { normalize_180(deg) }
}

/// degrees that are normalized on construction according to their kind
#[derive(Clone,Copy,PartialEq)]
pub struct NormalizedAngle<K: AngleKind> {
    deg: f64,
    kind: PhantomData<K>,
}

impl<K: AngleKind> NormalizedAngle<K> {
    #[inline]
    pub fn from_degrees (deg: f64)->Self { NormalizedAngle { deg: K::normalize(deg), kind: PhantomData } }

    #[inline] pub fn degrees (&self)->f64 { self.deg }
    #[inline] pub fn radians (&self)->f64 { self.deg.to_radians() }
}

impl<K: AngleKind> fmt::Display for NormalizedAngle<K> {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result { write!(f, "{}°", self.deg) }
}

impl<K: AngleKind> fmt::Debug for NormalizedAngle<K> {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result { write!(f, "{}({})", K::NAME, self.deg) }
}

pub type Longitude = NormalizedAngle<LongitudeKind>;
pub type Latitude = NormalizedAngle<LatitudeKind>;
