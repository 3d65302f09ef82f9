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
#![allow(non_snake_case,uncommon_codepoints)]

//! this module provides the geodetic value types we animate along: points on the mean earth sphere
//! and polylines thereof. We wrap the corresponding [geo](https://docs.rs/geo/latest/geo/index.html) types
//! (so that rendering collaborators can use them without copying) and add units-of-measure via
//! [uom](https://docs.rs/uom/latest/uom/) for distances.
//! Note that `geo` uses x/y order, i.e. longitude comes first.

use std::fmt;

use serde::Deserialize;
use serde::ser::{Serialize as SerializeTrait, Serializer, SerializeStruct};

use ::geo::{Coord, CoordsIter, LineString, Point};

use uom::si::f64::Length;
use uom::si::length::meter;

use crate::{sin, cos, sin2, sqrt, atan2, pow2};
use crate::angle::{Longitude, Latitude};
use crate::geo_constants::{MEAN_EARTH_RADIUS, COINCIDENT_ANGLE};

pub type GeoCoord = Coord<f64>;

/* #region GeoPoint ***********************************************************************************************/

/// a wrapper for geo::Point that uses geodetic degrees stored as f64
#[derive(Debug,Clone,Copy,PartialEq,Deserialize)]
#[serde(from = "LonLatFields")]
pub struct GeoPoint(Point);

impl GeoPoint {
    pub fn from_lon_lat(lon: Longitude, lat: Latitude) -> Self {
        GeoPoint( Point::new( lon.degrees(), lat.degrees()))
    }

    pub fn from_lon_lat_degrees (lon: f64, lat: f64) -> Self {
        GeoPoint::from_lon_lat( Longitude::from_degrees(lon), Latitude::from_degrees(lat))
    }

    /// the order in which routing services usually hand out coordinates
    pub fn from_lat_lon_degrees (lat: f64, lon: f64) -> Self {
        GeoPoint::from_lon_lat_degrees( lon, lat)
    }

    pub fn longitude(&self) -> Longitude { Longitude::from_degrees( self.0.x()) }
    pub fn latitude(&self) -> Latitude { Latitude::from_degrees( self.0.y()) }

    #[inline] pub fn lon_degrees(&self) -> f64 { self.0.x() }
    #[inline] pub fn lat_degrees(&self) -> f64 { self.0.y() }

    pub fn point (&self) -> &Point { &self.0 }
    pub fn coord (&self)->GeoCoord { self.0.0 }

    /// planar interpolation of latitude and longitude. This is only a reasonable approximation
    /// for short segments that do not cross the antimeridian
    pub fn lerp (&self, other: &GeoPoint, fraction: f64) -> GeoPoint {
        let lon = self.lon_degrees() + (other.lon_degrees() - self.lon_degrees()) * fraction;
        let lat = self.lat_degrees() + (other.lat_degrees() - self.lat_degrees()) * fraction;
        GeoPoint( Point::new( lon, lat))
    }

    /// great circle angle (in radians) between self and other on the unit sphere (haversine formula)
    pub fn angular_distance (&self, other: &GeoPoint) -> f64 {
        let φ1 = self.latitude().radians();
        let φ2 = other.latitude().radians();
        let Δφ = φ2 - φ1;
        let Δλ = other.longitude().radians() - self.longitude().radians();

        let a = sin2(Δφ / 2.0) + cos(φ1) * cos(φ2) * sin2(Δλ / 2.0);
        2.0 * atan2( sqrt(a), sqrt( (1.0 - a).max(0.0)))
    }

    /// great circle distance on the mean earth sphere
    pub fn haversine_distance (&self, other: &GeoPoint) -> Length {
        Length::new::<meter>( MEAN_EARTH_RADIUS * self.angular_distance(other))
    }

    /// is the distance between self and other below a millimeter
    pub fn is_coincident (&self, other: &GeoPoint) -> bool {
        self == other || self.angular_distance(other) < COINCIDENT_ANGLE
    }

    /// spherical linear interpolation along the short great circle arc from self to other.
    /// The arc between antipodal points is not defined, in which case we fall back to [`lerp`](Self::lerp)
    pub fn slerp (&self, other: &GeoPoint, fraction: f64) -> GeoPoint {
        let δ = self.angular_distance(other);
        let sin_δ = sin(δ);
        if sin_δ.abs() < 1.0e-12 {
            return if δ < 1.0 { *self } else { self.lerp( other, fraction) }
        }

        let φ1 = self.latitude().radians();
        let λ1 = self.longitude().radians();
        let φ2 = other.latitude().radians();
        let λ2 = other.longitude().radians();

        let a = sin( (1.0 - fraction) * δ) / sin_δ;
        let b = sin( fraction * δ) / sin_δ;

        let x = a * cos(φ1) * cos(λ1) + b * cos(φ2) * cos(λ2);
        let y = a * cos(φ1) * sin(λ1) + b * cos(φ2) * sin(λ2);
        let z = a * sin(φ1) + b * sin(φ2);

        let φ = atan2( z, sqrt( pow2(x) + pow2(y)));
        let λ = atan2( y, x);

        GeoPoint::from_lon_lat_degrees( λ.to_degrees(), φ.to_degrees())
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.0.x(),self.0.y())
    }
}

impl SerializeTrait for GeoPoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        let mut state = serializer.serialize_struct("GeoPoint", 2)?;
        state.serialize_field("lon", &self.lon_degrees())?;
        state.serialize_field("lat", &self.lat_degrees())?;
        state.end()
    }
}

// we accept "lon", "longitude" or "x" for longitude degrees and "lat", "latitude" or "y" for latitude degrees.
// This allows to directly deserialize from data that was serialized by `geo` types (which uses "x", "y")
#[derive(Deserialize)]
struct LonLatFields {
    #[serde(alias = "longitude", alias = "lng", alias = "x")]
    lon: f64,
    #[serde(alias = "latitude", alias = "y")]
    lat: f64,
}

impl From<LonLatFields> for GeoPoint {
    fn from (f: LonLatFields) -> Self { GeoPoint::from_lon_lat_degrees( f.lon, f.lat) }
}

/* #endregion GeoPoint */


/* #region GeoLineString ***********************************************************************************************/

/// polyline of GeoPoints, which is what map rendering collaborators draw routes from
#[derive(Debug,Clone,PartialEq)]
pub struct GeoLineString(LineString);

impl GeoLineString {
    pub fn from_geo_points (ps: &[GeoPoint]) -> Self {
        let coords: Vec<GeoCoord> = ps.iter().map(|p| p.coord()).collect();
        GeoLineString( LineString::new(coords))
    }

    pub fn as_geo_points (&self)->Vec<GeoPoint> {
        self.0.points().map( GeoPoint).collect()
    }

    pub fn line_string (&self) -> &LineString { &self.0 }

    pub fn coords_count (&self)->usize { self.0.coords_count() }

    /// sum of great circle distances between consecutive points
    pub fn haversine_length (&self) -> Length {
        let ps = self.as_geo_points();
        ps.windows(2).fold( Length::new::<meter>(0.0), |acc, w| acc + w[0].haversine_distance( &w[1]))
    }
}

impl SerializeTrait for GeoLineString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        let mut state = serializer.serialize_struct("GeoLineString", 1)?;
        state.serialize_field("points", &self.as_geo_points())?;
        state.end()
    }
}

/* #endregion GeoLineString */
