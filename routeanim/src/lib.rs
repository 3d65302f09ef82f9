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

//! animating a marker along a geographic route: the route (a list of waypoints) is densified into an
//! [`InterpolatedPath`] which is then walked one point per tick by an [`AnimationScheduler`]

use std::path::Path;

pub mod errors;
pub mod interpolate;
pub mod scheduler;
pub mod speed;
pub mod config;

pub use errors::{Result, RouteAnimError};
pub use interpolate::{interpolate, route_length, InterpolatedPath, InterpolationPolicy};
pub use scheduler::{AnimationScheduler, Phase, TickEvent};
pub use speed::SpeedMapping;
pub use config::{AnimatorConfig, MIN_TICK_PERIOD, load_config};

use routeanim_common::geo::GeoPoint;

/// read waypoints from a JSON array of `{"lon":..,"lat":..}` objects (`lng`/`longitude`, `latitude` also work)
pub fn read_waypoints<P: AsRef<Path>> (path: P)->Result<Vec<GeoPoint>> {
    let bytes = std::fs::read( path.as_ref())?;
    parse_waypoints( &bytes)
}

pub fn parse_waypoints (bytes: &[u8])->Result<Vec<GeoPoint>> {
    Ok( serde_json::from_slice( bytes)?)
}
