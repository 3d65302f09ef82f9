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

use std::{path::Path, time::Duration};
use serde::{Serialize,Deserialize};

use routeanim_common::datetime::{serialize_duration, deserialize_duration};
use crate::errors::Result;
use crate::interpolate::InterpolationPolicy;
use crate::speed::SpeedMapping;

/// the smallest tick period we ever schedule. Protects against runaway timer loops
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(5);

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(80);

/// every how many points the map view should re-center on the marker
pub const DEFAULT_FOLLOW_INTERVAL: usize = 5;

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(default)]
pub struct AnimatorConfig {
    pub policy: InterpolationPolicy,

    #[serde(serialize_with="serialize_duration", deserialize_with="deserialize_duration")]
    pub tick_period: Duration,

    /// floor for requested periods. Values below [`MIN_TICK_PERIOD`] are ignored
    #[serde(serialize_with="serialize_duration", deserialize_with="deserialize_duration")]
    pub min_tick_period: Duration,

    /// 0 turns off follow hints
    pub follow_interval: usize,

    pub speed_mapping: SpeedMapping,
}

impl Default for AnimatorConfig {
    fn default()->Self {
        AnimatorConfig {
            policy: InterpolationPolicy::default(),
            tick_period: DEFAULT_TICK_PERIOD,
            min_tick_period: MIN_TICK_PERIOD,
            follow_interval: DEFAULT_FOLLOW_INTERVAL,
            speed_mapping: SpeedMapping::default(),
        }
    }
}

impl AnimatorConfig {
    /// the effective period floor
    pub fn period_floor (&self)->Duration { self.min_tick_period.max( MIN_TICK_PERIOD) }

    pub fn clamp_period (&self, period: Duration)->Duration { period.max( self.period_floor()) }
}

/// read a RON config file
pub fn load_config<C,P> (path: P) -> Result<C> where C: for <'a> Deserialize<'a>, P: AsRef<Path> {
    let data = std::fs::read( path.as_ref())?;
    Ok( ron::de::from_bytes( data.as_slice())? )
}

#[cfg(test)]
mod tests {
    use super::*;
    use routeanim_common::datetime::millis;

    #[test]
    fn test_ron_config() {
        let input = r#"(
            policy: DistanceBased( spacing: 25.0 ),
            tick_period: "40ms",
            follow_interval: 10,
        )"#;

        let config: AnimatorConfig = ron::from_str(input).unwrap();
        assert_eq!( config.policy, InterpolationPolicy::by_meters(25.0));
        assert_eq!( config.tick_period, millis(40));
        assert_eq!( config.follow_interval, 10);
        assert_eq!( config.min_tick_period, MIN_TICK_PERIOD); // defaulted
        assert_eq!( config.speed_mapping, SpeedMapping::default());
    }

    #[test]
    fn test_clamp() {
        let mut config = AnimatorConfig::default();
        assert_eq!( config.clamp_period( Duration::ZERO), MIN_TICK_PERIOD);
        assert_eq!( config.clamp_period( millis(100)), millis(100));

        config.min_tick_period = millis(1); // can't go below the hard floor
        assert_eq!( config.clamp_period( millis(2)), MIN_TICK_PERIOD);

        config.min_tick_period = millis(20);
        assert_eq!( config.clamp_period( millis(10)), millis(20));
    }

    #[test]
    fn test_default_roundtrip() {
        let s = ron::ser::to_string( &AnimatorConfig::default()).unwrap();
        let config: AnimatorConfig = ron::from_str(&s).unwrap();
        assert_eq!( config, AnimatorConfig::default());
    }

    #[test]
    fn test_load_config_file() {
        let config: AnimatorConfig = load_config( "configs/animator.ron").unwrap();
        assert_eq!( config, AnimatorConfig::default());

        assert!( load_config::<AnimatorConfig,_>( "configs/does_not_exist.ron").is_err());
    }
}
