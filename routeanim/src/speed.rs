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

//! mapping of UI speed control values to tick periods. This is a presentation concern - the scheduler
//! itself only knows periods (and clamps whatever it gets to its floor)

use std::time::Duration;
use serde::{Serialize,Deserialize};
use routeanim_common::datetime::{millis, serialize_duration, deserialize_duration};

pub const DEFAULT_SPEED_OFFSET: u32 = 210;
pub const DEFAULT_FIXED_PERIOD: Duration = Duration::from_millis(50);

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub enum SpeedMapping {
    /// period is `offset - speed` milliseconds, i.e. larger slider values mean faster animation
    InvertedLinear { offset: u32 },

    /// period is `base_millis / speed` milliseconds
    Reciprocal { base_millis: f64 },

    /// ignore the slider
    Fixed (
        #[serde(serialize_with="serialize_duration", deserialize_with="deserialize_duration")]
        Duration
    ),
}

impl Default for SpeedMapping {
    fn default()->Self { SpeedMapping::InvertedLinear { offset: DEFAULT_SPEED_OFFSET } }
}

impl SpeedMapping {
    /// note this can return zero durations for out-of-range speed values
    pub fn period_for (&self, speed: u32)->Duration {
        match self {
            SpeedMapping::InvertedLinear { offset } => millis( offset.saturating_sub(speed) as u64),
            SpeedMapping::Reciprocal { base_millis } => {
                if speed == 0 { return Duration::MAX }
                let ms = base_millis / speed as f64;
                if ms.is_finite() && ms > 0.0 { Duration::from_nanos( (ms * 1.0e6).round() as u64) } else { Duration::ZERO }
            }
            SpeedMapping::Fixed(period) => *period
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_linear() {
        let m = SpeedMapping::default();
        assert_eq!( m.period_for(130), millis(80));
        assert_eq!( m.period_for(200), millis(10));
        assert_eq!( m.period_for(300), Duration::ZERO);

        let m = SpeedMapping::InvertedLinear { offset: 100 };
        assert_eq!( m.period_for(60), millis(40));
    }

    #[test]
    fn test_reciprocal() {
        let m = SpeedMapping::Reciprocal { base_millis: 1000.0 };
        assert_eq!( m.period_for(10), millis(100));
        assert_eq!( m.period_for(0), Duration::MAX);
    }

    #[test]
    fn test_fixed() {
        let m = SpeedMapping::Fixed( DEFAULT_FIXED_PERIOD);
        assert_eq!( m.period_for(1), millis(50));
        assert_eq!( m.period_for(99), millis(50));
    }
}
