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

use thiserror::Error;
use crate::scheduler::Phase;

pub type Result<T> = std::result::Result<T, RouteAnimError>;

/// all errors are synchronous and leave the scheduler in its last valid phase
#[derive(Error,Debug)]
pub enum RouteAnimError {
    #[error("invalid input: {0}")]
    InvalidInput( String ),

    #[error("operation '{op}' not allowed in phase {phase:?}")]
    InvalidState { op: &'static str, phase: Phase },

    #[error("no async runtime to schedule animation ticks")]
    NoRuntime( #[from] tokio::runtime::TryCurrentError),

    #[error("poisoned lock: {0}")]
    PoisonedLock( String ),

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("config parse error {0}")]
    ConfigParseError( String ),

    #[error("serde error {0}")]
    SerdeError( #[from] serde_json::Error),
}

pub fn invalid_input (msg: impl ToString)->RouteAnimError {
    RouteAnimError::InvalidInput( msg.to_string())
}

pub fn invalid_state (op: &'static str, phase: Phase)->RouteAnimError {
    RouteAnimError::InvalidState { op, phase }
}

pub fn poisoned_lock (msg: impl ToString)->RouteAnimError {
    RouteAnimError::PoisonedLock( msg.to_string())
}

impl From<ron::error::SpannedError> for RouteAnimError {
    fn from (e: ron::error::SpannedError)->Self {
        RouteAnimError::ConfigParseError( e.to_string())
    }
}
