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

use std::{path::PathBuf, sync::Mutex};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;
use uom::si::length::kilometer;

use routeanim_common::geo::GeoPoint;
use routeanim::{
    interpolate, load_config, read_waypoints, AnimationScheduler, AnimatorConfig, InterpolationPolicy, Phase
};

#[derive(Clone,Copy,Debug,ValueEnum)]
enum PolicyKind { Fixed, Distance }

#[derive(Parser, Debug)]
#[command(version, about, long_about = "animate a marker along a route given as JSON waypoint file")]
struct Args {
    /// RON animator config (defaults are used if not set)
    #[arg(short,long)]
    config: Option<PathBuf>,

    /// interpolation policy (overrides config)
    #[arg(short,long)]
    policy: Option<PolicyKind>,

    /// subdivisions per segment (fixed) or point spacing in meters (distance)
    #[arg(long)]
    param: Option<f64>,

    /// speed slider value, mapped to a tick period by the configured speed mapping
    #[arg(short,long)]
    speed: Option<u32>,

    /// JSON array of {"lon":..,"lat":..} waypoints. Uses a built-in route if not set
    waypoints: Option<PathBuf>,
}

fn demo_route ()->Vec<GeoPoint> {
    vec![
        GeoPoint::from_lon_lat_degrees( -122.4194, 37.7749),
        GeoPoint::from_lon_lat_degrees( -122.2711, 37.8044),
        GeoPoint::from_lon_lat_degrees( -122.0308, 37.9101),
    ]
}

fn policy_from_args (args: &Args, default_policy: InterpolationPolicy)->InterpolationPolicy {
    match (args.policy, args.param) {
        (Some(PolicyKind::Fixed), param) => InterpolationPolicy::fixed( param.map( |k| k as usize).unwrap_or(10)),
        (Some(PolicyKind::Distance), param) => InterpolationPolicy::by_meters( param.unwrap_or(100.0)),
        (None, _) => default_policy
    }
}

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())  // use RUST_LOG to set max level
        .init();

    let args = Args::parse();

    let config: AnimatorConfig = match &args.config {
        Some(path) => load_config( path)?,
        None => AnimatorConfig::default()
    };

    let waypoints = match &args.waypoints {
        Some(path) => read_waypoints( path)?,
        None => demo_route()
    };

    let policy = policy_from_args( &args, config.policy.clone());
    let path = interpolate( &waypoints, policy)?;
    println!("route: {} waypoints, {} interpolated points, {:.2} km",
             waypoints.len(), path.len(), path.haversine_length().get::<kilometer>());

    let period = match args.speed {
        Some(speed) => config.speed_mapping.period_for( speed),
        None => config.tick_period
    };

    let scheduler = AnimationScheduler::new( "animate_route", config);
    let (tx, rx) = oneshot::channel::<()>();
    let tx = Mutex::new( Some(tx));

    scheduler.on_tick( |e| {
        let follow = if e.follow { " (follow)" } else { "" };
        println!("{:3}% [{}] {}{}", e.progress_percent(), e.index, e.point, follow);
    });
    scheduler.on_phase_change( |phase| {
        let status = match phase {
            Phase::Idle => "ready",
            Phase::Running => "animating",
            Phase::Paused => "paused",
            Phase::Completed => "done"
        };
        println!("status: {status}");
    });
    scheduler.on_complete( move || {
        if let Some(tx) = tx.lock().ok().and_then( |mut tx| tx.take()) {
            let _ = tx.send(());
        }
    });

    scheduler.load( path)?;
    scheduler.start( period)?;

    rx.await?;
    println!("animated {} points", scheduler.position_index());

    Ok(())
}
