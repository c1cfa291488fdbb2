//! Sensor fusion demo: a fast IMU and a slow GPS, arriving out of
//! order, emitted as one time-ordered sequence.
//!
//! ```bash
//! cargo run --example sensor_fusion
//! ```

use braid_core::{AlignerConfig, StreamAligner, StreamConfig, Time};

#[derive(Debug)]
struct ImuReading {
    gyro_z: f64,
}

#[derive(Debug)]
struct GpsFix {
    lat: f64,
    lon: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    // Skip a missing sample once it lags 25ms behind the newest data.
    let mut aligner =
        StreamAligner::new(AlignerConfig::default().with_timeout(Time::from_millis(25)));

    let imu = aligner.register_stream(
        |ts, reading: ImuReading| println!("{ts}  imu  gyro_z={:+.3}", reading.gyro_z),
        StreamConfig::default()
            .with_period(Time::from_millis(10))
            .with_buffer_capacity(32),
    );
    let gps = aligner.register_stream(
        |ts, fix: GpsFix| println!("{ts}  gps  {:.5},{:.5}", fix.lat, fix.lon),
        StreamConfig::default().with_period(Time::from_millis(40)),
    );

    // The GPS fix for t=40ms arrives before the IMU catches up, and the
    // IMU sample for t=30ms arrives after it. Emission order is by
    // timestamp regardless.
    for t in 1..=2 {
        let ts = Time::from_millis(t * 10);
        aligner.push(imu, ts, ImuReading { gyro_z: 0.1 * t as f64 })?;
    }
    aligner.push(gps, Time::from_millis(40), GpsFix { lat: 48.13743, lon: 11.57549 })?;
    aligner.push(imu, Time::from_millis(30), ImuReading { gyro_z: 0.3 })?;
    aligner.push(imu, Time::from_millis(40), ImuReading { gyro_z: 0.4 })?;

    while aligner.step() {}

    // The GPS drops out; the IMU keeps producing. The fix expected at
    // 80ms first holds emission back (ordering beats freshness), and
    // once it lags 25ms behind the newest IMU sample the aligner marks
    // the GPS overdue and the queued IMU samples catch up.
    for t in 5..=12 {
        let ts = Time::from_millis(t * 10);
        aligner.push(imu, ts, ImuReading { gyro_z: -0.05 * t as f64 })?;
        while aligner.step() {}
    }

    println!();
    println!("gps overdue: {}", aligner.is_overdue(gps)?);
    println!("{aligner}");
    let stats = aligner.stats();
    println!(
        "in={} out={} stale_dropped={}",
        stats.samples_in, stats.samples_out, stats.stale_dropped
    );

    Ok(())
}
