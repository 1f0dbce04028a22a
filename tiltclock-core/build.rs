//! Build script for tiltclock-core
//!
//! - Records the UTC build time as the clock's fallback timestamp
//!
//! `SOURCE_DATE_EPOCH` overrides the wall clock for reproducible builds.

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Datelike, Timelike, Utc};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let now: DateTime<Utc> = match env::var("SOURCE_DATE_EPOCH") {
        Ok(value) => {
            let secs = value
                .trim()
                .parse::<i64>()
                .expect("SOURCE_DATE_EPOCH must be an integer");
            DateTime::<Utc>::from_timestamp(secs, 0).expect("SOURCE_DATE_EPOCH out of range")
        }
        Err(_) => Utc::now(),
    };

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("build_time.rs")).unwrap();
    writeln!(
        f,
        "/// UTC build time as (year, month, day, hour, minute, second)\n\
         pub const BUILD_TIME: (u16, u8, u8, u8, u8, u8) = ({}, {}, {}, {}, {}, {});",
        now.year(),
        now.month(),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
    .unwrap();
}
