use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    let secs = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        });
    let of_day = secs % 86_400;
    println!(
        "cargo:rustc-env=BMPSTEG_BUILD_TIME={:02}-{:02}-{:02}",
        of_day / 3_600,
        of_day % 3_600 / 60,
        of_day % 60
    );
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
}
