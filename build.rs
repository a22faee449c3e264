use std::{env, fs, path::PathBuf};

fn main() {
    // 1) Handle memory.x for the RP2040 target only; host builds need no linker script.
    let target = env::var("TARGET").unwrap_or_default();
    if target.starts_with("thumbv6m") {
        let out_dir = PathBuf::from(env::var("OUT_DIR").expect("cargo sets OUT_DIR"));
        let memory_x = fs::read_to_string("memory.x").expect("Failed to read memory.x");
        fs::write(out_dir.join("memory.x"), memory_x).expect("Failed to write memory.x");
        println!("cargo:rustc-link-search={}", out_dir.display());
        println!("cargo:rerun-if-changed=memory.x");
    }

    // 2) Load optional env files (still supported for convenience)
    let _ = dotenvy::from_filename(".env");
    load_home_env(".nixie.env");

    // 3) Provide fallbacks so the firmware compiles without .env
    let utc_offset = env_or_default("UTC_OFFSET_MINUTES", "0");
    let time_fmt = env_or_default("TIME_FMT", "1");
    let clock_seed = env_or_default("CLOCK_SEED_UNIX_SECONDS", "0");

    if time_fmt != "0" && time_fmt != "1" {
        println!("cargo:warning=TIME_FMT must be 0 (12h) or 1 (24h); got {time_fmt:?}");
    }

    // 4) Expose as compile-time constants
    println!("cargo:rustc-env=UTC_OFFSET_MINUTES={utc_offset}");
    println!("cargo:rustc-env=TIME_FMT={time_fmt}");
    println!("cargo:rustc-env=CLOCK_SEED_UNIX_SECONDS={clock_seed}");

    println!("cargo:rerun-if-env-changed=UTC_OFFSET_MINUTES");
    println!("cargo:rerun-if-env-changed=TIME_FMT");
    println!("cargo:rerun-if-env-changed=CLOCK_SEED_UNIX_SECONDS");
    println!("cargo:rerun-if-changed=.env");
}

fn load_home_env(file: &str) {
    let home = match env::var_os("USERPROFILE").or_else(|| env::var_os("HOME")) {
        Some(path) => PathBuf::from(path),
        None => return,
    };
    let _ = dotenvy::from_path(home.join(file));
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
