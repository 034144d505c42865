// Version stamp for `yangwatchctl --version`.
//
// Packaging sets YANGWATCH_VERSION to tag builds (e.g. "0.4.0+lab3");
// plain builds report the crate version.

fn main() {
    println!("cargo:rerun-if-env-changed=YANGWATCH_VERSION");
    println!("cargo:rerun-if-changed=Cargo.toml");

    let version = match std::env::var("YANGWATCH_VERSION") {
        Ok(stamp) if !stamp.trim().is_empty() => stamp,
        _ => env!("CARGO_PKG_VERSION").to_string(),
    };
    println!("cargo:rustc-env=YANGWATCH_VERSION={}", version);
}
