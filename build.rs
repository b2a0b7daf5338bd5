use std::env;

fn main() {
    // Set linking information for C libraries
    if cfg!(feature = "c-bindings") {
        println!("cargo:rustc-link-lib=c");
    }

    // Version string shared by the CLI and the C ABI
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=SPARSE_LAPJV_VERSION={version}");

    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-changed=Cargo.toml");
}
