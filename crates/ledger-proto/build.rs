//! Build script for the `ledger-proto` crate.
//!
//! ## Purpose
//! Generates Rust protobuf types and the tonic clients from `ledger.proto`.
//!
//! ## Intended use
//! This repository is a client of the ledger gateway, so only client stubs are
//! generated; the gateway itself is an external system.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let proto_file = std::path::Path::new(manifest_dir).join("ledger.proto");
    let proto_include_root = std::path::Path::new(manifest_dir);

    println!("cargo:rerun-if-changed={}", proto_file.display());

    // Supply a `protoc` binary for environments where one is not installed
    // system-wide. tonic-build/prost-build honor the `PROTOC` env var.
    if std::env::var_os("PROTOC").is_none() {
        if let Ok(protoc) = protoc_bin_vendored::protoc_bin_path() {
            std::env::set_var("PROTOC", protoc);
        }
    }

    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        .type_attribute(".", "#[derive(serde::Serialize, serde::Deserialize)]")
        .compile_protos(std::slice::from_ref(&proto_file), &[proto_include_root])?;

    Ok(())
}
