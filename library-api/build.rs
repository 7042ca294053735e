//! Build script for library-api crate.
//!
//! Compiles `proto/library.proto` into prost messages and the
//! `library.Library` server and client stubs.

use std::path::PathBuf;

use prost_build::Config;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=build.rs");

    let proto_path = PathBuf::from("./proto/library.proto");
    println!("cargo:rerun-if-changed={}", proto_path.display());

    let mut config = Config::default();
    config.protoc_executable(protoc_bin_vendored::protoc_bin_path()?);

    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .client_mod_attribute("library", r#"#[cfg(feature = "client")]"#)
        .server_mod_attribute("library", r#"#[cfg(feature = "server")]"#)
        .compile_with_config(
            config,
            &[proto_path],
            &[
                PathBuf::from("./proto"),
                protoc_bin_vendored::include_path()?,
            ],
        )?;

    Ok(())
}
