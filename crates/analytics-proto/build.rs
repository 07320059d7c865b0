// ABOUTME: Build script for generating Rust code from analytics.proto.
// ABOUTME: Uses tonic-build to compile protobuf definitions into Rust types.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Server stubs are generated too so tests can stand up an in-process server
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto-src/analytics.proto"], &["proto-src"])?;

    println!("cargo:rerun-if-changed=proto-src/analytics.proto");

    Ok(())
}
