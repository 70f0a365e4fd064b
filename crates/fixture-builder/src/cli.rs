use clap::Parser;

/// Writes `identity_v8.onnx` (one Identity node, IR 8, opset 13) into the
/// current directory.
#[derive(Parser, Debug)]
#[command(name = "make-identity-fixture", version, about = "Identity ONNX fixture builder")]
pub struct Cli {
    /// Log filter (RUST_LOG syntax); logs go to stderr
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log: String,
}
