//! Single-file entrypoint: fetch the target file, extract frames, exit.

use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let code = framegrab_cli::run_single(std::env::args_os().collect()).await;
    if code != 0 {
        process::exit(code);
    }
}
