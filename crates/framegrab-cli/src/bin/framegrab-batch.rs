//! Batch entrypoint: fetch whole transfers until interrupted or a key is pressed.

use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let code = framegrab_cli::run_batch(std::env::args_os().collect()).await;
    if code != 0 {
        process::exit(code);
    }
}
