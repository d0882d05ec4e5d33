use std::ffi::OsString;

use framegrab_cli::{run_batch, run_single};

fn args(items: &[&str]) -> Vec<OsString> {
    items.iter().map(OsString::from).collect()
}

#[tokio::test]
async fn usage_errors_exit_with_code_one() {
    assert_eq!(run_batch(args(&["framegrab-batch"])).await, 1);
    assert_eq!(
        run_single(args(&["framegrab", "--torrent", "a.torrent"])).await,
        1
    );
    assert_eq!(run_single(args(&["framegrab", "--help"])).await, 1);
}
