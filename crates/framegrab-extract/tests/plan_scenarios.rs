use std::path::{Path, PathBuf};

use framegrab_config::ExtractorSettings;
use framegrab_extract::{ExtractionPlan, PipelineOutcome, run_pipeline};
use framegrab_test_support::fixtures::MetainfoBuilder;
use framegrab_torrent_core::{FilePriority, JobMetadata, select_files};

fn job(target: &str, output_dir: &Path) -> JobMetadata {
    JobMetadata {
        target_file: target.to_string(),
        output_dir: output_dir.to_path_buf(),
    }
}

#[test]
fn single_file_scenario_selects_and_roots_path() {
    let meta = MetainfoBuilder::single_file("clip.mp4", 4096).metadata();
    assert_eq!(select_files(&meta.files, "clip.mp4"), vec![FilePriority::Fetch]);
    let plan = ExtractionPlan::for_transfer(
        &meta,
        &job("clip.mp4", Path::new("/out")),
        Path::new("/data/files"),
        &ExtractorSettings::default(),
    )
    .expect("plan");
    assert_eq!(plan.relative_path, "/clip.mp4");
    assert_eq!(plan.input_path(), PathBuf::from("/data/files/clip.mp4"));
}

#[test]
fn three_file_scenario_selects_middle_and_nests_path() {
    let meta = MetainfoBuilder::multi_file("Pack")
        .file("readme.txt", 10)
        .file("feature.mkv", 9000)
        .file("extras.mkv", 700)
        .metadata();
    let numeric: Vec<u8> = select_files(&meta.files, "feature.mkv")
        .into_iter()
        .map(FilePriority::as_u8)
        .collect();
    assert_eq!(numeric, vec![0, 1, 0]);
    let plan = ExtractionPlan::for_transfer(
        &meta,
        &job("feature.mkv", Path::new("/out")),
        Path::new("/data/files"),
        &ExtractorSettings::default(),
    )
    .expect("plan");
    assert_eq!(plan.relative_path, "Pack/feature.mkv");
}

#[cfg(unix)]
#[tokio::test]
async fn configured_program_receives_the_argument_vector() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let meta = MetainfoBuilder::single_file("clip.mp4", 4096).metadata();
    let settings = ExtractorSettings {
        program: "true".to_string(),
        ..ExtractorSettings::default()
    };
    let plan = ExtractionPlan::for_transfer(
        &meta,
        &job("clip.mp4", &temp.path().join("frames")),
        temp.path(),
        &settings,
    )
    .expect("plan");
    let outcome = run_pipeline(&plan).await?;
    assert!(matches!(outcome, PipelineOutcome::Finished { status } if status.success()));
    assert!(temp.path().join("frames").is_dir());
    Ok(())
}
