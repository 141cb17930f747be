/*!
 * Integration tests for the read, translate and export workflow
 */

use std::sync::Arc;

use anyhow::Result;

use subtitle_translator::app_config::Config;
use subtitle_translator::app_controller::{Controller, FolderSummary};
use subtitle_translator::providers::mock::MockTranslator;
use subtitle_translator::subtitle::{self, SubtitleFormat};
use subtitle_translator::translation::ConcurrencySettings;

use crate::common;

fn config(target: &str) -> Config {
    common::init_test_logger();
    let mut config = Config::default();
    config.source_language = "en".to_string();
    config.target_language = target.to_string();
    config.concurrency = ConcurrencySettings::custom(2, 2, 0);
    config
}

#[tokio::test]
async fn test_run_withVttInputAndAssOutput_shouldConvertWhileTranslating() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "episode.vtt", common::SAMPLE_VTT)?;
    let out_dir = temp_dir.path().join("out");

    let mut cfg = config("de");
    cfg.output_format = Some(SubtitleFormat::Ass);
    let translator = MockTranslator::working();
    let controller = Controller::with_translator(cfg, Arc::new(translator.clone()))?;

    let output = controller.run(input, out_dir.clone(), false).await?.unwrap();

    assert_eq!(output, out_dir.join("episode_de.ass"));
    let written = std::fs::read_to_string(&output)?;
    let parsed = subtitle::parse(&written, "episode_de.ass", None)?;
    assert_eq!(parsed.entries.len(), 2);
    assert_eq!(parsed.entries[0].text, "[de] This is a test subtitle.");
    assert_eq!(parsed.entries[1].text, "[de] It contains\nmultiple entries.");
    assert_eq!(translator.request_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_run_withForce_shouldOverwriteExistingOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let existing = common::create_test_file(temp_dir.path(), "movie_fr.srt", "stale")?;

    let controller = Controller::with_translator(config("fr"), Arc::new(MockTranslator::working()))?;

    assert!(controller.run(input.clone(), temp_dir.path().to_path_buf(), false).await?.is_none());
    assert_eq!(std::fs::read_to_string(&existing)?, "stale");

    controller.run(input, temp_dir.path().to_path_buf(), true).await?;
    assert!(std::fs::read_to_string(&existing)?.contains("[fr] For testing purposes."));
    Ok(())
}

#[tokio::test]
async fn test_run_withFailingProvider_shouldKeepSourceText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;

    let controller = Controller::with_translator(config("fr"), Arc::new(MockTranslator::failing()))?;
    let output = controller.run(input, temp_dir.path().to_path_buf(), false).await?.unwrap();

    let written = std::fs::read_to_string(output)?;
    assert_eq!(written.trim_end(), common::SAMPLE_SRT.trim_end());
    Ok(())
}

#[tokio::test]
async fn test_run_withFailedProbe_shouldNotWriteOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;

    let translator = MockTranslator::working().with_validation_result(false);
    let controller = Controller::with_translator(config("fr"), Arc::new(translator.clone()))?;

    assert!(controller.run(input, temp_dir.path().to_path_buf(), false).await.is_err());
    assert!(!temp_dir.path().join("movie_fr.srt").exists());
    assert_eq!(translator.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_runFolder_shouldContinuePastBrokenFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_subtitle(temp_dir.path(), "a.srt")?;
    common::create_test_file(temp_dir.path(), "b.ass", common::SAMPLE_ASS)?;
    common::create_test_file(temp_dir.path(), "broken.vtt", "no header here")?;
    common::create_test_file(temp_dir.path(), "readme.txt", "ignored")?;
    std::fs::create_dir(temp_dir.path().join("season2"))?;
    common::create_test_file(&temp_dir.path().join("season2"), "c.vtt", common::SAMPLE_VTT)?;

    let controller = Controller::with_translator(config("es"), Arc::new(MockTranslator::working()))?;

    let summary = controller.run_folder(temp_dir.path().to_path_buf(), false).await?;
    assert_eq!(
        summary,
        FolderSummary {
            translated: 3,
            skipped: 0,
            failed: 1
        }
    );
    assert!(temp_dir.path().join("season2/c_es.vtt").exists());

    // Outputs of the first pass are neither re-translated nor counted
    let summary = controller.run_folder(temp_dir.path().to_path_buf(), false).await?;
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.translated, 0);
    Ok(())
}

#[test]
fn test_convert_shouldWriteTargetFormatWithoutTranslating() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "styled.ass", common::SAMPLE_ASS)?;

    let output = Controller::convert(&input, SubtitleFormat::Srt, temp_dir.path())?;

    assert_eq!(output, temp_dir.path().join("styled.srt"));
    let converted = subtitle::parse(&std::fs::read_to_string(&output)?, "styled.srt", None)?;
    assert_eq!(converted.entries.len(), 2);
    assert_eq!(converted.entries[1].text, "It contains\nmultiple entries, really.");

    // Same format in the same directory does not clobber the source
    let same = Controller::convert(&input, SubtitleFormat::Ass, temp_dir.path())?;
    assert_eq!(same, temp_dir.path().join("styled_converted.ass"));
    Ok(())
}
