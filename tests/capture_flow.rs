//! End-to-end orchestrator runs against the mock driver.

mod common;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Timelike};
use common::{test_config, Behavior, MockDriver};
use intruder_cam::annotate::{AnnotateError, Annotator, Metadata, OverlayAnnotator};
use intruder_cam::camera::Backend;
use intruder_cam::orchestrator::{AnnotationStatus, CaptureOrchestrator};

fn files_with_ext(dir: &Path, ext: &str) -> Vec<PathBuf> {
    let mut out: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .collect();
    out.sort();
    out
}

/// The single day directory under the capture root.
fn only_day_dir(root: &Path) -> PathBuf {
    let dirs: Vec<_> = fs::read_dir(root)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(dirs.len(), 1, "expected one day directory, got {dirs:?}");
    dirs.into_iter().next().unwrap()
}

struct FailingAnnotator;

impl Annotator for FailingAnnotator {
    fn annotate(
        &self,
        image: &Path,
        _metadata: &Metadata,
        _captured_at: &DateTime<Local>,
    ) -> Result<(), AnnotateError> {
        Err(AnnotateError::Sidecar {
            path: image.with_extension("json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

struct PanickingAnnotator;

impl Annotator for PanickingAnnotator {
    fn annotate(
        &self,
        _image: &Path,
        _metadata: &Metadata,
        _captured_at: &DateTime<Local>,
    ) -> Result<(), AnnotateError> {
        panic!("overlay blew up");
    }
}

#[test]
fn test_annotated_capture_writes_image_and_sidecar() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let driver = MockDriver::new().with(0, Behavior::Working {
        width: 160,
        height: 120,
    });
    let annotator = OverlayAnnotator::new(config.storage.image_quality);
    let orchestrator =
        CaptureOrchestrator::new(&config, &driver, &annotator).with_backend(Backend::Auto);

    let mut metadata = Metadata::new();
    metadata.insert("source", "security_system");
    metadata.insert("reason", "login_attempt");
    let record = orchestrator.capture_intruder_image(Some(&metadata));

    assert!(record.success);
    assert_eq!(record.device_index, Some(0));
    assert_eq!(record.annotation, AnnotationStatus::Annotated);
    assert_eq!(driver.releases(), vec![0]);

    let day = only_day_dir(&config.storage.capture_dir);
    let name = day.file_name().unwrap().to_str().unwrap();
    assert!(chrono::NaiveDate::parse_from_str(name, "%Y-%m-%d").is_ok());

    let jpgs = files_with_ext(&day, "jpg");
    let jsons = files_with_ext(&day, "json");
    assert_eq!(jpgs.len(), 1);
    assert_eq!(jsons.len(), 1);
    assert_eq!(record.path.as_deref(), Some(jpgs[0].as_path()));
    assert_eq!(jpgs[0].file_stem(), jsons[0].file_stem());

    let stem = jpgs[0].file_stem().unwrap().to_str().unwrap();
    let stamp = stem.strip_prefix("intruder_").unwrap();
    assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M%S").is_ok());

    let image = image::open(&jpgs[0]).unwrap();
    assert_eq!((image.width(), image.height()), (160, 120));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&jsons[0]).unwrap()).unwrap();
    assert_eq!(json["source"], "security_system");
    assert_eq!(json["reason"], "login_attempt");
    let ts = json["timestamp"].as_str().unwrap();
    assert!(chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").is_ok());
}

#[test]
fn test_capture_without_metadata_writes_only_image() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let driver = MockDriver::new().with(0, Behavior::Working {
        width: 64,
        height: 48,
    });
    let annotator = OverlayAnnotator::new(85);
    let orchestrator = CaptureOrchestrator::new(&config, &driver, &annotator);

    let record = orchestrator.capture_intruder_image(None);
    assert!(record.success);
    assert_eq!(record.annotation, AnnotationStatus::NotRequested);

    let day = only_day_dir(&config.storage.capture_dir);
    assert_eq!(files_with_ext(&day, "jpg").len(), 1);
    assert!(files_with_ext(&day, "json").is_empty());

    // empty metadata is treated like none
    let record = orchestrator.capture_intruder_image(Some(&Metadata::new()));
    assert_eq!(record.annotation, AnnotationStatus::NotRequested);
}

#[test]
fn test_annotation_failure_keeps_raw_capture() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let driver = MockDriver::new().with(0, Behavior::Working {
        width: 64,
        height: 48,
    });
    let orchestrator = CaptureOrchestrator::new(&config, &driver, &FailingAnnotator);

    let metadata: Metadata = [("source", "security_system")].into_iter().collect();
    let record = orchestrator.capture_intruder_image(Some(&metadata));

    assert!(record.success);
    assert_eq!(record.annotation, AnnotationStatus::RawOnly);
    let path = record.path.unwrap();
    assert!(path.is_file());
    assert!(!path.with_extension("json").exists());
}

#[test]
fn test_annotator_panic_keeps_raw_capture() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let driver = MockDriver::new().with(0, Behavior::Working {
        width: 64,
        height: 48,
    });
    let orchestrator = CaptureOrchestrator::new(&config, &driver, &PanickingAnnotator);

    let metadata: Metadata = [("source", "security_system")].into_iter().collect();
    let record = orchestrator.capture_intruder_image(Some(&metadata));

    assert!(record.success);
    assert_eq!(record.annotation, AnnotationStatus::RawOnly);
    assert_eq!(record.device_index, Some(0));
    assert!(record.path.unwrap().is_file());
    assert_eq!(driver.releases(), vec![0]);
}

#[test]
fn test_file_name_is_stamped_after_warmup() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = test_config(tmp.path());
    config.camera.warmup_time = 1.2;
    let driver = MockDriver::new().with(0, Behavior::Working {
        width: 8,
        height: 8,
    });
    let annotator = OverlayAnnotator::new(85);
    let orchestrator = CaptureOrchestrator::new(&config, &driver, &annotator);

    let started = Local::now().naive_local().with_nanosecond(0).unwrap();
    let metadata: Metadata = [("source", "security_system")].into_iter().collect();
    let record = orchestrator.capture_intruder_image(Some(&metadata));
    assert!(record.success);

    let path = record.path.unwrap();
    let stem = path.file_stem().unwrap().to_str().unwrap();
    let stamp = chrono::NaiveDateTime::parse_from_str(
        stem.strip_prefix("intruder_").unwrap(),
        "%Y%m%d_%H%M%S",
    )
    .unwrap();
    assert!(stamp >= started + chrono::Duration::seconds(1));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(path.with_extension("json")).unwrap()).unwrap();
    assert_eq!(
        json["timestamp"].as_str().unwrap(),
        stamp.format("%Y-%m-%d %H:%M:%S").to_string()
    );
}

#[test]
fn test_no_camera_reports_sentinel() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let driver = MockDriver::new()
        .with(0, Behavior::NotReady)
        .with(2, Behavior::NotReady);
    let annotator = OverlayAnnotator::new(85);
    let orchestrator = CaptureOrchestrator::new(&config, &driver, &annotator);

    let record = orchestrator.capture_intruder_image(None);
    assert!(!record.success);
    assert!(record.path.is_none());
    assert_eq!(record.device_index, None);
    assert_eq!(record.index_or_sentinel(), -1);
    assert_eq!(driver.open_calls(), vec![0, 1, 2]);
    assert_eq!(driver.devices(), driver.releases());
}

#[test]
fn test_failed_read_reports_opened_index() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let driver = MockDriver::new()
        .with(0, Behavior::NotReady)
        .with(1, Behavior::ReadFails);
    let annotator = OverlayAnnotator::new(85);
    let orchestrator = CaptureOrchestrator::new(&config, &driver, &annotator);

    let record = orchestrator.capture_intruder_image(None);
    assert!(!record.success);
    assert_eq!(record.device_index, Some(1));
    assert_eq!(driver.releases(), vec![0, 1]);

    let day = only_day_dir(&config.storage.capture_dir);
    assert!(files_with_ext(&day, "jpg").is_empty());
}

#[test]
fn test_empty_frame_reports_opened_index() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let driver = MockDriver::new().with(0, Behavior::EmptyFrame);
    let annotator = OverlayAnnotator::new(85);
    let orchestrator = CaptureOrchestrator::new(&config, &driver, &annotator);

    let record = orchestrator.capture_intruder_image(None);
    assert!(!record.success);
    assert_eq!(record.index_or_sentinel(), 0);
    assert_eq!(driver.releases(), vec![0]);
}

#[test]
fn test_driver_panic_is_contained_and_camera_released() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let driver = MockDriver::new().with(0, Behavior::PanicOnRead);
    let annotator = OverlayAnnotator::new(85);
    let orchestrator = CaptureOrchestrator::new(&config, &driver, &annotator);

    let record = orchestrator.capture_intruder_image(None);
    assert!(!record.success);
    assert_eq!(record.index_or_sentinel(), -1);
    assert_eq!(driver.releases(), vec![0]);
}

#[test]
fn test_unwritable_store_is_a_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = test_config(tmp.path());
    // a regular file where the capture root should be
    let blocker = tmp.path().join("blocker");
    fs::write(&blocker, b"x").unwrap();
    config.storage.capture_dir = blocker;

    let driver = MockDriver::new().with(0, Behavior::Working {
        width: 8,
        height: 8,
    });
    let annotator = OverlayAnnotator::new(85);
    let orchestrator = CaptureOrchestrator::new(&config, &driver, &annotator);

    let record = orchestrator.capture_intruder_image(None);
    assert!(!record.success);
    assert_eq!(record.index_or_sentinel(), -1);
    // the store is resolved before any camera is touched
    assert!(driver.open_calls().is_empty());
}
