use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::{Result, TrackError},
    models::FusedPoint,
};

use super::{export, ExportFormat, ExportPayload};

/// `<name>_<YYYYMMDD-HHMMSS>.<ext>`, with the name reduced to characters
/// that are safe in a file name.
pub fn file_name(session_name: &str, format: ExportFormat, exported_at: DateTime<Utc>) -> String {
    let mut stem: String = session_name
        .trim()
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    if stem.is_empty() {
        stem.push_str("session");
    }
    format!(
        "{stem}_{}.{}",
        exported_at.format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

/// Encodes and writes an export into `dir`, returning the final path.
///
/// Bytes go to a hidden temporary sibling, unique per call, and are renamed
/// into place only once fully written and synced. On failure the temporary
/// file is removed.
pub async fn write_export(
    dir: &Path,
    points: &[FusedPoint],
    format: ExportFormat,
    session_name: Option<&str>,
    exported_at: DateTime<Utc>,
) -> Result<PathBuf> {
    let bytes = export(points, format, session_name, exported_at)?;
    let name = ExportPayload::new(points, session_name, exported_at).session_name;
    let path = dir.join(file_name(&name, format, exported_at));

    let target = path.clone();
    tokio::task::spawn_blocking(move || write_atomically(&target, &bytes))
        .await
        .map_err(|err| TrackError::export(&path, io::Error::other(err)))??;

    Ok(path)
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| TrackError::export(path, err))?;
    }

    let tmp = tmp_path(path);
    let result = (|| -> io::Result<()> {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(err) = result {
        let _ = fs::remove_file(&tmp);
        return Err(TrackError::export(path, err));
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(format!(".{}.tmp", Uuid::new_v4()));
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawFix;
    use chrono::{Duration, TimeZone};

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("altitrack-writer-{}", Uuid::new_v4()))
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 3, 16, 45, 9).unwrap()
    }

    #[test]
    fn file_names_are_sanitised() {
        assert_eq!(
            file_name("Col du Galibier / 2", ExportFormat::Csv, at()),
            "Col_du_Galibier__2_20240803-164509.csv"
        );
        assert_eq!(
            file_name("???", ExportFormat::Json, at()),
            "session_20240803-164509.json"
        );
    }

    #[tokio::test]
    async fn writes_final_file_only() {
        let dir = scratch_dir();
        let points = [FusedPoint::from_fix(&RawFix::new(at(), 1.0, 2.0, 3.0, 4.0), None)];

        let path = write_export(&dir, &points, ExportFormat::Json, Some("hike"), at())
            .await
            .unwrap();

        assert_eq!(path, dir.join("hike_20240803-164509.json"));
        let written = fs::read(&path).unwrap();
        assert_eq!(
            written,
            export(&points, ExportFormat::Json, Some("hike"), at()).unwrap()
        );
        let entries: Vec<_> = fs::read_dir(&dir).unwrap().collect();
        assert_eq!(entries.len(), 1);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn failed_write_leaves_nothing_behind() {
        let dir = scratch_dir();
        // Occupy the target name with a directory so the final rename fails.
        let blocked = dir.join(file_name("hike", ExportFormat::Csv, at()));
        fs::create_dir_all(blocked.join("occupied")).unwrap();

        let err = write_export(&dir, &[], ExportFormat::Csv, Some("hike"), at())
            .await
            .unwrap_err();
        assert!(matches!(err, TrackError::Export { .. }));

        let entries: Vec<_> = fs::read_dir(&dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert!(blocked.is_dir());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn unusable_directory_is_an_export_error() {
        let dir = scratch_dir();
        fs::create_dir_all(&dir).unwrap();
        let file_in_the_way = dir.join("not-a-dir");
        fs::write(&file_in_the_way, b"x").unwrap();

        let err = write_export(&file_in_the_way, &[], ExportFormat::Json, None, at())
            .await
            .unwrap_err();
        assert!(matches!(err, TrackError::Export { .. }));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn temporary_names_are_unique_and_hidden() {
        let path = Path::new("/exports/hike_20240803-164509.csv");
        let a = tmp_path(path);
        let b = tmp_path(path);
        assert_ne!(a, b);
        assert_eq!(a.parent(), path.parent());
        let name = a.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".hike_20240803-164509.csv."));
        assert!(name.ends_with(".tmp"));
    }

    #[tokio::test]
    async fn concurrent_exports_with_the_same_name_both_finish() {
        let dir = scratch_dir();
        let long: Vec<FusedPoint> = (0..5_000)
            .map(|i| {
                let fix = RawFix::new(
                    at() + Duration::seconds(i),
                    46.0 + i as f64 * 1e-5,
                    7.0,
                    1000.0 + i as f64 * 0.1,
                    3.0,
                );
                FusedPoint::from_fix(&fix, None)
            })
            .collect();
        let short = [FusedPoint::from_fix(&RawFix::new(at(), 1.0, 2.0, 3.0, 4.0), None)];
        let long_bytes = export(&long, ExportFormat::Csv, Some("hike"), at()).unwrap();
        let short_bytes = export(&short, ExportFormat::Csv, Some("hike"), at()).unwrap();

        for _ in 0..10 {
            let (a, b) = tokio::join!(
                write_export(&dir, &long, ExportFormat::Csv, Some("hike"), at()),
                write_export(&dir, &short, ExportFormat::Csv, Some("hike"), at()),
            );
            let a = a.unwrap();
            let b = b.unwrap();
            assert_eq!(a, b);

            let written = fs::read(&a).unwrap();
            assert!(written == long_bytes || written == short_bytes);
            let entries: Vec<_> = fs::read_dir(&dir).unwrap().collect();
            assert_eq!(entries.len(), 1, "temporary files left behind");
        }

        fs::remove_dir_all(&dir).unwrap();
    }
}
