use std::fs::{self, Permissions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Result};
use encoding_rs::{Encoding, UTF_8};
use tempfile::NamedTempFile;

use crate::error::ProcessError;

/// Parse sizes such as `10MiB`, `5MB`, `512k` or a plain byte count.
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();
    let units = [
        ("gib", 1024u64.pow(3)),
        ("mib", 1024u64.pow(2)),
        ("kib", 1024),
        ("gb", 1000u64.pow(3)),
        ("mb", 1000u64.pow(2)),
        ("kb", 1000),
        ("g", 1000u64.pow(3)),
        ("m", 1000u64.pow(2)),
        ("k", 1000),
        ("b", 1),
    ];

    for (unit, mult) in units {
        if let Some(num) = s.strip_suffix(unit) {
            if let Ok(val) = num.trim().parse::<f64>() {
                if val >= 0.0 {
                    return Ok((val * mult as f64) as u64);
                }
            }
            bail!("invalid size: {s}");
        }
    }
    match s.parse() {
        Ok(n) => Ok(n),
        Err(_) => bail!("invalid size: {s}"),
    }
}

/// Decode bytes as UTF-8 without replacement. A UTF-8 BOM stays part of the
/// text so a rewrite keeps it; any other BOM means the file is not UTF-8.
pub fn decode_utf8_strict(bytes: &[u8]) -> Result<&str, ProcessError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        if encoding != UTF_8 {
            return Err(ProcessError::UnsupportedEncoding(encoding.name()));
        }
    }
    std::str::from_utf8(bytes).map_err(|_| ProcessError::InvalidUtf8)
}

/// Temp files that exist right now and have not been renamed yet.
///
/// `process::exit` skips destructors, so a forced exit calls
/// [`InFlight::discard_all`] first to leave no temp file behind.
#[derive(Debug)]
pub struct InFlight {
    paths: Mutex<Vec<PathBuf>>,
}

impl InFlight {
    pub const fn new() -> Self {
        Self {
            paths: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        self.paths.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn insert(&self, path: PathBuf) {
        self.lock().push(path);
    }

    fn remove(&self, path: &Path) {
        self.lock().retain(|p| p != path);
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().clone()
    }

    /// Delete every tracked temp file. Returns how many were removed.
    pub fn discard_all(&self) -> usize {
        let mut paths = self.lock();
        let mut removed = 0;
        for path in paths.drain(..) {
            if fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        removed
    }
}

impl Default for InFlight {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry used by [`PendingReplace::new`].
pub static IN_FLIGHT: InFlight = InFlight::new();

/// Drops the registry entry once the temp file is renamed or deleted.
struct Tracked {
    registry: &'static InFlight,
    path: PathBuf,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.registry.remove(&self.path);
    }
}

/// In-progress replacement of a file: writes go to a temp file in the target's
/// directory and only [`PendingReplace::commit`] renames it over the target.
/// Dropping it uncommitted deletes the temp file and leaves the target as is.
pub struct PendingReplace {
    target: PathBuf,
    permissions: Permissions,
    out: BufWriter<NamedTempFile>,
    tracked: Tracked,
}

impl PendingReplace {
    pub fn new(target: &Path) -> io::Result<Self> {
        Self::tracked_by(target, &IN_FLIGHT)
    }

    pub fn tracked_by(target: &Path, registry: &'static InFlight) -> io::Result<Self> {
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let permissions = fs::metadata(target)?.permissions();
        let tmp = NamedTempFile::new_in(dir)?;
        let path = tmp.path().to_path_buf();
        registry.insert(path.clone());
        Ok(Self {
            target: target.to_path_buf(),
            permissions,
            out: BufWriter::new(tmp),
            tracked: Tracked { registry, path },
        })
    }

    pub fn temp_path(&self) -> &Path {
        &self.tracked.path
    }

    pub fn commit(self) -> io::Result<()> {
        let Self {
            target,
            permissions,
            out,
            tracked,
        } = self;
        let tmp = out.into_inner().map_err(|e| e.into_error())?;
        tmp.as_file().sync_all()?;
        fs::set_permissions(tmp.path(), permissions)?;
        tmp.persist(&target).map_err(|e| e.error)?;
        drop(tracked);
        Ok(())
    }
}

impl Write for PendingReplace {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Replace `target` with whatever `write_body` produces; `target` ends up
/// either fully old or fully new.
pub fn atomic_replace<F>(target: &Path, write_body: F) -> io::Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let mut pending = PendingReplace::new(target)?;
    write_body(&mut pending)?;
    pending.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_size_units() {
        assert_eq!(parse_size("10MiB").unwrap(), 10 * 1024 * 1024);
        assert_eq!(parse_size("5MB").unwrap(), 5_000_000);
        assert_eq!(parse_size("512k").unwrap(), 512_000);
        assert_eq!(parse_size("2KiB").unwrap(), 2048);
        assert_eq!(parse_size(" 1024 ").unwrap(), 1024);
        assert_eq!(parse_size("64b").unwrap(), 64);
        assert!(parse_size("lots").is_err());
        assert!(parse_size("mb").is_err());
    }

    #[test]
    fn strict_decode_rejects_non_utf8() {
        assert_eq!(decode_utf8_strict("héllo".as_bytes()).unwrap(), "héllo");
        assert!(matches!(
            decode_utf8_strict(&[0x80, 0x81, 0xff]),
            Err(ProcessError::InvalidUtf8)
        ));
        assert!(matches!(
            decode_utf8_strict(&[0xff, 0xfe, b'a', 0x00]),
            Err(ProcessError::UnsupportedEncoding(_))
        ));
        assert_eq!(
            decode_utf8_strict(b"\xef\xbb\xbfbom").unwrap(),
            "\u{feff}bom"
        );
    }

    #[test]
    fn atomic_replace_swaps_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "old").unwrap();

        atomic_replace(&path, |w| w.write_all(b"new")).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn failed_write_leaves_original_and_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "original 😀 bytes").unwrap();

        let err = atomic_replace(&path, |w| {
            w.write_all(b"partial")?;
            Err(io::Error::other("disk full"))
        })
        .unwrap_err();

        assert_eq!(err.to_string(), "disk full");
        assert_eq!(fs::read_to_string(&path).unwrap(), "original 😀 bytes");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn forced_exit_cleanup_deletes_in_flight_temp_file() {
        static REGISTRY: InFlight = InFlight::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        fs::write(&path, "line 😀\n").unwrap();

        let mut pending = PendingReplace::tracked_by(&path, &REGISTRY).unwrap();
        pending.write_all(b"line ").unwrap();
        pending.flush().unwrap();
        let tmp = pending.temp_path().to_path_buf();
        assert!(tmp.exists());
        assert_eq!(REGISTRY.paths(), vec![tmp.clone()]);

        assert_eq!(REGISTRY.discard_all(), 1);
        assert!(!tmp.exists());
        assert!(REGISTRY.paths().is_empty());

        drop(pending);
        assert_eq!(fs::read_to_string(&path).unwrap(), "line 😀\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn finished_replaces_leave_the_registry() {
        static REGISTRY: InFlight = InFlight::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "old").unwrap();

        let mut committed = PendingReplace::tracked_by(&path, &REGISTRY).unwrap();
        committed.write_all(b"new").unwrap();
        committed.commit().unwrap();
        assert!(REGISTRY.paths().is_empty());

        let abandoned = PendingReplace::tracked_by(&path, &REGISTRY).unwrap();
        assert_eq!(REGISTRY.paths().len(), 1);
        drop(abandoned);
        assert!(REGISTRY.paths().is_empty());
        assert_eq!(REGISTRY.discard_all(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn atomic_replace_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.sh");
        fs::write(&path, "echo 🚀").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        atomic_replace(&path, |w| w.write_all(b"echo ")).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
