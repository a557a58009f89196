//! Plain-text comparison helpers shared by the orchestrator.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Token the installation prefix is rewritten to before comparing.
pub const INSTALL_PREFIX_PLACEHOLDER: &str = "${DFL_INSTALL_PREFIX}";

/// Neutralizes the simulator installation path embedded in `.dyd`/`.par`
/// files. The reference side may have been produced on another machine, so
/// each side has its own prefix; the reference prefix defaults to the
/// result prefix.
#[derive(Debug, Clone, Default)]
pub struct PathNormalizer {
    pub result_prefix: Option<String>,
    pub reference_prefix: Option<String>,
}

impl PathNormalizer {
    pub fn new(result_prefix: Option<String>, reference_prefix: Option<String>) -> Self {
        Self {
            result_prefix: result_prefix.filter(|p| !p.is_empty()),
            reference_prefix: reference_prefix.filter(|p| !p.is_empty()),
        }
    }

    pub fn normalize_result(&self, content: &[u8]) -> Vec<u8> {
        replace_prefix(content, self.result_prefix.as_deref())
    }

    pub fn normalize_reference(&self, content: &[u8]) -> Vec<u8> {
        replace_prefix(
            content,
            self.reference_prefix
                .as_deref()
                .or(self.result_prefix.as_deref()),
        )
    }

    /// Byte equality after normalizing both sides.
    pub fn files_match(&self, result: &Path, reference: &Path) -> Result<bool> {
        let (result_bytes, reference_bytes) = read_pair(result, reference)?;
        Ok(self.normalize_result(&result_bytes) == self.normalize_reference(&reference_bytes))
    }
}

fn replace_prefix(content: &[u8], prefix: Option<&str>) -> Vec<u8> {
    let Some(prefix) = prefix.map(str::as_bytes).filter(|p| !p.is_empty()) else {
        return content.to_vec();
    };
    let mut out = Vec::with_capacity(content.len());
    let mut rest = content;
    while let Some(at) = rest.windows(prefix.len()).position(|window| window == prefix) {
        out.extend_from_slice(&rest[..at]);
        out.extend_from_slice(INSTALL_PREFIX_PLACEHOLDER.as_bytes());
        rest = &rest[at + prefix.len()..];
    }
    out.extend_from_slice(rest);
    out
}

fn read_pair(result: &Path, reference: &Path) -> Result<(Vec<u8>, Vec<u8>)> {
    let result_bytes =
        fs::read(result).with_context(|| format!("reading result file '{}'", result.display()))?;
    let reference_bytes = fs::read(reference)
        .with_context(|| format!("reading reference file '{}'", reference.display()))?;
    Ok((result_bytes, reference_bytes))
}

/// Outcome of a line-for-line comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineComparison {
    Identical,
    /// First differing line (1-based), lossily decoded for display. `None`
    /// means that side ran out.
    Differs {
        line: usize,
        result: Option<String>,
        reference: Option<String>,
    },
}

impl LineComparison {
    pub fn is_identical(&self) -> bool {
        matches!(self, LineComparison::Identical)
    }
}

/// Lines split on `\n` with a trailing `\r` dropped; a final newline does
/// not start an extra line.
fn byte_lines(content: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = (!content.is_empty()).then(|| content.strip_suffix(b"\n").unwrap_or(content));
    body.into_iter()
        .flat_map(|body| body.split(|&byte| byte == b'\n'))
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

/// Compare two documents line by line, ignoring line endings and a trailing
/// newline. Lines are compared as bytes.
pub fn compare_lines(result: &[u8], reference: &[u8]) -> LineComparison {
    let display = |line: &[u8]| String::from_utf8_lossy(line).into_owned();
    let mut result_lines = byte_lines(result);
    let mut reference_lines = byte_lines(reference);
    let mut line = 0;
    loop {
        line += 1;
        match (result_lines.next(), reference_lines.next()) {
            (None, None) => return LineComparison::Identical,
            (Some(a), Some(b)) if a == b => continue,
            (a, b) => {
                return LineComparison::Differs {
                    line,
                    result: a.map(display),
                    reference: b.map(display),
                }
            }
        }
    }
}

pub fn compare_line_files(result: &Path, reference: &Path) -> Result<LineComparison> {
    let (result_bytes, reference_bytes) = read_pair(result, reference)?;
    Ok(compare_lines(&result_bytes, &reference_bytes))
}

/// Sorted names of the sub-directories of `dir`; empty when `dir` is absent.
pub fn list_subdirectories(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing '{}'", dir.display()))? {
        let entry = entry.with_context(|| format!("listing '{}'", dir.display()))?;
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Sorted files of `dir` (not recursive) whose extension is in `extensions`.
pub fn list_files_with_extensions(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing '{}'", dir.display()))? {
        let path = entry
            .with_context(|| format!("listing '{}'", dir.display()))?
            .path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| extensions.contains(&ext));
        if path.is_file() && matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn identical_modulo_line_endings() {
        assert!(compare_lines(b"a\nb\n", b"a\r\nb").is_identical());
        assert!(compare_lines(b"", b"").is_identical());
    }

    #[test]
    fn exhausted_side_is_a_mismatch() {
        assert_eq!(
            compare_lines(b"a\nb\nc\n", b"a\nb\n"),
            LineComparison::Differs {
                line: 3,
                result: Some("c".into()),
                reference: None,
            }
        );
        assert_eq!(
            compare_lines(b"a\n", b"a\nb\n"),
            LineComparison::Differs {
                line: 2,
                result: None,
                reference: Some("b".into()),
            }
        );
    }

    #[test]
    fn reports_first_differing_line() {
        let cmp = compare_lines(b"x\ny\nz", b"x\nY\nz");
        assert_eq!(
            cmp,
            LineComparison::Differs {
                line: 2,
                result: Some("y".into()),
                reference: Some("Y".into()),
            }
        );
    }

    #[test]
    fn install_prefix_is_neutralized_on_both_sides() {
        let normalizer = PathNormalizer::new(
            Some("/opt/dfl/run-42".into()),
            Some("/home/ref/dfl".into()),
        );
        let result = br#"<blackBoxModel lib="/opt/dfl/run-42/ddb/libLoad.so"/>"#;
        let reference = br#"<blackBoxModel lib="/home/ref/dfl/ddb/libLoad.so"/>"#;
        assert_eq!(
            normalizer.normalize_result(result),
            normalizer.normalize_reference(reference)
        );
    }

    #[test]
    fn reference_prefix_defaults_to_result_prefix() {
        let normalizer = PathNormalizer::new(Some("/opt/dfl".into()), None);
        assert_eq!(
            normalizer.normalize_reference(b"/opt/dfl/x"),
            format!("{INSTALL_PREFIX_PLACEHOLDER}/x").into_bytes()
        );
        let untouched = PathNormalizer::new(Some(String::new()), None);
        assert_eq!(untouched.normalize_result(b"/opt/dfl/x"), b"/opt/dfl/x");
    }

    #[test]
    fn files_match_reads_both_sides() {
        let dir = tempdir().unwrap();
        let result = dir.path().join("r.dyd");
        let reference = dir.path().join("ref.dyd");
        fs::write(&result, "<a path=\"/opt/dfl/x\"/>").unwrap();
        fs::write(&reference, "<a path=\"/ref/x\"/>").unwrap();
        let normalizer = PathNormalizer::new(Some("/opt/dfl".into()), Some("/ref".into()));
        assert!(normalizer.files_match(&result, &reference).unwrap());
        let plain = PathNormalizer::default();
        assert!(!plain.files_match(&result, &reference).unwrap());
    }

    #[test]
    fn non_utf8_files_compare_as_bytes() {
        let dir = tempdir().unwrap();
        let result = dir.path().join("r.par");
        let reference = dir.path().join("ref.par");
        let content = b"<set id=\"Poste_\xC9TANG\"/>\r\n<set id=\"/opt/dfl/x\"/>\n";
        fs::write(&result, content).unwrap();
        fs::write(&reference, content).unwrap();
        let normalizer = PathNormalizer::new(Some("/opt/dfl".into()), None);
        assert!(normalizer.files_match(&result, &reference).unwrap());
        assert!(compare_line_files(&result, &reference).unwrap().is_identical());

        fs::write(&reference, b"<set id=\"Poste_\xCATANG\"/>\n").unwrap();
        assert!(!normalizer.files_match(&result, &reference).unwrap());
        match compare_line_files(&result, &reference).unwrap() {
            LineComparison::Differs { line, .. } => assert_eq!(line, 1),
            LineComparison::Identical => panic!("different bytes compared equal"),
        }
    }

    #[test]
    fn listings_are_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("m-C.par"), "").unwrap();
        fs::write(dir.path().join("m-C.dyd"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        assert_eq!(list_subdirectories(dir.path()).unwrap(), vec!["a", "b"]);
        let files = list_files_with_extensions(dir.path(), &["dyd", "par"]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["m-C.dyd", "m-C.par"]);
        assert!(list_subdirectories(&dir.path().join("missing"))
            .unwrap()
            .is_empty());
    }
}
