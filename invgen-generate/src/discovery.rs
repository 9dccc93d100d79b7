//! Template discovery and output-path mapping.
//!
//! A template is any file ending in `.tmpl`; its output is the same path
//! without that suffix (`deploy.yml.tmpl` → `deploy.yml`).

use std::path::{Path, PathBuf};

use crate::error::{io_err, GenerateError};

/// Template file extension, without the dot.
pub const TEMPLATE_EXTENSION: &str = "tmpl";

/// Where a run takes its templates from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Every `.tmpl` file directly inside the working directory.
    Discover,
    /// One explicit template; relative paths resolve against the working directory.
    File(PathBuf),
}

fn is_template(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some(TEMPLATE_EXTENSION)
}

/// Output path for `template`, or `None` if it is not a template.
pub fn output_path(template: &Path) -> Option<PathBuf> {
    is_template(template).then(|| template.with_extension(""))
}

/// All `.tmpl` files directly inside `dir`, sorted by file name.
pub fn discover_at(dir: &Path) -> Result<Vec<PathBuf>, GenerateError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    let mut templates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_file() && is_template(&path) {
            templates.push(path);
        }
    }
    templates.sort();
    Ok(templates)
}

/// Resolve `source` to a non-empty template list.
pub fn resolve(dir: &Path, source: &TemplateSource) -> Result<Vec<PathBuf>, GenerateError> {
    let templates = match source {
        TemplateSource::Discover => discover_at(dir)?,
        TemplateSource::File(file) => {
            let path = if file.is_absolute() { file.clone() } else { dir.join(file) };
            if !is_template(&path) {
                return Err(GenerateError::NotATemplate { path });
            }
            vec![path]
        }
    };
    if templates.is_empty() {
        return Err(GenerateError::NoTemplates {
            dir: dir.to_path_buf(),
        });
    }
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn output_path_strips_extension() {
        assert_eq!(
            output_path(Path::new("/w/deploy.yml.tmpl")),
            Some(PathBuf::from("/w/deploy.yml"))
        );
        assert_eq!(output_path(Path::new("/w/Makefile.tmpl")), Some(PathBuf::from("/w/Makefile")));
        assert_eq!(output_path(Path::new("/w/deploy.yml")), None);
    }

    #[test]
    fn discover_finds_sorted_templates_only() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.txt.tmpl"), "b").unwrap();
        fs::write(tmp.path().join("a.txt.tmpl"), "a").unwrap();
        fs::write(tmp.path().join("notes.txt"), "x").unwrap();
        fs::create_dir_all(tmp.path().join("dir.tmpl")).unwrap();
        fs::create_dir_all(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("nested").join("c.tmpl"), "c").unwrap();

        let found = discover_at(tmp.path()).unwrap();
        assert_eq!(
            found,
            vec![tmp.path().join("a.txt.tmpl"), tmp.path().join("b.txt.tmpl")]
        );
    }

    #[test]
    fn resolve_empty_dir_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = resolve(tmp.path(), &TemplateSource::Discover).unwrap_err();
        assert!(matches!(err, GenerateError::NoTemplates { .. }), "got: {err}");
    }

    #[test]
    fn resolve_explicit_file_is_relative_to_dir() {
        let tmp = TempDir::new().unwrap();
        let found = resolve(tmp.path(), &TemplateSource::File("only.conf.tmpl".into())).unwrap();
        assert_eq!(found, vec![tmp.path().join("only.conf.tmpl")]);

        let err = resolve(tmp.path(), &TemplateSource::File("only.conf".into())).unwrap_err();
        assert!(matches!(err, GenerateError::NotATemplate { .. }), "got: {err}");
    }
}
