//! Dry-run unified diff support for `invgen diff`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use similar::TextDiff;

use invgen_core::Config;
use invgen_renderer::EnvSource;

use crate::discovery::{self, TemplateSource};
use crate::error::GenerateError;
use crate::pipeline::render_templates;
use crate::writer::read_existing;

/// A single rendered file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Render what `generate` would write and compare it to the on-disk content.
///
/// No files are written. A missing destination diffs against empty text.
pub fn diff_at(
    config: &Config,
    dir: &Path,
    source: &TemplateSource,
    env: Arc<dyn EnvSource>,
) -> Result<Vec<FileDiff>, GenerateError> {
    let templates = discovery::resolve(dir, source)?;
    let rendered = render_templates(config, &templates, env)?;

    let mut diffs = Vec::new();
    for r in rendered {
        let existing = read_existing(&r.output)?.unwrap_or_default();
        if existing == r.content {
            continue;
        }

        let relative = r.output.strip_prefix(dir).unwrap_or(r.output.as_path());
        let old_header = format!("a/{}", relative.display());
        let new_header = format!("b/{}", relative.display());
        let unified = TextDiff::from_lines(&existing, &r.content)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        diffs.push(FileDiff {
            path: r.output,
            unified_diff: unified,
        });
    }
    Ok(diffs)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use invgen_renderer::MapEnv;
    use serde_json::json;
    use tempfile::TempDir;

    use crate::pipeline;

    use super::*;

    fn config() -> Config {
        let mut config = Config::default();
        config.inventory.insert("Replicas".into(), json!(3));
        config
    }

    fn env() -> Arc<dyn EnvSource> {
        Arc::new(MapEnv::new())
    }

    #[test]
    fn no_diffs_after_generate() {
        let dir = TempDir::new().expect("dir");
        fs::write(dir.path().join("deploy.yml.tmpl"), "replicas: {{ Replicas }}\n").unwrap();
        pipeline::run(&config(), dir.path(), &TemplateSource::Discover, false, env()).expect("run");

        let diffs = diff_at(&config(), dir.path(), &TemplateSource::Discover, env()).expect("diff");
        assert!(diffs.is_empty(), "generated output should have no diff");
    }

    #[test]
    fn local_edit_produces_unified_diff() {
        let dir = TempDir::new().expect("dir");
        fs::write(dir.path().join("deploy.yml.tmpl"), "replicas: {{ Replicas }}\n").unwrap();
        fs::write(dir.path().join("deploy.yml"), "replicas: 1\n").unwrap();

        let diffs = diff_at(&config(), dir.path(), &TemplateSource::Discover, env()).expect("diff");
        assert_eq!(diffs.len(), 1);
        let d = &diffs[0].unified_diff;
        assert!(d.contains("--- a/deploy.yml"), "got: {d}");
        assert!(d.contains("+++ b/deploy.yml"), "got: {d}");
        assert!(d.contains("-replicas: 1"), "got: {d}");
        assert!(d.contains("+replicas: 3"), "got: {d}");
        assert_eq!(fs::read_to_string(dir.path().join("deploy.yml")).unwrap(), "replicas: 1\n");
    }

    #[test]
    fn missing_output_diffs_against_empty() {
        let dir = TempDir::new().expect("dir");
        fs::write(dir.path().join("new.txt.tmpl"), "fresh\n").unwrap();
        let diffs = diff_at(&config(), dir.path(), &TemplateSource::Discover, env()).expect("diff");
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].unified_diff.contains("+fresh"));
        assert!(!dir.path().join("new.txt").exists());
    }
}
