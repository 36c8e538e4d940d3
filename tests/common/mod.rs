#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use layergen::config::GeneratorConfig;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Read a spec from `tests/fixtures/`.
pub fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

/// A temporary directory with `specs/<domain>/openapi.yaml` per entry.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new(specs: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        for (domain, yaml) in specs {
            let spec_dir = dir.path().join("specs").join(domain);
            fs::create_dir_all(&spec_dir).unwrap();
            fs::write(spec_dir.join("openapi.yaml"), yaml).unwrap();
        }
        Workspace { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn out(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    pub fn config(&self) -> GeneratorConfig {
        GeneratorConfig {
            specs_dir: self.dir.path().join("specs"),
            output_dir: self.out(),
            ..GeneratorConfig::default()
        }
    }

    /// Write a `layergen.toml` pointing at this workspace and return its path.
    pub fn write_config(&self, extra: &str) -> PathBuf {
        let path = self.dir.path().join("layergen.toml");
        let body = format!(
            "specs_dir = {:?}\noutput_dir = {:?}\n{extra}",
            self.dir.path().join("specs").display().to_string(),
            self.out().display().to_string(),
        );
        fs::write(&path, body).unwrap();
        path
    }
}

/// Every file below `root`, keyed by relative path.
pub fn read_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}
