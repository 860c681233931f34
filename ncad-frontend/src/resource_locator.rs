use std::env;
use std::path::{Path, PathBuf};

use ncad_config::AppConfig;
use tracing::{debug, trace};

/// 额外搜索目录的环境变量，按平台路径分隔符分隔。
pub const SOURCE_PATH_ENV: &str = "NCAD_SOURCE_PATH";

/// 解析命令文件路径：绝对路径直接使用，相对路径依次在搜索目录中查找。
#[derive(Debug, Clone)]
pub struct SourceLocator {
    search_roots: Vec<PathBuf>,
}

impl SourceLocator {
    pub fn from_config(base_dir: Option<&Path>, config: &AppConfig) -> Self {
        let mut roots: Vec<PathBuf> = Vec::new();

        if let Some(dir) = base_dir {
            roots.push(dir.to_path_buf());
        }

        roots.extend(
            config
                .resources
                .source_roots
                .iter()
                .filter(|path| path.is_dir())
                .cloned(),
        );

        if let Some(env_paths) = env::var_os(SOURCE_PATH_ENV) {
            roots.extend(env::split_paths(&env_paths).filter(|path| path.is_dir()));
        }

        // 去重，保持靠前优先级。
        let mut search_roots: Vec<PathBuf> = Vec::new();
        for root in roots {
            if !search_roots.contains(&root) {
                search_roots.push(root);
            }
        }

        Self { search_roots }
    }

    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    pub fn resolve(&self, path: &Path) -> Option<PathBuf> {
        if path.is_absolute() {
            if path.is_file() {
                return Some(path.to_path_buf());
            }
            debug!(path = %path.display(), "命令文件为绝对路径但不存在");
            return None;
        }

        self.search_roots.iter().find_map(|root| {
            let candidate = root.join(path);
            trace!(candidate = %candidate.display(), "source locator candidate");
            candidate.is_file().then_some(candidate)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn resolves_relative_paths_through_configured_roots() {
        let base = tempfile::tempdir().expect("base dir");
        let extra = tempfile::tempdir().expect("extra dir");
        fs::write(extra.path().join("plan.ncad"), "list\n").expect("write source");

        let mut config = AppConfig::default();
        config.resources.source_roots = vec![
            extra.path().to_path_buf(),
            PathBuf::from("/definitely/missing/root"),
        ];
        let locator = SourceLocator::from_config(Some(base.path()), &config);

        assert_eq!(locator.search_roots()[0], base.path());
        assert!(
            !locator
                .search_roots()
                .contains(&PathBuf::from("/definitely/missing/root"))
        );
        assert_eq!(
            locator.resolve(Path::new("plan.ncad")),
            Some(extra.path().join("plan.ncad"))
        );
        assert_eq!(locator.resolve(Path::new("other.ncad")), None);
    }

    #[test]
    fn absolute_paths_must_exist() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file = dir.path().join("abs.ncad");
        fs::write(&file, "").expect("write source");

        let locator = SourceLocator::from_config(None, &AppConfig::default());
        assert_eq!(locator.resolve(&file), Some(file.clone()));
        assert_eq!(locator.resolve(&dir.path().join("missing.ncad")), None);
    }
}
