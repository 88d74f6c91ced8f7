use dirs::data_dir;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// ~/.local/share/Spectra   (or platform-equivalent)
pub fn spectra_home() -> PathBuf {
    data_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("Spectra")
}

/// ~/.local/share/Spectra/datasets
pub fn datasets_dir() -> PathBuf {
    spectra_home().join("datasets")
}

/// ~/.local/share/Spectra/config.json
pub fn config_path() -> PathBuf {
    spectra_home().join("config.json")
}

/// <home>/<id>
pub fn repository_dir(home: &Path, id: &str) -> PathBuf {
    home.join(id)
}

/// <parent>/.<id>.lock, next to the repository so it survives its removal.
pub fn lock_path(repository: &Path) -> PathBuf {
    sibling(repository, "lock")
}

/// <parent>/.<id>.partial-<pid>
pub fn staging_dir(repository: &Path) -> PathBuf {
    sibling(repository, &format!("partial-{}", std::process::id()))
}

/// Staging directories of any process for this repository, crashed ones included.
pub fn staging_dirs(repository: &Path) -> Vec<PathBuf> {
    let prefix = sibling(repository, "partial-");
    let (Some(parent), Some(prefix)) = (prefix.parent(), prefix.file_name()) else {
        return Vec::new();
    };
    let prefix = prefix.to_string_lossy().into_owned();
    let Ok(entries) = fs::read_dir(parent) else {
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(&prefix))
        .map(|e| e.path())
        .collect()
}

/// True for a single normal path component: no separators, `..`, roots or prefixes.
pub fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn sibling(repository: &Path, suffix: &str) -> PathBuf {
    let name = repository
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "repository".to_string());
    let parent = repository.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!(".{name}.{suffix}"))
}
