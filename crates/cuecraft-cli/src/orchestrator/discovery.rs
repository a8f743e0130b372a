//! Locating a scene's timeline source file.

use std::path::PathBuf;

use cuecraft_analysis::find_scene_files;
use tracing::debug;

/// Finds scene source files for a project.
///
/// Search order for a scene type `"<project>/<name>"`:
///
/// 1. `<project_dir>/scenes/<name>.tsx`
/// 2. `<project_dir>/scenes/<Title>Scene.tsx`
/// 3. `<project_dir>/scenes/<Pascal>Scene.tsx`
/// 4. any `<project_dir>/scenes/*.tsx` whose stem contains `name`, ignoring case
/// 5. `<root>/src/scenes/<project_id>/<name>.tsx` for each shared root
#[derive(Debug, Clone)]
pub struct SceneLocator {
    project_dir: PathBuf,
    shared_roots: Vec<PathBuf>,
}

impl SceneLocator {
    /// Shared roots default to the `remotion` checkout two levels up, one
    /// level up, and in the working directory.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let shared_roots = vec![
            project_dir.join("..").join("..").join("remotion"),
            project_dir.join("..").join("remotion"),
            PathBuf::from("remotion"),
        ];
        Self {
            project_dir,
            shared_roots,
        }
    }

    /// Appends extra shared roots, searched after the defaults.
    pub fn with_search_dirs(mut self, dirs: &[PathBuf]) -> Self {
        self.shared_roots.extend(dirs.iter().cloned());
        self
    }

    pub fn scenes_dir(&self) -> PathBuf {
        self.project_dir.join("scenes")
    }

    pub fn find(&self, scene_type: &str, project_id: &str) -> Option<PathBuf> {
        let name = scene_name(scene_type);
        if name.is_empty() {
            return None;
        }

        let scenes_dir = self.scenes_dir();
        if scenes_dir.is_dir() {
            let candidates = [
                format!("{}.tsx", name),
                format!("{}Scene.tsx", title_case(name)),
                format!("{}Scene.tsx", pascal_case(name)),
            ];
            if let Some(found) = candidates
                .iter()
                .map(|file| scenes_dir.join(file))
                .find(|path| path.is_file())
            {
                return Some(found);
            }

            let needle = name.to_lowercase();
            if let Some(found) = find_scene_files(&scenes_dir).into_iter().find(|path| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().to_lowercase().contains(&needle))
                    .unwrap_or(false)
            }) {
                return Some(found);
            }
        }

        for root in &self.shared_roots {
            let candidate = root
                .join("src")
                .join("scenes")
                .join(project_id)
                .join(format!("{}.tsx", name));
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        debug!(scene_type, project_dir = %self.project_dir.display(), "no scene file");
        None
    }
}

/// The last `/`-separated segment of a scene type.
pub fn scene_name(scene_type: &str) -> &str {
    scene_type.rsplit('/').next().unwrap_or(scene_type)
}

/// Uppercases each letter that follows a non-letter and lowercases the rest,
/// so `"hook-intro"` becomes `"Hook-Intro"`.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut after_letter = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if after_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(c);
            after_letter = false;
        }
    }
    out
}

/// `"key-value_cache"` -> `"KeyValueCache"`.
pub fn pascal_case(name: &str) -> String {
    name.replace('-', "_").split('_').map(title_case).collect()
}
