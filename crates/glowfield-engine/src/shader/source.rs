use std::path::{Path, PathBuf};
use std::thread::ScopedJoinHandle;

use super::error::ShaderError;

/// File name of the vertex stage inside a shader directory.
pub const VERTEX_FILE: &str = "vertex.glsl";

/// File name of the fragment stage inside a shader directory.
pub const FRAGMENT_FILE: &str = "fragment.glsl";

/// GLSL text of both program stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Reads [`VERTEX_FILE`] and [`FRAGMENT_FILE`] from `dir`.
    ///
    /// Both reads run concurrently and both must finish before this returns.
    /// When both fail, the vertex error is reported.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let dir = dir.as_ref();
        let vertex_path = dir.join(VERTEX_FILE);
        let fragment_path = dir.join(FRAGMENT_FILE);

        let (vertex, fragment) = std::thread::scope(|s| {
            let vertex = s.spawn(|| read_source(&vertex_path));
            let fragment = s.spawn(|| read_source(&fragment_path));
            (join(vertex), join(fragment))
        });

        Ok(Self {
            vertex: vertex?,
            fragment: fragment?,
        })
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    let text = std::fs::read_to_string(path).map_err(|source| ShaderError::Load {
        path: PathBuf::from(path),
        source,
    })?;
    log::debug!("read shader source {} ({} bytes)", path.display(), text.len());
    Ok(text)
}

fn join<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("glowfield-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_both_stages() {
        let dir = scratch_dir("both");
        std::fs::write(dir.join(VERTEX_FILE), "// vs").unwrap();
        std::fs::write(dir.join(FRAGMENT_FILE), "// fs").unwrap();

        let sources = ShaderSources::load(&dir).unwrap();
        assert_eq!(sources, ShaderSources::new("// vs", "// fs"));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_fragment_reports_its_path() {
        let dir = scratch_dir("missing");
        std::fs::write(dir.join(VERTEX_FILE), "// vs").unwrap();

        let err = ShaderSources::load(&dir).unwrap_err();
        match err {
            ShaderError::Load { path, .. } => assert!(path.ends_with(FRAGMENT_FILE)),
            other => panic!("unexpected error: {other}"),
        }

        std::fs::remove_dir_all(dir).unwrap();
    }
}
