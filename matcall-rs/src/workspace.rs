//! Temporary workspace lifecycle.
//!
//! Each call owns one directory holding the input exchange file, the output
//! exchange file and the generated shell script. The directory is removed
//! in its entirety when the [`Workspace`] guard drops, on every exit path.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// RAII guard over a call's temporary directory.
///
/// Dropping the guard removes the directory and everything in it. This is
/// what guarantees that neither exchange files nor the command script
/// outlive the call, whether it succeeded, the interpreter failed, or
/// decoding raised partway through.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    /// Acquire a workspace directory.
    ///
    /// With `custom` set, that directory is used (created if missing) and
    /// will be removed at the end of the call like a generated one — a
    /// caller-supplied path is borrowed for the call's lifetime, not
    /// preserved. With `None`, a fresh uniquely-named directory is created,
    /// which also gives concurrent calls automatic isolation.
    pub fn acquire(custom: Option<&Path>) -> Result<Self> {
        let dir = match custom {
            Some(path) => {
                fs::create_dir_all(path)?;
                path.to_path_buf()
            }
            None => tempfile::Builder::new()
                .prefix("matcall-")
                .tempdir()?
                .into_path(),
        };
        Ok(Workspace { dir })
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Path of the input exchange file.
    pub fn input_file(&self) -> PathBuf {
        self.dir.join("input_vars.mat")
    }

    /// Path of the output exchange file.
    pub fn output_file(&self) -> PathBuf {
        self.dir.join("output_vars.mat")
    }

    /// Path of the generated command script.
    pub fn script_file(&self) -> PathBuf {
        self.dir.join("commands.sh")
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_workspace_removed_on_drop() {
        let path = {
            let ws = Workspace::acquire(None).unwrap();
            assert!(ws.path().is_dir());
            ws.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_custom_workspace_created_and_removed() {
        let parent = tempfile::tempdir().unwrap();
        let custom = parent.path().join("call-scratch");
        assert!(!custom.exists());

        {
            let ws = Workspace::acquire(Some(&custom)).unwrap();
            std::fs::write(ws.script_file(), "#!/bin/bash\n").unwrap();
            assert!(custom.is_dir());
        }
        assert!(!custom.exists());
    }

    #[test]
    fn test_file_layout() {
        let ws = Workspace::acquire(None).unwrap();
        assert_eq!(ws.input_file().file_name().unwrap(), "input_vars.mat");
        assert_eq!(ws.output_file().file_name().unwrap(), "output_vars.mat");
        assert_eq!(ws.script_file().file_name().unwrap(), "commands.sh");
    }
}
