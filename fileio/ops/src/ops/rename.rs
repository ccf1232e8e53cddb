use fileio_core::FileIoResult;
use tracing::instrument;

use crate::{FileIo, check};

impl FileIo {
    #[instrument(level = "debug", skip_all, fields(%src, %dest))]
    pub fn rename(&self, src: &str, dest: &str) -> FileIoResult<()> {
        let src = self.resolve(src)?;
        let dest = self.resolve(dest)?;
        check(
            "rename",
            self.backend.rename(&src.real_path, &dest.real_path),
        )
    }

    /// Create `link` pointing at `target`. The target is stored verbatim.
    #[instrument(level = "debug", skip_all, fields(%target, %link))]
    pub fn symlink(&self, target: &str, link: &str) -> FileIoResult<()> {
        let link = self.resolve(link)?;
        check("symlink", self.backend.symlink(target, &link.real_path))
    }
}
