//! Hand-offs to the host environment: file browser, patch editor and MIDI device

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{FileAccessError, HandoffError};

/// Shows a file in the host's file browser.
pub trait FileRevealer {
    /// Opens a browser window on the folder holding `path`, with the file
    /// selected where the platform supports it.
    fn reveal(&self, path: &Path) -> Result<(), HandoffError>;
}

/// Uses the platform's file manager: Finder, Explorer or the desktop's
/// default folder handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFileBrowser;

impl SystemFileBrowser {
    /// Program and arguments revealing `path`.
    ///
    /// Finder and Explorer select the file itself. `xdg-open` has no
    /// selection, so it is given the containing folder.
    pub fn command(path: &Path) -> (&'static str, Vec<OsString>) {
        if cfg!(target_os = "windows") {
            let mut select = OsString::from("/select,");
            select.push(path.as_os_str());
            ("explorer", vec![select])
        } else if cfg!(target_os = "macos") {
            ("open", vec![OsString::from("-R"), path.as_os_str().to_owned()])
        } else {
            let folder = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            ("xdg-open", vec![folder.as_os_str().to_owned()])
        }
    }
}

impl FileRevealer for SystemFileBrowser {
    fn reveal(&self, path: &Path) -> Result<(), HandoffError> {
        let (program, args) = Self::command(path);
        log::info!("revealing {} with {} {:?}", path.display(), program, args);

        let status = Command::new(program)
            .args(&args)
            .status()
            .map_err(|source| HandoffError::Spawn {
                program: program.to_string(),
                source,
            })?;

        // explorer reports failure even when it opened the window
        if !status.success() && !cfg!(target_os = "windows") {
            return Err(HandoffError::Status {
                program: program.to_string(),
                status,
            });
        }
        Ok(())
    }
}

/// External patch editor which accepts a bank and a preselected voice,
/// e.g. Dexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchEditor {
    /// Editor program to launch
    pub executable: PathBuf,
}

impl PatchEditor {
    /// Editor launched through `executable`.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Command line arguments selecting voice `patch_number` (1-based) of
    /// `path`. The editor takes the zero-based index as two hex digits.
    pub fn args(path: &Path, patch_number: usize) -> Result<Vec<String>, HandoffError> {
        if patch_number == 0 {
            return Err(HandoffError::PatchOutOfRange(patch_number));
        }
        Ok(vec![
            path.display().to_string(),
            format!("-p{:02X}", patch_number - 1),
        ])
    }

    /// Launches the editor without waiting for it to exit.
    pub fn open(&self, path: &Path, patch_number: usize) -> Result<(), HandoffError> {
        let args = Self::args(path, patch_number)?;
        log::info!(
            "opening {} patch {} in {}",
            path.display(),
            patch_number,
            self.executable.display()
        );

        Command::new(&self.executable)
            .args(&args)
            .spawn()
            .map_err(|source| HandoffError::Spawn {
                program: self.executable.display().to_string(),
                source,
            })?;
        Ok(())
    }
}

/// The unmodified bytes of a bulk dump, ready to be sent to a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysexRequest {
    /// File the bytes were read from
    pub path: PathBuf,
    /// Voice the receiver should select, starting at 1
    pub patch_number: Option<usize>,
    /// Whole file contents, `0xF0` and `0xF7` included
    pub data: Vec<u8>,
}

impl SysexRequest {
    /// Reads `path` unmodified. Patch number 0 is rejected.
    pub fn load(path: &Path, patch_number: Option<usize>) -> Result<Self, HandoffError> {
        if patch_number == Some(0) {
            return Err(HandoffError::PatchOutOfRange(0));
        }
        let data = fs::read(path).map_err(|e| FileAccessError::new(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            patch_number,
            data,
        })
    }
}

/// Receives SYSEX dumps. Framing and patch selection are up to the
/// implementation.
pub trait SysexTransmitter {
    /// Sends one dump.
    fn transmit(&mut self, request: &SysexRequest) -> Result<(), HandoffError>;
}

/// Writes dumps verbatim, e.g. to a raw MIDI device node.
#[derive(Debug)]
pub struct WriterTransmitter<W: Write> {
    writer: W,
}

impl<W: Write> WriterTransmitter<W> {
    /// Transmitter writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SysexTransmitter for WriterTransmitter<W> {
    fn transmit(&mut self, request: &SysexRequest) -> Result<(), HandoffError> {
        if let Some(number) = request.patch_number {
            log::debug!("raw transmission ignores patch selection ({})", number);
        }
        self.writer
            .write_all(&request.data)
            .and_then(|_| self.writer.flush())
            .map_err(HandoffError::Transmit)?;
        log::info!(
            "sent {} bytes from {}",
            request.data.len(),
            request.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    fn test_reveal_opens_containing_folder() {
        let (program, args) = SystemFileBrowser::command(Path::new("/carts/rom/bank.syx"));
        assert_eq!(program, "xdg-open");
        assert_eq!(args, vec![OsString::from("/carts/rom")]);

        let (_, args) = SystemFileBrowser::command(Path::new("bank.syx"));
        assert_eq!(args, vec![OsString::from(".")]);
    }

    #[test]
    #[cfg(target_os = "macos")]
    fn test_reveal_selects_in_finder() {
        let (program, args) = SystemFileBrowser::command(Path::new("/carts/rom/bank.syx"));
        assert_eq!(program, "open");
        assert_eq!(
            args,
            vec![OsString::from("-R"), OsString::from("/carts/rom/bank.syx")]
        );
    }

    #[test]
    #[cfg(target_os = "windows")]
    fn test_reveal_selects_in_explorer() {
        let (program, args) = SystemFileBrowser::command(Path::new(r"C:\carts\bank.syx"));
        assert_eq!(program, "explorer");
        assert_eq!(args, vec![OsString::from(r"/select,C:\carts\bank.syx")]);
    }

    #[test]
    fn test_editor_args() {
        let path = Path::new("/carts/rom1a.syx");
        assert_eq!(
            PatchEditor::args(path, 1).unwrap(),
            vec!["/carts/rom1a.syx".to_string(), "-p00".to_string()]
        );
        assert_eq!(PatchEditor::args(path, 32).unwrap()[1], "-p1F");
        assert_eq!(PatchEditor::args(path, 256).unwrap()[1], "-pFF");
        assert!(matches!(
            PatchEditor::args(path, 0),
            Err(HandoffError::PatchOutOfRange(0))
        ));
    }

    #[test]
    fn test_missing_editor() {
        let temp_dir = TempDir::new().unwrap();
        let editor = PatchEditor::new(temp_dir.path().join("no-such-editor"));
        let result = editor.open(Path::new("bank.syx"), 1);
        assert!(matches!(result, Err(HandoffError::Spawn { .. })));
    }

    #[test]
    fn test_writer_transmits_unmodified_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bank.syx");
        let data: Vec<u8> = (0..=255u8).cycle().take(4104).collect();
        fs::write(&path, &data).unwrap();

        let request = SysexRequest::load(&path, Some(3)).unwrap();
        let mut transmitter = WriterTransmitter::new(Vec::new());
        transmitter.transmit(&request).unwrap();

        assert_eq!(transmitter.into_inner(), data);
    }

    #[test]
    fn test_request_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gone.syx");

        assert!(matches!(
            SysexRequest::load(&path, None),
            Err(HandoffError::File(_))
        ));
        assert!(matches!(
            SysexRequest::load(&path, Some(0)),
            Err(HandoffError::PatchOutOfRange(0))
        ));
    }
}
