//! Frame persistence
//!
//! [`DotFrameWriter`] is a step observer that writes one DOT file per step
//! (`0.dot`, `1.dot`, ...) into a frame directory. Observers cannot fail,
//! so the first I/O error is kept and reported by [`DotFrameWriter::finish`],
//! which also writes the animation manifest. Frames are ordered by their
//! numeric index, never lexically.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use labelflow_core::{Capacity, ExecutionHistory, HistoryError, StepEvent, StepObserver};

use crate::view::graph_view::GraphView;

/// File name of the manifest inside a frame directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Default animation speed, one step per second
pub const DEFAULT_FPS: u32 = 1;

/// Rendering and frame persistence errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("frame rate must be positive")]
    InvalidFrameRate,
}

impl RenderError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Ordered list of frames with the rate they should be played at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameManifest {
    pub fps: u32,
    /// Frame file names relative to the manifest, in playback order
    pub frames: Vec<String>,
}

impl FrameManifest {
    /// Collects `<index>.dot` files of a directory in numeric order
    pub fn scan(dir: impl AsRef<Path>, fps: u32) -> Result<Self, RenderError> {
        let dir = dir.as_ref();
        let mut indexed = Vec::new();

        for entry in fs::read_dir(dir).map_err(|err| RenderError::io(dir, err))? {
            let path = entry.map_err(|err| RenderError::io(dir, err))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("dot") {
                continue;
            }
            let index = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<usize>().ok());
            match (index, path.file_name().and_then(|name| name.to_str())) {
                (Some(index), Some(name)) => indexed.push((index, name.to_string())),
                _ => debug!("skipping {}", path.display()),
            }
        }

        indexed.sort_unstable_by_key(|(index, _)| *index);
        Ok(Self {
            fps,
            frames: indexed.into_iter().map(|(_, name)| name).collect(),
        })
    }

    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, RenderError> {
        let path = dir.as_ref().join(MANIFEST_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?).map_err(|err| RenderError::io(&path, err))?;
        Ok(path)
    }

    pub fn read_from(dir: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = dir.as_ref().join(MANIFEST_FILE);
        let text = fs::read_to_string(&path).map_err(|err| RenderError::io(&path, err))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Playback length in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames.len() as f64 / f64::from(self.fps)
    }
}

fn frame_name(step: usize) -> String {
    format!("{step}.dot")
}

/// Observer writing every step as a numbered DOT frame
#[derive(Debug)]
pub struct DotFrameWriter {
    dir: PathBuf,
    view: GraphView,
    fps: u32,
    frames: Vec<String>,
    error: Option<RenderError>,
}

impl DotFrameWriter {
    /// Creates the frame directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, RenderError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| RenderError::io(&dir, err))?;
        Ok(Self {
            dir,
            view: GraphView::default(),
            fps: DEFAULT_FPS,
            frames: Vec::new(),
            error: None,
        })
    }

    pub fn with_view(mut self, view: GraphView) -> Self {
        self.view = view;
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Result<Self, RenderError> {
        if fps == 0 {
            return Err(RenderError::InvalidFrameRate);
        }
        self.fps = fps;
        Ok(self)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Writes one frame unless an earlier write already failed
    pub fn write_frame(&mut self, step: usize, dot: &str) {
        if self.error.is_some() {
            return;
        }
        let name = frame_name(step);
        let path = self.dir.join(&name);
        match fs::write(&path, dot) {
            Ok(()) => self.frames.push(name),
            Err(err) => {
                warn!("failed to write frame {}: {}", path.display(), err);
                self.error = Some(RenderError::io(&path, err));
            }
        }
    }

    /// Reports the first write error, or writes the manifest
    pub fn finish(self) -> Result<FrameManifest, RenderError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let manifest = FrameManifest {
            fps: self.fps,
            frames: self.frames,
        };
        let path = manifest.write_to(&self.dir)?;
        info!("wrote {} frames and {}", manifest.frames.len(), path.display());
        Ok(manifest)
    }
}

impl<C: Capacity> StepObserver<C> for DotFrameWriter {
    fn observe(&mut self, event: &StepEvent<'_, C>) {
        let dot = self.view.render_event(event);
        self.write_frame(event.step, &dot);
    }
}

/// Replays a recorded trace into a frame directory
pub fn render_history<C: Capacity>(
    history: &ExecutionHistory<C>,
    dir: impl Into<PathBuf>,
    view: GraphView,
    fps: u32,
) -> Result<FrameManifest, RenderError> {
    let mut writer = DotFrameWriter::new(dir)?.with_view(view).with_fps(fps)?;
    for snapshot in history.snapshots() {
        let dot = writer.view.render_snapshot(snapshot);
        writer.write_frame(snapshot.step, &dot);
    }
    debug!(
        "replayed {} steps of {}",
        history.len(),
        history.metadata().algorithm_name
    );
    writer.finish()
}
