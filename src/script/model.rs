use crate::foundation::error::{PipelineError, PipelineResult};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One authored scene.
///
/// `nominal_seconds` is a relative weight: the pipeline rescales every scene so the script spans
/// exactly the narration length.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSpec {
    /// Position in the script (dense, 0-based).
    pub order: u32,
    /// Locator resolved by the view host.
    pub view_id: String,
    /// Author's on-screen estimate, used only as a weight.
    pub nominal_seconds: f64,
    /// Overlay title.
    pub title: String,
    /// Overlay caption.
    #[serde(default)]
    pub caption: String,
    /// Informational feature tags.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ScriptDef {
    Wrapped { scenes: Vec<SceneSpec> },
    Bare(Vec<SceneSpec>),
}

/// Ordered, validated list of scenes.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneScript {
    scenes: Vec<SceneSpec>,
}

impl SceneScript {
    /// Build a script from scenes in any order; they are sorted by `order` and validated.
    pub fn new(mut scenes: Vec<SceneSpec>) -> PipelineResult<Self> {
        scenes.sort_by_key(|s| s.order);
        let script = Self { scenes };
        script.validate()?;
        Ok(script)
    }

    /// Parse a script from JSON: either `{"scenes": [...]}` or a bare array.
    pub fn from_reader<R: std::io::Read>(r: R) -> PipelineResult<Self> {
        let def: ScriptDef = serde_json::from_reader(r)
            .map_err(|e| PipelineError::configuration(format!("parse scene script JSON: {e}")))?;
        let scenes = match def {
            ScriptDef::Wrapped { scenes } | ScriptDef::Bare(scenes) => scenes,
        };
        Self::new(scenes)
    }

    /// Parse a script from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PipelineError::configuration(format!(
                "open scene script JSON '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check that the script is non-empty, weights are finite and positive, and `order` values
    /// are exactly `0..N`.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.scenes.is_empty() {
            return Err(PipelineError::configuration(
                "scene script must contain at least one scene",
            ));
        }
        for (i, scene) in self.scenes.iter().enumerate() {
            if !scene.nominal_seconds.is_finite() || scene.nominal_seconds <= 0.0 {
                return Err(PipelineError::configuration(format!(
                    "scene {} ('{}') must have a finite nominalSeconds > 0, got {}",
                    scene.order, scene.title, scene.nominal_seconds
                )));
            }
            if scene.order as usize != i {
                return Err(PipelineError::configuration(format!(
                    "scene orders must be unique and dense from 0, expected {i} but found {}",
                    scene.order
                )));
            }
            if scene.view_id.trim().is_empty() {
                return Err(PipelineError::configuration(format!(
                    "scene {} has an empty viewId",
                    scene.order
                )));
            }
        }
        Ok(())
    }

    /// Scenes in script order.
    pub fn scenes(&self) -> &[SceneSpec] {
        &self.scenes
    }

    /// Number of scenes (always >= 1).
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Always `false` for a validated script.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Nominal weights in script order.
    pub fn nominal_seconds(&self) -> Vec<f64> {
        self.scenes.iter().map(|s| s.nominal_seconds).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/model.rs"]
mod tests;
