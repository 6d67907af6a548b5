//! Job-file loading.
//!
//! A job is a TOML document describing the blank, the target contour, the
//! roughing schedule, and optionally the bevel and a machine override:
//!
//! ```toml
//! method = "CONCENTRIC"
//!
//! [blank]
//! radius_mm = 50.0
//! front_curve_mm = 86.0
//! back_curve_mm = 86.0
//! center_thickness_mm = 6.0
//!
//! [target]
//! contour_file = "target.json"   # {"radii": [...], "heights": [...]}
//! # or: circle_radius_mm = 45.0 / samples = 360
//!
//! [[passes]]
//! step_mm = 3.0
//! speed_sec_per_rev = 15.0
//! max_volume_rate_mm3_per_sec = 100.0
//!
//! [bevel]
//! speed_sec_per_rev = 10.0
//! position = 0.5
//! width_mm = 1.0
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use lensedge_cam::{MachineConfig, RoughingMethod, RoughingPassParam};
use lensedge_contour::PolarContour;
use lensedge_mesh::LensBlank;
use serde::Deserialize;

/// Parsed job file.
#[derive(Debug, Deserialize)]
pub struct JobFile {
    pub method: RoughingMethod,
    pub blank: BlankSection,
    pub target: TargetSection,
    #[serde(default)]
    pub passes: Vec<RoughingPassParam>,
    #[serde(default)]
    pub bevel: Option<BevelSection>,
    /// Optional path to a machine-config JSON; the default bench otherwise.
    #[serde(default)]
    pub machine_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct BlankSection {
    pub radius_mm: f64,
    pub front_curve_mm: f64,
    pub back_curve_mm: f64,
    pub center_thickness_mm: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct TargetSection {
    #[serde(default)]
    pub contour_file: Option<PathBuf>,
    #[serde(default)]
    pub circle_radius_mm: Option<f64>,
    #[serde(default = "default_samples")]
    pub samples: usize,
}

fn default_samples() -> usize {
    360
}

#[derive(Debug, Deserialize)]
pub struct BevelSection {
    pub speed_sec_per_rev: f64,
    #[serde(default = "default_bevel_position")]
    pub position: f64,
    #[serde(default = "default_bevel_width")]
    pub width_mm: f64,
    #[serde(default)]
    pub max_volume_rate_mm3_per_sec: Option<f64>,
}

fn default_bevel_position() -> f64 {
    0.5
}

fn default_bevel_width() -> f64 {
    1.0
}

impl JobFile {
    /// Load and parse a job file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading job file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing job file {}", path.display()))
    }

    /// The blank's geometry.
    pub fn lens_blank(&self) -> LensBlank {
        LensBlank {
            front_curve_mm: self.blank.front_curve_mm,
            back_curve_mm: self.blank.back_curve_mm,
            center_thickness_mm: self.blank.center_thickness_mm,
        }
    }

    /// Resolve the target contour, reading the contour file relative to the
    /// job file's directory.
    pub fn target_contour(&self, job_dir: &Path) -> anyhow::Result<PolarContour> {
        match (&self.target.contour_file, self.target.circle_radius_mm) {
            (Some(file), _) => {
                let path = if file.is_absolute() {
                    file.clone()
                } else {
                    job_dir.join(file)
                };
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading contour file {}", path.display()))?;
                let contour: PolarContour = serde_json::from_str(&text)
                    .with_context(|| format!("parsing contour file {}", path.display()))?;
                Ok(contour)
            }
            (None, Some(radius)) => Ok(PolarContour::circular(self.target.samples, radius)),
            (None, None) => bail!("job target needs either contour_file or circle_radius_mm"),
        }
    }

    /// Resolve the machine configuration.
    pub fn machine(&self, job_dir: &Path) -> anyhow::Result<MachineConfig> {
        match &self.machine_file {
            Some(file) => {
                let path = if file.is_absolute() {
                    file.clone()
                } else {
                    job_dir.join(file)
                };
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading machine file {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing machine file {}", path.display()))
            }
            None => Ok(MachineConfig::default_machine()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
method = "CONCENTRIC"

[blank]
radius_mm = 50.0
front_curve_mm = 86.0
back_curve_mm = 86.0
center_thickness_mm = 6.0

[target]
circle_radius_mm = 45.0
samples = 180

[[passes]]
step_mm = 3.0
speed_sec_per_rev = 15.0

[bevel]
speed_sec_per_rev = 10.0
"#;

    #[test]
    fn test_parse_sample_job() {
        let job: JobFile = toml::from_str(SAMPLE).unwrap();
        assert_eq!(job.method, RoughingMethod::Concentric);
        assert_eq!(job.passes.len(), 1);
        assert_eq!(job.target.samples, 180);
        let bevel = job.bevel.unwrap();
        assert_eq!(bevel.position, 0.5);
        assert_eq!(bevel.width_mm, 1.0);
    }

    #[test]
    fn test_target_resolution() {
        let job: JobFile = toml::from_str(SAMPLE).unwrap();
        let target = job.target_contour(Path::new(".")).unwrap();
        assert_eq!(target.len(), 180);
        assert!((target.max_radius() - 45.0).abs() < 1e-12);
    }

    #[test]
    fn test_target_requires_a_source() {
        let mut job: JobFile = toml::from_str(SAMPLE).unwrap();
        job.target = TargetSection::default();
        assert!(job.target_contour(Path::new(".")).is_err());
    }
}
