//! Movement path construction.
//!
//! Stitches home / approach / cut / retract segments for every pass into one
//! continuous, time-stamped machine path. Steps are accumulated by a builder
//! and frozen into an immutable [`MovementPath`] whose global time axis is
//! re-based cumulatively; pass metadata is recorded as index ranges so it
//! survives later time rescaling.

use lensedge_contour::PolarContour;
use lensedge_math::linspace;
use serde::{Deserialize, Serialize};

use crate::kinematics::{self, KinematicsSolution};
use crate::machine::{MachineConfig, BEVEL_WHEEL, ROUGHING_WHEEL};
use crate::roughing::RoughingPass;
use crate::Result;

/// What a path step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Parked at the home position.
    Home,
    /// Linear move toward a cut start.
    Approach,
    /// Roughing cut along one pass contour.
    Roughing,
    /// Finishing cut along the final contour.
    Beveling,
    /// Linear move back to home.
    Retract,
}

/// One stitched segment of the machine path.
///
/// `time` is cumulative from zero within the step; the path concatenation
/// re-bases it onto the global axis.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationStep {
    /// Step kind.
    pub kind: OperationKind,
    /// 1-based pass number for cutting steps, 0 otherwise.
    pub pass_index: usize,
    /// Machine X per frame (mm).
    pub x: Vec<f64>,
    /// Machine Z per frame (mm).
    pub z: Vec<f64>,
    /// Spindle angle per frame (degrees).
    pub theta: Vec<f64>,
    /// Step-local cumulative time per frame (seconds).
    pub time: Vec<f64>,
}

impl OperationStep {
    /// Number of frames in this step.
    pub fn frame_count(&self) -> usize {
        self.x.len()
    }

    /// Step duration in seconds.
    pub fn duration_sec(&self) -> f64 {
        self.time.last().copied().unwrap_or(0.0)
    }
}

/// Index-range metadata tagging which frames belong to which pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassSegment {
    /// First frame of the pass in the concatenated path.
    pub start_frame: usize,
    /// Last frame of the pass (inclusive).
    pub end_frame: usize,
    /// 1-based pass number.
    pub pass_index: usize,
    /// Cutting kind of the pass.
    pub kind: OperationKind,
    /// Optional removal-rate cap for the pass (mm³/s).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_volume_rate_mm3_per_sec: Option<f64>,
}

impl PassSegment {
    /// True when `frame` falls inside this segment.
    pub fn contains(&self, frame: usize) -> bool {
        (self.start_frame..=self.end_frame).contains(&frame)
    }
}

/// Machine state at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineState {
    /// Machine X (mm).
    pub x_mm: f64,
    /// Machine Z (mm).
    pub z_mm: f64,
    /// Spindle angle (degrees).
    pub theta_deg: f64,
}

/// A complete, frozen machine path.
///
/// Built once per plan and replaced wholesale on replanning.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementPath {
    steps: Vec<OperationStep>,
    segments: Vec<PassSegment>,
    x: Vec<f64>,
    z: Vec<f64>,
    theta: Vec<f64>,
    time: Vec<f64>,
}

impl MovementPath {
    /// A path with no steps at all.
    pub fn empty() -> Self {
        Self {
            steps: Vec::new(),
            segments: Vec::new(),
            x: Vec::new(),
            z: Vec::new(),
            theta: Vec::new(),
            time: Vec::new(),
        }
    }

    /// The ordered steps.
    pub fn steps(&self) -> &[OperationStep] {
        &self.steps
    }

    /// Pass-segment metadata, in path order.
    pub fn segments(&self) -> &[PassSegment] {
        &self.segments
    }

    /// Concatenated machine X (mm).
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Concatenated machine Z (mm).
    pub fn z(&self) -> &[f64] {
        &self.z
    }

    /// Concatenated spindle angle (degrees).
    pub fn theta(&self) -> &[f64] {
        &self.theta
    }

    /// Global cumulative time axis (seconds).
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Total number of frames.
    pub fn total_frames(&self) -> usize {
        self.x.len()
    }

    /// True when the path has no frames.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Total duration in seconds.
    pub fn total_duration_sec(&self) -> f64 {
        self.time.last().copied().unwrap_or(0.0)
    }

    /// The segment containing `frame`, if any.
    pub fn segment_at(&self, frame: usize) -> Option<&PassSegment> {
        self.segments.iter().find(|s| s.contains(frame))
    }

    /// Machine state at time `t_sec` (nearest frame at or after `t_sec`).
    pub fn state_at_time(&self, t_sec: f64) -> Option<MachineState> {
        if self.is_empty() {
            return None;
        }
        let idx = self
            .time
            .partition_point(|&t| t < t_sec)
            .min(self.x.len() - 1);
        Some(MachineState {
            x_mm: self.x[idx],
            z_mm: self.z[idx],
            theta_deg: self.theta[idx],
        })
    }
}

/// Sampling and positioning parameters for path construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Home position X (mm).
    pub home_x_mm: f64,
    /// Home position Z (mm).
    pub home_z_mm: f64,
    /// Linear feed for approach/retract moves (mm/s).
    pub feed_mm_per_sec: f64,
    /// Playback sampling rate for linear moves (Hz).
    pub sample_rate_hz: f64,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            home_x_mm: -50.0,
            home_z_mm: 0.0,
            feed_mm_per_sec: 50.0,
            sample_rate_hz: 30.0,
        }
    }
}

/// The final beveling pass fed to the path builder.
#[derive(Debug, Clone)]
pub struct BevelPass {
    /// Target contour with the bevel-apex height map.
    pub contour: PolarContour,
    /// Spindle speed (seconds per revolution).
    pub speed_sec_per_rev: f64,
    /// Optional removal-rate cap (mm³/s).
    pub max_volume_rate_mm3_per_sec: Option<f64>,
}

/// Accumulates steps and freezes them into a [`MovementPath`].
pub struct MovementPathBuilder<'a> {
    machine: &'a MachineConfig,
    settings: PathSettings,
    steps: Vec<OperationStep>,
    segments: Vec<PassSegment>,
    frames: usize,
    current: MachineState,
}

impl<'a> MovementPathBuilder<'a> {
    /// Start a new path at the configured home position.
    pub fn new(machine: &'a MachineConfig, settings: PathSettings) -> Self {
        Self {
            machine,
            settings,
            steps: Vec::new(),
            segments: Vec::new(),
            frames: 0,
            current: MachineState {
                x_mm: settings.home_x_mm,
                z_mm: settings.home_z_mm,
                theta_deg: 0.0,
            },
        }
    }

    /// Emit the single-frame home step.
    pub fn home(&mut self) {
        let s = self.settings;
        self.push_step(OperationStep {
            kind: OperationKind::Home,
            pass_index: 0,
            x: vec![s.home_x_mm],
            z: vec![s.home_z_mm],
            theta: vec![0.0],
            time: vec![0.0],
        });
        self.current = MachineState {
            x_mm: s.home_x_mm,
            z_mm: s.home_z_mm,
            theta_deg: 0.0,
        };
    }

    /// Solve and append one cutting pass (approach, then the cut itself).
    ///
    /// A zero-sample solution is skipped silently: there is nothing to do.
    pub fn cutting_pass(
        &mut self,
        kind: OperationKind,
        pass_index: usize,
        contour: &PolarContour,
        speed_sec_per_rev: f64,
        max_volume_rate: Option<f64>,
    ) -> Result<()> {
        let wheel_index = match kind {
            OperationKind::Beveling => BEVEL_WHEEL,
            _ => ROUGHING_WHEEL,
        };
        let wheel = self.machine.wheel(wheel_index)?;
        let (wheel_x, wheel_z) = self.machine.wheel_position(wheel_index)?;

        let solution = kinematics::solve(
            contour,
            wheel.cutting_radius_mm,
            self.machine.tilt_deg.abs(),
            0.0,
        );
        if solution.is_empty() {
            tracing::warn!(pass_index, "kinematics produced no samples; skipping pass");
            return Ok(());
        }

        let start = MachineState {
            x_mm: wheel_x - solution.x_mm[0],
            z_mm: wheel_z + solution.z_mm[0],
            theta_deg: solution.theta_deg[0],
        };
        self.linear_move(OperationKind::Approach, start);
        self.cut(kind, pass_index, &solution, wheel_x, wheel_z, speed_sec_per_rev, max_volume_rate);
        Ok(())
    }

    /// Emit the final retract back to home.
    pub fn retract(&mut self) {
        let s = self.settings;
        self.linear_move(
            OperationKind::Retract,
            MachineState {
                x_mm: s.home_x_mm,
                z_mm: s.home_z_mm,
                theta_deg: 0.0,
            },
        );
    }

    /// Freeze the accumulated steps into an immutable path.
    pub fn finish(self) -> MovementPath {
        let total: usize = self.steps.iter().map(OperationStep::frame_count).sum();
        let mut x = Vec::with_capacity(total);
        let mut z = Vec::with_capacity(total);
        let mut theta = Vec::with_capacity(total);
        let mut time = Vec::with_capacity(total);

        let mut cumulative = 0.0;
        for step in &self.steps {
            x.extend_from_slice(&step.x);
            z.extend_from_slice(&step.z);
            theta.extend_from_slice(&step.theta);
            time.extend(step.time.iter().map(|&t| t + cumulative));
            cumulative += step.duration_sec();
        }

        MovementPath {
            steps: self.steps,
            segments: self.segments,
            x,
            z,
            theta,
            time,
        }
    }

    /// Linear interpolation from the current position, timed by feed rate.
    fn linear_move(&mut self, kind: OperationKind, to: MachineState) {
        let s = self.settings;
        let from = self.current;
        let distance = ((to.x_mm - from.x_mm).powi(2) + (to.z_mm - from.z_mm).powi(2)).sqrt();

        let (frames, duration) = if distance > 0.0 {
            let duration = distance / s.feed_mm_per_sec;
            (((duration * s.sample_rate_hz) as usize).max(2), duration)
        } else {
            (10, 0.1)
        };

        self.push_step(OperationStep {
            kind,
            pass_index: 0,
            x: linspace(from.x_mm, to.x_mm, frames),
            z: linspace(from.z_mm, to.z_mm, frames),
            theta: linspace(from.theta_deg, to.theta_deg, frames),
            time: linspace(0.0, duration, frames),
        });
        self.current = to;
    }

    /// Append one cutting step and record its pass segment.
    ///
    /// Spindle speed governs the cut duration: one revolution takes
    /// `speed_sec_per_rev` seconds, and the swept angle determines how many
    /// revolutions the pass covers.
    fn cut(
        &mut self,
        kind: OperationKind,
        pass_index: usize,
        solution: &KinematicsSolution,
        wheel_x: f64,
        wheel_z: f64,
        speed_sec_per_rev: f64,
        max_volume_rate: Option<f64>,
    ) {
        let n = solution.len();
        let x: Vec<f64> = solution.x_mm.iter().map(|&v| wheel_x - v).collect();
        let z: Vec<f64> = solution.z_mm.iter().map(|&v| wheel_z + v).collect();
        let theta = solution.theta_deg.clone();

        let max_theta = theta.iter().cloned().fold(0.0, f64::max);
        let total_time = if max_theta > 0.0 {
            max_theta / 360.0 * speed_sec_per_rev
        } else {
            n as f64 * speed_sec_per_rev / 360.0
        };

        self.segments.push(PassSegment {
            start_frame: self.frames,
            end_frame: self.frames + n - 1,
            pass_index,
            kind,
            max_volume_rate_mm3_per_sec: max_volume_rate,
        });

        self.current = MachineState {
            x_mm: x[n - 1],
            z_mm: z[n - 1],
            theta_deg: theta[n - 1],
        };
        self.push_step(OperationStep {
            kind,
            pass_index,
            x,
            z,
            theta,
            time: linspace(0.0, total_time, n),
        });
    }

    fn push_step(&mut self, step: OperationStep) {
        self.frames += step.frame_count();
        self.steps.push(step);
    }
}

/// Plan the complete machine path for an edging job.
///
/// Home, then every roughing pass on wheel 0, then the beveling pass on
/// wheel 1, then retract. An empty pass list with no bevel short-circuits to
/// an empty path; nothing to do is not an error.
pub fn plan_movement_path(
    machine: &MachineConfig,
    settings: PathSettings,
    roughing_passes: &[RoughingPass],
    bevel: Option<&BevelPass>,
) -> Result<MovementPath> {
    if roughing_passes.is_empty() && bevel.is_none() {
        return Ok(MovementPath::empty());
    }

    let mut builder = MovementPathBuilder::new(machine, settings);
    builder.home();

    for pass in roughing_passes {
        builder.cutting_pass(
            OperationKind::Roughing,
            pass.pass_index,
            &pass.contour,
            pass.duration_sec,
            pass.max_volume_rate_mm3_per_sec,
        )?;
    }

    if let Some(bevel) = bevel {
        builder.cutting_pass(
            OperationKind::Beveling,
            1,
            &bevel.contour,
            bevel.speed_sec_per_rev,
            bevel.max_volume_rate_mm3_per_sec,
        )?;
    }

    builder.retract();
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lensedge_contour::PolarContour;

    fn roughing_pass(index: usize, radius: f64, speed: f64) -> RoughingPass {
        RoughingPass {
            pass_index: index,
            contour: PolarContour::circular(90, radius),
            removed_volume_mm3: 0.0,
            duration_sec: speed,
            max_volume_rate_mm3_per_sec: None,
        }
    }

    fn machine() -> MachineConfig {
        MachineConfig::default_machine()
    }

    #[test]
    fn test_empty_job_yields_empty_path() {
        let path = plan_movement_path(&machine(), PathSettings::default(), &[], None).unwrap();
        assert!(path.is_empty());
        assert_eq!(path.total_frames(), 0);
    }

    #[test]
    fn test_path_structure() {
        let passes = vec![roughing_pass(1, 47.0, 15.0), roughing_pass(2, 45.0, 12.0)];
        let path =
            plan_movement_path(&machine(), PathSettings::default(), &passes, None).unwrap();

        let kinds: Vec<OperationKind> = path.steps().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                OperationKind::Home,
                OperationKind::Approach,
                OperationKind::Roughing,
                OperationKind::Approach,
                OperationKind::Roughing,
                OperationKind::Retract,
            ]
        );
        assert_eq!(path.segments().len(), 2);
    }

    #[test]
    fn test_global_time_monotonic_and_sums_step_durations() {
        let passes = vec![roughing_pass(1, 47.0, 15.0)];
        let bevel = BevelPass {
            contour: PolarContour::circular(90, 45.0),
            speed_sec_per_rev: 10.0,
            max_volume_rate_mm3_per_sec: None,
        };
        let path =
            plan_movement_path(&machine(), PathSettings::default(), &passes, Some(&bevel))
                .unwrap();

        let time = path.time();
        for w in time.windows(2) {
            assert!(w[1] >= w[0]);
        }
        let step_total: f64 = path.steps().iter().map(OperationStep::duration_sec).sum();
        assert_relative_eq!(path.total_duration_sec(), step_total, epsilon = 1e-9);
    }

    #[test]
    fn test_segments_are_index_based_and_cover_cut_frames() {
        let passes = vec![roughing_pass(1, 47.0, 15.0)];
        let bevel = BevelPass {
            contour: PolarContour::circular(90, 45.0),
            speed_sec_per_rev: 10.0,
            max_volume_rate_mm3_per_sec: Some(80.0),
        };
        let path =
            plan_movement_path(&machine(), PathSettings::default(), &passes, Some(&bevel))
                .unwrap();

        assert_eq!(path.segments().len(), 2);
        for segment in path.segments() {
            assert_eq!(segment.end_frame - segment.start_frame + 1, 90);
            let step_kind = path.segment_at(segment.start_frame).unwrap().kind;
            assert_eq!(step_kind, segment.kind);
            assert!(segment.end_frame < path.total_frames());
        }
        assert_eq!(path.segments()[1].kind, OperationKind::Beveling);
        assert_eq!(
            path.segments()[1].max_volume_rate_mm3_per_sec,
            Some(80.0)
        );
    }

    #[test]
    fn test_cut_duration_follows_spindle_speed() {
        let passes = vec![roughing_pass(1, 47.0, 15.0)];
        let path =
            plan_movement_path(&machine(), PathSettings::default(), &passes, None).unwrap();
        let cut = path
            .steps()
            .iter()
            .find(|s| s.kind == OperationKind::Roughing)
            .unwrap();
        // 90 samples sweep 356 of 360 degrees; duration scales accordingly.
        let max_theta = 89.0 / 90.0 * 360.0;
        assert_relative_eq!(cut.duration_sec(), max_theta / 360.0 * 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_state_at_time() {
        let passes = vec![roughing_pass(1, 47.0, 15.0)];
        let settings = PathSettings::default();
        let path = plan_movement_path(&machine(), settings, &passes, None).unwrap();

        let at_start = path.state_at_time(0.0).unwrap();
        assert_relative_eq!(at_start.x_mm, settings.home_x_mm);
        assert_relative_eq!(at_start.z_mm, settings.home_z_mm);

        let past_end = path.state_at_time(path.total_duration_sec() + 100.0).unwrap();
        assert_relative_eq!(past_end.x_mm, settings.home_x_mm);

        assert!(MovementPath::empty().state_at_time(1.0).is_none());
    }

    #[test]
    fn test_approach_has_minimum_two_frames() {
        let mut settings = PathSettings::default();
        settings.feed_mm_per_sec = 1e6; // so fast the frame count would truncate to 0
        let passes = vec![roughing_pass(1, 47.0, 15.0)];
        let path = plan_movement_path(&machine(), settings, &passes, None).unwrap();
        let approach = path
            .steps()
            .iter()
            .find(|s| s.kind == OperationKind::Approach)
            .unwrap();
        assert!(approach.frame_count() >= 2);
    }
}
