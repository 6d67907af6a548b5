//! Removal-rate bookkeeping and feed-rate-constrained time rescaling.

use lensedge_cam::PassSegment;

use crate::{Result, SimSettings, StockSimError, VoxelGrid};

/// Rate cap applied to frames no segment claims (mm³/s).
pub const DEFAULT_MAX_RATE_MM3_PER_SEC: f64 = 100.0;

/// Removed volume per path frame (mm³), from the death-frame field.
///
/// Each voxel below the ceiling is binned at the frame its death value maps
/// back to, weighted by the voxel volume.
pub fn removal_per_frame(
    grid: &VoxelGrid,
    num_frames: usize,
    settings: &SimSettings,
) -> Vec<f64> {
    let mut volume = vec![0.0; num_frames];
    if num_frames == 0 {
        return volume;
    }
    let voxel_volume = grid.voxel_volume_mm3();
    let ceiling = settings.ceiling as f64;

    for &v in grid.values() {
        let v = v as f64;
        if v >= ceiling {
            continue;
        }
        let frame = ((v / ceiling * num_frames as f64) as usize).min(num_frames - 1);
        volume[frame] += voxel_volume;
    }
    volume
}

/// The removal-rate cap in force at every frame.
///
/// Segments with a cap own their frame range; frames outside any segment
/// inherit the most recent in-segment value (forward fill), starting from
/// [`DEFAULT_MAX_RATE_MM3_PER_SEC`].
pub fn max_rate_per_frame(segments: &[PassSegment], num_frames: usize) -> Vec<f64> {
    let mut rates = vec![DEFAULT_MAX_RATE_MM3_PER_SEC; num_frames];
    if num_frames == 0 {
        return rates;
    }
    for segment in segments {
        if let Some(cap) = segment.max_volume_rate_mm3_per_sec {
            if cap > 0.0 {
                let end = segment.end_frame.min(num_frames.saturating_sub(1));
                for rate in &mut rates[segment.start_frame.min(num_frames)..=end] {
                    *rate = cap;
                }
            }
        }
    }

    let mut last = DEFAULT_MAX_RATE_MM3_PER_SEC;
    for (i, rate) in rates.iter_mut().enumerate() {
        if segments.iter().any(|s| s.contains(i)) {
            last = *rate;
        } else {
            *rate = last;
        }
    }
    rates
}

/// Stretch the time axis so no frame exceeds its segment's removal-rate cap.
///
/// Walks the frames in order: a frame whose volume/Δt would exceed the cap
/// gets the minimum Δt that satisfies it; all other deltas are kept. The
/// result is never shorter than the input. When no segment carries a cap the
/// input is returned unchanged, which is the no-op signal.
pub fn rescale_time(
    time: &[f64],
    volume_per_frame: &[f64],
    segments: &[PassSegment],
) -> Result<Vec<f64>> {
    if volume_per_frame.len() != time.len() {
        return Err(StockSimError::MismatchedArrays {
            expected: time.len(),
            got: volume_per_frame.len(),
        });
    }
    let has_caps = segments
        .iter()
        .any(|s| s.max_volume_rate_mm3_per_sec.is_some_and(|c| c > 0.0));
    if !has_caps {
        return Ok(time.to_vec());
    }

    let caps = max_rate_per_frame(segments, time.len());
    let mut adjusted = vec![0.0; time.len()];
    for i in 1..time.len() {
        let original_dt = time[i] - time[i - 1];
        let rate = if original_dt > 0.0 {
            volume_per_frame[i] / original_dt
        } else {
            0.0
        };
        let dt = if rate > caps[i] && caps[i] > 0.0 {
            volume_per_frame[i] / caps[i]
        } else {
            original_dt
        };
        adjusted[i] = adjusted[i - 1] + dt;
    }
    Ok(adjusted)
}

/// Volume bookkeeping over a time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeHistory {
    /// Query times (seconds).
    pub time: Vec<f64>,
    /// Material remaining at each query time (mm³).
    pub volume_remaining_mm3: Vec<f64>,
    /// Material removed by each query time (mm³).
    pub volume_removed_mm3: Vec<f64>,
    /// Removed fraction of the material that will eventually be cut (0-100).
    pub percent_complete: Vec<f64>,
}

/// Evaluate remaining/removed volume at each sample of `query_times`.
///
/// `frame_times` is the (possibly rescaled) time axis of the simulated
/// path; a voxel's death value maps to a frame and thus a death time.
/// Voxels at exactly 0 were air before the first frame and are excluded
/// from the removable total.
pub fn volume_history(
    grid: &VoxelGrid,
    frame_times: &[f64],
    query_times: &[f64],
    settings: &SimSettings,
) -> VolumeHistory {
    let voxel_volume = grid.voxel_volume_mm3();
    let ceiling = settings.ceiling as f64;
    let num_frames = frame_times.len();

    // Death time per removable voxel.
    let mut death_times: Vec<f64> = Vec::new();
    let mut remaining_material = 0.0;
    for &v in grid.values() {
        let v = v as f64;
        if v >= ceiling {
            remaining_material += voxel_volume;
        } else if v > 0.0 && num_frames > 0 {
            let frame = ((v / ceiling * num_frames as f64) as usize).min(num_frames - 1);
            death_times.push(frame_times[frame]);
        }
    }
    let removable_total = death_times.len() as f64 * voxel_volume;
    death_times.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut volume_remaining = Vec::with_capacity(query_times.len());
    let mut volume_removed = Vec::with_capacity(query_times.len());
    let mut percent = Vec::with_capacity(query_times.len());
    for &t in query_times {
        let cut = death_times.partition_point(|&d| d <= t);
        let removed = cut as f64 * voxel_volume;
        volume_removed.push(removed);
        volume_remaining.push(remaining_material + removable_total - removed);
        percent.push(if removable_total > 0.0 {
            removed / removable_total * 100.0
        } else {
            0.0
        });
    }

    VolumeHistory {
        time: query_times.to_vec(),
        volume_remaining_mm3: volume_remaining,
        volume_removed_mm3: volume_removed,
        percent_complete: percent,
    }
}
