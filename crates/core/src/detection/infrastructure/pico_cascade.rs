//! Pixel-intensity-comparison cascade in the pico binary format.

use ndarray::ArrayView2;
use thiserror::Error;

use crate::shared::detection::Detection;
use crate::shared::request_config::DetectionParams;

const HEADER_LEN: usize = 8;
const MAX_TREE_DEPTH: u32 = 16;

#[derive(Error, Debug, PartialEq)]
pub enum CascadeError {
    #[error("cascade data truncated at byte {offset} (needed {needed} more)")]
    Truncated { offset: usize, needed: usize },
    #[error("unsupported tree depth {0}")]
    UnsupportedDepth(u32),
    #[error("cascade contains no trees")]
    Empty,
}

/// Decoded cascade: a sequence of binary decision trees.
///
/// Each tree owns `4 * 2^depth` code bytes (the first four are padding so
/// node `i` lives at `4*i`), `2^depth` leaf predictions and one threshold.
#[derive(Clone, Debug)]
pub struct PicoCascade {
    depth: u32,
    codes: Vec<i8>,
    predictions: Vec<f32>,
    thresholds: Vec<f32>,
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], CascadeError> {
        let end = self.pos.checked_add(n).filter(|&end| end <= self.data.len());
        let Some(end) = end else {
            return Err(CascadeError::Truncated {
                offset: self.pos,
                needed: n,
            });
        };
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u32_le(&mut self) -> Result<u32, CascadeError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn f32_le(&mut self) -> Result<f32, CascadeError> {
        self.u32_le().map(f32::from_bits)
    }
}

impl PicoCascade {
    pub fn unpack(data: &[u8]) -> Result<Self, CascadeError> {
        let mut cur = Cursor { data, pos: 0 };
        cur.take(HEADER_LEN)?;

        let depth = cur.u32_le()?;
        if depth == 0 || depth > MAX_TREE_DEPTH {
            return Err(CascadeError::UnsupportedDepth(depth));
        }
        let tree_count = cur.u32_le()? as usize;
        if tree_count == 0 {
            return Err(CascadeError::Empty);
        }

        let leaves = 1usize << depth;
        let mut codes = Vec::new();
        let mut predictions = Vec::new();
        let mut thresholds = Vec::new();

        for _ in 0..tree_count {
            codes.extend_from_slice(&[0, 0, 0, 0]);
            let node_codes = cur.take(4 * (leaves - 1))?;
            codes.extend(node_codes.iter().map(|&b| b as i8));
            for _ in 0..leaves {
                predictions.push(cur.f32_le()?);
            }
            thresholds.push(cur.f32_le()?);
        }

        Ok(Self {
            depth,
            codes,
            predictions,
            thresholds,
        })
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn tree_count(&self) -> usize {
        self.thresholds.len()
    }

    /// Scores the square window centered at (`row`, `col`) with side `scale`.
    ///
    /// Returns a negative value as soon as any stage rejects the window.
    pub fn classify_region(&self, row: i32, col: i32, scale: i32, pixels: &ArrayView2<u8>) -> f32 {
        let leaves = 1usize << self.depth;
        let r = row * 256;
        let c = col * 256;
        let mut root = 0usize;
        let mut out = 0.0f32;

        for (tree, &threshold) in self.thresholds.iter().enumerate() {
            let mut idx = 1usize;
            for _ in 0..self.depth {
                let node = &self.codes[root + 4 * idx..root + 4 * idx + 4];
                let p1 = pixel_at(
                    pixels,
                    (r + node[0] as i32 * scale) >> 8,
                    (c + node[1] as i32 * scale) >> 8,
                );
                let p2 = pixel_at(
                    pixels,
                    (r + node[2] as i32 * scale) >> 8,
                    (c + node[3] as i32 * scale) >> 8,
                );
                idx = 2 * idx + usize::from(p1 <= p2);
            }

            out += self.predictions[leaves * tree + idx - leaves];
            if out <= threshold {
                return -1.0;
            }
            root += 4 * leaves;
        }

        out - self.thresholds[self.thresholds.len() - 1]
    }

    /// Sliding-window search over every scale from `min_size` to `max_size`.
    pub fn find_objects(&self, pixels: &ArrayView2<u8>, params: &DetectionParams) -> Vec<Detection> {
        let (rows, cols) = pixels.dim();
        let (rows, cols) = (rows as i32, cols as i32);
        let max_size = params.max_size.min(i32::MAX as u32) as i32;
        let mut scale = params.min_size.max(1) as i32;
        let mut detections = Vec::new();

        while scale <= max_size {
            let step = ((params.shift_factor * scale as f64) as i32).max(1);
            let offset = scale / 2 + 1;

            let mut row = offset;
            while row <= rows - offset {
                let mut col = offset;
                while col <= cols - offset {
                    let score = self.classify_region(row, col, scale, pixels);
                    if score > 0.0 {
                        detections.push(Detection::new(row, col, scale, score));
                    }
                    col += step;
                }
                row += step;
            }

            let next = (scale as f64 * params.scale_factor) as i32;
            scale = next.max(scale + 1);
        }

        detections
    }
}

fn pixel_at(pixels: &ArrayView2<u8>, row: i32, col: i32) -> u8 {
    let (rows, cols) = pixels.dim();
    let r = row.clamp(0, rows as i32 - 1) as usize;
    let c = col.clamp(0, cols as i32 - 1) as usize;
    pixels[[r, c]]
}

/// Merges overlapping candidates into one detection per cluster.
///
/// Candidates are visited in ascending score order; each one not yet
/// assigned seeds a cluster of itself and every later candidate whose IoU
/// with it exceeds `iou_threshold`. The cluster reports the mean position and scale and the
/// summed score.
pub fn cluster_detections(detections: &[Detection], iou_threshold: f64) -> Vec<Detection> {
    let mut sorted = detections.to_vec();
    sorted.sort_by(|a, b| a.score.total_cmp(&b.score));

    let mut assigned = vec![false; sorted.len()];
    let mut clusters = Vec::new();

    for i in 0..sorted.len() {
        if assigned[i] {
            continue;
        }
        let (mut row, mut col, mut scale, mut score, mut n) = (0i64, 0i64, 0i64, 0.0f32, 0i64);
        for j in i..sorted.len() {
            if sorted[i].iou(&sorted[j]) > iou_threshold {
                assigned[j] = true;
                row += sorted[j].row as i64;
                col += sorted[j].col as i64;
                scale += sorted[j].scale as i64;
                score += sorted[j].score;
                n += 1;
            }
        }
        if n > 0 {
            clusters.push(Detection::new(
                (row / n) as i32,
                (col / n) as i32,
                (scale / n) as i32,
                score,
            ));
        }
    }

    clusters
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    /// Depth-1 single-tree cascade comparing the window center against the
    /// pixel `offset/256 * scale` rows above it. Fires (score `hit - threshold`)
    /// when the center is strictly brighter than that pixel.
    pub(crate) fn edge_cascade_bytes(offset: i8, hit: f32, threshold: f32) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        // node 1: p1 = center, p2 = (row - offset, col)
        data.extend_from_slice(&[0, 0, (-(offset as i16)) as i8 as u8, 0]);
        // leaf 0 (center > above) then leaf 1 (center <= above)
        data.extend_from_slice(&hit.to_le_bytes());
        data.extend_from_slice(&(-10.0f32).to_le_bytes());
        data.extend_from_slice(&threshold.to_le_bytes());
        data
    }

    /// Dark image with a bright square of side `size` centered at (`cy`, `cx`).
    pub(crate) fn bright_square(width: usize, height: usize, cy: usize, cx: usize, size: usize) -> Array2<u8> {
        let mut img = Array2::<u8>::zeros((height, width));
        let half = size / 2;
        for r in cy - half..cy + half {
            for c in cx - half..cx + half {
                img[[r, c]] = 255;
            }
        }
        img
    }

    #[test]
    fn test_unpack_reads_layout() {
        let cascade = PicoCascade::unpack(&edge_cascade_bytes(64, 6.0, 0.0)).unwrap();
        assert_eq!(cascade.depth(), 1);
        assert_eq!(cascade.tree_count(), 1);
        assert_eq!(cascade.codes, vec![0, 0, 0, 0, 0, 0, -64, 0]);
        assert_eq!(cascade.predictions, vec![6.0, -10.0]);
        assert_eq!(cascade.thresholds, vec![0.0]);
    }

    #[test]
    fn test_unpack_truncated() {
        let mut data = edge_cascade_bytes(64, 6.0, 0.0);
        data.truncate(data.len() - 2);
        assert!(matches!(
            PicoCascade::unpack(&data),
            Err(CascadeError::Truncated { .. })
        ));
    }

    #[test]
    fn test_unpack_header_only() {
        assert!(matches!(
            PicoCascade::unpack(&[0u8; 4]),
            Err(CascadeError::Truncated { offset: 0, needed: 8 })
        ));
    }

    #[test]
    fn test_unpack_rejects_zero_trees() {
        let mut data = vec![0u8; HEADER_LEN];
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(PicoCascade::unpack(&data).unwrap_err(), CascadeError::Empty);
    }

    #[test]
    fn test_unpack_rejects_huge_depth() {
        let mut data = vec![0u8; HEADER_LEN];
        data.extend_from_slice(&40u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        assert_eq!(
            PicoCascade::unpack(&data).unwrap_err(),
            CascadeError::UnsupportedDepth(40)
        );
    }

    #[test]
    fn test_classify_fires_on_upper_edge() {
        let cascade = PicoCascade::unpack(&edge_cascade_bytes(64, 6.0, 0.0)).unwrap();
        let img = bright_square(100, 100, 50, 50, 40);
        // center (32, 50) is bright, 40*64/256 = 10 rows above is dark
        let score = cascade.classify_region(32, 50, 40, &img.view());
        assert_relative_eq!(score, 6.0);
    }

    #[test]
    fn test_classify_rejects_uniform_window() {
        let cascade = PicoCascade::unpack(&edge_cascade_bytes(64, 6.0, 0.0)).unwrap();
        let img = bright_square(100, 100, 50, 50, 40);
        assert!(cascade.classify_region(50, 50, 40, &img.view()) < 0.0);
        assert!(cascade.classify_region(10, 10, 10, &img.view()) < 0.0);
    }

    #[test]
    fn test_classify_clamps_at_border() {
        let cascade = PicoCascade::unpack(&edge_cascade_bytes(127, 6.0, 0.0)).unwrap();
        let img = Array2::<u8>::from_elem((20, 20), 200);
        assert!(cascade.classify_region(1, 1, 60, &img.view()) < 0.0);
    }

    #[test]
    fn test_find_objects_on_blank_image() {
        let cascade = PicoCascade::unpack(&edge_cascade_bytes(64, 6.0, 0.0)).unwrap();
        let img = Array2::<u8>::zeros((120, 160));
        let found = cascade.find_objects(&img.view(), &DetectionParams::default());
        assert!(found.is_empty());
    }

    #[test]
    fn test_find_objects_windows_stay_inside_image() {
        let cascade = PicoCascade::unpack(&edge_cascade_bytes(64, 6.0, 0.0)).unwrap();
        let img = bright_square(160, 120, 60, 80, 50);
        let found = cascade.find_objects(&img.view(), &DetectionParams::default());
        assert!(!found.is_empty());
        for d in &found {
            assert!(d.score > 0.0);
            assert!(d.row - d.scale / 2 >= 0 && d.row + d.scale / 2 <= 120);
            assert!(d.col - d.scale / 2 >= 0 && d.col + d.scale / 2 <= 160);
        }
    }

    #[test]
    fn test_find_objects_respects_max_size() {
        let cascade = PicoCascade::unpack(&edge_cascade_bytes(64, 6.0, 0.0)).unwrap();
        let img = bright_square(160, 120, 60, 80, 50);
        let params = DetectionParams {
            min_size: 20,
            max_size: 30,
            ..DetectionParams::default()
        };
        let found = cascade.find_objects(&img.view(), &params);
        assert!(found.iter().all(|d| (20..=30).contains(&d.scale)));
    }

    #[test]
    fn test_cluster_merges_overlapping() {
        let dets = vec![
            Detection::new(100, 100, 40, 2.0),
            Detection::new(102, 98, 42, 3.0),
            Detection::new(300, 300, 40, 4.0),
        ];
        let clusters = cluster_detections(&dets, 0.2);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0], Detection::new(101, 99, 41, 5.0));
        assert_eq!(clusters[1], Detection::new(300, 300, 40, 4.0));
    }

    #[test]
    fn test_cluster_counts_each_candidate_once() {
        // a overlaps b, b overlaps c, a and c are disjoint
        let a = Detection::new(100, 100, 40, 1.0);
        let b = Detection::new(100, 120, 40, 2.0);
        let c = Detection::new(100, 140, 40, 3.5);
        assert_eq!(a.iou(&c), 0.0);

        let clusters = cluster_detections(&[c, a, b], 0.2);

        assert_eq!(
            clusters,
            vec![
                Detection::new(100, 110, 40, 3.0),
                Detection::new(100, 140, 40, 3.5),
            ]
        );
        let total: f32 = clusters.iter().map(|d| d.score).sum();
        assert_relative_eq!(total, 6.5);
        assert!(clusters.iter().all(|d| !d.exceeds(5.0)));
    }

    #[test]
    fn test_cluster_empty() {
        assert!(cluster_detections(&[], 0.2).is_empty());
    }

    #[test]
    fn test_cluster_is_deterministic() {
        let dets = vec![
            Detection::new(100, 100, 40, 2.0),
            Detection::new(110, 100, 40, 2.0),
            Detection::new(120, 100, 40, 2.5),
        ];
        assert_eq!(cluster_detections(&dets, 0.2), cluster_detections(&dets, 0.2));
    }
}
