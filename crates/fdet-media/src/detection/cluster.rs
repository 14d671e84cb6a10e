use fdet_models::Detection;

/// Merge overlapping detections.
///
/// Detections are visited in descending score order. Each one not yet
/// assigned seeds a cluster that absorbs every later unassigned detection
/// whose IoU with the seed is strictly greater than `iou_threshold`. The
/// representative carries the mean center and scale of its members and the
/// sum of their scores.
pub fn cluster_detections(mut detections: Vec<Detection>, iou_threshold: f64) -> Vec<Detection> {
    detections.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut assigned = vec![false; detections.len()];
    let mut clusters = Vec::new();

    for i in 0..detections.len() {
        if assigned[i] {
            continue;
        }

        let seed = detections[i];
        let (mut row, mut col, mut scale, mut score) = (0i64, 0i64, 0i64, 0.0f64);
        let mut members = 0i64;

        for j in i..detections.len() {
            if assigned[j] || seed.iou(&detections[j]) <= iou_threshold {
                continue;
            }
            assigned[j] = true;
            let det = &detections[j];
            row += det.row as i64;
            col += det.col as i64;
            scale += det.scale as i64;
            score += det.score;
            members += 1;
        }

        // The seed always overlaps itself unless its window is empty.
        if members == 0 {
            assigned[i] = true;
            clusters.push(seed);
            continue;
        }

        clusters.push(Detection::new(
            (row / members) as i32,
            (col / members) as i32,
            (scale / members) as i32,
            score,
        ));
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_pair_merges() {
        let detections = vec![
            Detection::new(100, 100, 40, 3.0),
            Detection::new(102, 104, 40, 4.0),
        ];

        let clusters = cluster_detections(detections, 0.18);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].row, 101);
        assert_eq!(clusters[0].col, 102);
        assert_eq!(clusters[0].scale, 40);
        assert!((clusters[0].score - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_detections_stay_apart() {
        let detections = vec![
            Detection::new(50, 50, 30, 6.0),
            Detection::new(300, 300, 30, 8.0),
        ];

        let clusters = cluster_detections(detections, 0.18);

        assert_eq!(clusters.len(), 2);
        // Strongest first
        assert_eq!(clusters[0].row, 300);
        assert_eq!(clusters[1].row, 50);
    }

    #[test]
    fn test_overlap_at_threshold_is_not_merged() {
        // Shifted by half a window: IoU = 1/3.
        let detections = vec![
            Detection::new(50, 50, 20, 2.0),
            Detection::new(50, 60, 20, 1.0),
        ];

        assert_eq!(cluster_detections(detections.clone(), 0.5).len(), 2);
        assert_eq!(cluster_detections(detections, 0.3).len(), 1);
    }

    #[test]
    fn test_empty_window_kept_as_is() {
        let detections = vec![Detection::new(10, 10, 0, 1.0)];
        let clusters = cluster_detections(detections, 0.18);
        assert_eq!(clusters, vec![Detection::new(10, 10, 0, 1.0)]);
    }

    #[test]
    fn test_empty_input() {
        assert!(cluster_detections(Vec::new(), 0.18).is_empty());
    }
}
