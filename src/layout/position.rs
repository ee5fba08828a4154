use std::collections::HashMap;

use crate::config::LayoutConfig;

/// Horizontal box centres for every ranked node.
///
/// Children are pulled toward the mean centre of their parents and roots
/// toward the mean centre of their children. Each placement keeps the rank's
/// order and a centre-to-centre distance of at least
/// `node_width + node_spacing`.
pub(super) fn assign_centers(
    rank_nodes: &[Vec<String>],
    edges: &[(String, String)],
    ranks: &HashMap<String, usize>,
    config: &LayoutConfig,
) -> HashMap<String, f32> {
    let sep = config.node_width + config.node_spacing;
    let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for (from, to) in edges {
        let (Some(from_rank), Some(to_rank)) = (ranks.get(from), ranks.get(to)) else {
            continue;
        };
        // Only downward edges steer placement; cycle edges are ignored.
        if to_rank <= from_rank {
            continue;
        }
        parents.entry(to.as_str()).or_default().push(from.as_str());
        children.entry(from.as_str()).or_default().push(to.as_str());
    }

    let mut centers: HashMap<String, f32> = HashMap::new();
    for bucket in rank_nodes {
        let offset = (bucket.len().saturating_sub(1)) as f32 * sep / 2.0;
        for (idx, id) in bucket.iter().enumerate() {
            centers.insert(id.clone(), idx as f32 * sep - offset);
        }
    }

    let pull = |bucket: &[String],
                neighbors: &HashMap<&str, Vec<&str>>,
                only_roots: bool,
                centers: &mut HashMap<String, f32>| {
        let desired: Vec<f32> = bucket
            .iter()
            .map(|id| {
                let current = centers.get(id).copied().unwrap_or(0.0);
                if only_roots && parents.contains_key(id.as_str()) {
                    return current;
                }
                neighbors
                    .get(id.as_str())
                    .and_then(|list| mean_center(list, centers))
                    .unwrap_or(current)
            })
            .collect();
        for (id, x) in bucket.iter().zip(separate(&desired, sep)) {
            centers.insert(id.clone(), x);
        }
    };

    for bucket in rank_nodes.iter().skip(1) {
        pull(bucket, &parents, false, &mut centers);
    }
    for bucket in rank_nodes.iter().rev().skip(1) {
        pull(bucket, &children, true, &mut centers);
    }
    for bucket in rank_nodes.iter().skip(1) {
        pull(bucket, &parents, false, &mut centers);
    }

    centers
}

fn mean_center(ids: &[&str], centers: &HashMap<String, f32>) -> Option<f32> {
    let values: Vec<f32> = ids
        .iter()
        .filter_map(|id| centers.get(*id).copied())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f32>() / values.len() as f32)
    }
}

/// Closest ordered placement (least squares) to `desired` in which
/// neighbours are at least `sep` apart.
///
/// Subtracting `i * sep` turns the separation constraint into a
/// non-decreasing one, solved by pooling adjacent violators.
pub(super) fn separate(desired: &[f32], sep: f32) -> Vec<f32> {
    // (sum, count) per pooled block.
    let mut blocks: Vec<(f32, usize)> = Vec::with_capacity(desired.len());
    for (idx, value) in desired.iter().enumerate() {
        blocks.push((value - idx as f32 * sep, 1));
        while blocks.len() >= 2 {
            let (last_sum, last_count) = blocks[blocks.len() - 1];
            let (prev_sum, prev_count) = blocks[blocks.len() - 2];
            if prev_sum / prev_count as f32 <= last_sum / last_count as f32 {
                break;
            }
            blocks.pop();
            if let Some(prev) = blocks.last_mut() {
                *prev = (prev_sum + last_sum, prev_count + last_count);
            }
        }
    }

    let mut out = Vec::with_capacity(desired.len());
    for (sum, count) in blocks {
        let level = sum / count as f32;
        for _ in 0..count {
            out.push(level + out.len() as f32 * sep);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separate_keeps_free_nodes_where_they_want_to_be() {
        let placed = separate(&[0.0, 500.0, 1000.0], 280.0);
        assert_eq!(placed, vec![0.0, 500.0, 1000.0]);
    }

    #[test]
    fn separate_spreads_colliding_nodes_around_their_target() {
        let placed = separate(&[100.0, 100.0], 280.0);
        assert_eq!(placed, vec![-40.0, 240.0]);
        for pair in separate(&[0.0, 10.0, 5.0, 400.0], 280.0).windows(2) {
            assert!(pair[1] - pair[0] >= 280.0 - 1e-3);
        }
    }

    #[test]
    fn only_child_sits_under_its_parents() {
        let rank_nodes = vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string()],
        ];
        let edges = vec![
            ("a".to_string(), "c".to_string()),
            ("b".to_string(), "c".to_string()),
        ];
        let ranks: HashMap<String, usize> = [("a", 0), ("b", 0), ("c", 1)]
            .into_iter()
            .map(|(id, rank)| (id.to_string(), rank))
            .collect();
        let centers = assign_centers(&rank_nodes, &edges, &ranks, &LayoutConfig::default());
        let mid = (centers["a"] + centers["b"]) / 2.0;
        assert!((centers["c"] - mid).abs() < 1e-3);
        assert!(centers["b"] - centers["a"] >= 280.0 - 1e-3);
    }
}
