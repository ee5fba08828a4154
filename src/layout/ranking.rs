use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Rank assignment for one layout call.
pub(super) struct Ranking {
    pub ranks: HashMap<String, usize>,
    /// Set when the parent-of edges contained a cycle and some in-edges were
    /// ignored to break it.
    pub cyclic: bool,
}

/// Longest-path layering: roots sit at rank 0 and every other node sits one
/// below its deepest parent.
///
/// Nodes are released in a topological order that prefers declaration order.
/// If the ready queue drains while nodes remain, the edges form a cycle; the
/// earliest remaining node in declaration order is then forced out and its
/// unprocessed in-edges are treated as back-edges. This only guarantees
/// termination, not a meaningful layering of cyclic input.
pub(super) fn compute_ranks(node_ids: &[String], edges: &[(String, String)]) -> Ranking {
    let order_key: HashMap<&str, usize> = node_ids
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.as_str(), idx))
        .collect();
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut indeg: HashMap<&str, usize> = node_ids.iter().map(|id| (id.as_str(), 0)).collect();

    for (from, to) in edges {
        if !order_key.contains_key(from.as_str()) || !order_key.contains_key(to.as_str()) {
            continue;
        }
        adj.entry(from.as_str()).or_default().push(to.as_str());
        if let Some(deg) = indeg.get_mut(to.as_str()) {
            *deg += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<(usize, &str)>> = BinaryHeap::new();
    for id in node_ids {
        if indeg.get(id.as_str()).copied().unwrap_or(0) == 0 {
            ready.push(Reverse((order_key[id.as_str()], id.as_str())));
        }
    }

    let mut order: Vec<&str> = Vec::with_capacity(node_ids.len());
    let mut processed: HashSet<&str> = HashSet::new();
    let mut cyclic = false;
    loop {
        while let Some(Reverse((_key, id))) = ready.pop() {
            if !processed.insert(id) {
                continue;
            }
            order.push(id);
            if let Some(nexts) = adj.get(id) {
                for next in nexts {
                    if processed.contains(next) {
                        continue;
                    }
                    if let Some(deg) = indeg.get_mut(next) {
                        *deg = deg.saturating_sub(1);
                        if *deg == 0 {
                            ready.push(Reverse((order_key[next], *next)));
                        }
                    }
                }
            }
        }

        if processed.len() >= node_ids.len() {
            break;
        }

        // Cycle: force the earliest unprocessed node in declaration order.
        let forced = node_ids
            .iter()
            .map(String::as_str)
            .find(|id| !processed.contains(id));
        match forced {
            Some(id) => {
                cyclic = true;
                ready.push(Reverse((order_key[id], id)));
            }
            None => break,
        }
    }

    let order_index: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(idx, id)| (*id, idx))
        .collect();

    let mut ranks: HashMap<String, usize> = HashMap::with_capacity(order.len());
    for node in &order {
        let rank = *ranks.entry(node.to_string()).or_insert(0);
        let Some(nexts) = adj.get(node) else {
            continue;
        };
        let from_idx = order_index[node];
        for next in nexts {
            // Edges pointing backwards in the processing order are cycle edges.
            if order_index.get(next).is_none_or(|to_idx| *to_idx <= from_idx) {
                continue;
            }
            let entry = ranks.entry(next.to_string()).or_insert(0);
            *entry = (*entry).max(rank + 1);
        }
    }

    Ranking { ranks, cyclic }
}

/// Reorders each rank bucket to reduce crossings using the median heuristic,
/// sweeping down then up `passes` times. The best ordering seen (fewest
/// crossings between adjacent ranks) is left in `rank_nodes`.
///
/// `node_ids` is the deduplicated declaration order; every id in
/// `rank_nodes` must appear in it.
pub(super) fn order_rank_nodes(
    rank_nodes: &mut [Vec<String>],
    edges: &[(String, String)],
    node_ids: &[String],
    passes: usize,
) {
    if rank_nodes.len() <= 1 {
        return;
    }
    let mut layers = Layers::new(rank_nodes, edges, node_ids);
    let mut best = layers.buckets.clone();
    let mut best_crossings = layers.crossings();

    for _ in 0..passes.max(1) {
        if best_crossings == 0 {
            break;
        }
        layers.sweep(Sweep::Down);
        layers.sweep(Sweep::Up);
        let crossings = layers.crossings();
        if crossings < best_crossings {
            best_crossings = crossings;
            best.clone_from(&layers.buckets);
        }
    }

    for (bucket, indices) in rank_nodes.iter_mut().zip(&best) {
        *bucket = indices.iter().map(|&idx| node_ids[idx].clone()).collect();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    /// Each rank is sorted against its parents, top to bottom.
    Down,
    /// Each rank is sorted against its children, bottom to top.
    Up,
}

/// Working copy of the rank buckets with nodes addressed by declaration
/// index.
struct Layers {
    buckets: Vec<Vec<usize>>,
    parents: Vec<Vec<usize>>,
    children: Vec<Vec<usize>>,
    rank: Vec<usize>,
    /// Position of each node inside its own bucket.
    slot: Vec<usize>,
}

impl Layers {
    fn new(rank_nodes: &[Vec<String>], edges: &[(String, String)], node_ids: &[String]) -> Self {
        let index: HashMap<&str, usize> = node_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.as_str(), idx))
            .collect();
        let count = node_ids.len();
        let mut layers = Layers {
            buckets: Vec::with_capacity(rank_nodes.len()),
            parents: vec![Vec::new(); count],
            children: vec![Vec::new(); count],
            rank: vec![0; count],
            slot: vec![0; count],
        };

        for (rank, bucket) in rank_nodes.iter().enumerate() {
            let members: Vec<usize> = bucket
                .iter()
                .filter_map(|id| index.get(id.as_str()).copied())
                .collect();
            for (slot, &node) in members.iter().enumerate() {
                layers.rank[node] = rank;
                layers.slot[node] = slot;
            }
            layers.buckets.push(members);
        }
        for (from, to) in edges {
            if let (Some(&from), Some(&to)) = (index.get(from.as_str()), index.get(to.as_str())) {
                layers.children[from].push(to);
                layers.parents[to].push(from);
            }
        }
        layers
    }

    fn sweep(&mut self, direction: Sweep) {
        let last = self.buckets.len() - 1;
        let ranks: Vec<usize> = match direction {
            Sweep::Down => (1..=last).collect(),
            Sweep::Up => (0..last).rev().collect(),
        };
        for rank in ranks {
            if self.buckets[rank].len() > 1 {
                self.reorder(rank, direction);
            }
        }
    }

    /// Stable sort by median neighbour slot; ties keep the current order.
    fn reorder(&mut self, rank: usize, direction: Sweep) {
        let mut keyed: Vec<(f32, usize)> = self.buckets[rank]
            .iter()
            .map(|&node| {
                let neighbours = match direction {
                    Sweep::Down => &self.parents[node],
                    Sweep::Up => &self.children[node],
                };
                (self.median_slot(node, neighbours), node)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

        let bucket: Vec<usize> = keyed.into_iter().map(|(_, node)| node).collect();
        for (slot, &node) in bucket.iter().enumerate() {
            self.slot[node] = slot;
        }
        self.buckets[rank] = bucket;
    }

    /// Median slot of `neighbours`; a node without any keeps its own slot.
    fn median_slot(&self, node: usize, neighbours: &[usize]) -> f32 {
        let mut slots: Vec<usize> = neighbours.iter().map(|&other| self.slot[other]).collect();
        if slots.is_empty() {
            return self.slot[node] as f32;
        }
        slots.sort_unstable();
        let mid = slots.len() / 2;
        if slots.len() % 2 == 1 {
            slots[mid] as f32
        } else {
            (slots[mid - 1] + slots[mid]) as f32 / 2.0
        }
    }

    fn crossings(&self) -> usize {
        let mut by_layer: HashMap<usize, Vec<(usize, usize)>> = HashMap::new();
        for (node, kids) in self.children.iter().enumerate() {
            for &kid in kids {
                if self.rank[kid] == self.rank[node] + 1 {
                    by_layer
                        .entry(self.rank[node])
                        .or_default()
                        .push((self.slot[node], self.slot[kid]));
                }
            }
        }
        by_layer.values().map(|segments| crossing_pairs(segments)).sum()
    }
}

/// Crossings between edges that join adjacent ranks. Longer edges are not
/// counted; parent-of edges in a family tree almost always span one rank.
pub(super) fn count_crossings(
    rank_nodes: &[Vec<String>],
    edges: &[(String, String)],
    ranks: &HashMap<String, usize>,
) -> usize {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for bucket in rank_nodes {
        for (idx, id) in bucket.iter().enumerate() {
            positions.insert(id.as_str(), idx);
        }
    }

    let mut by_layer: HashMap<usize, Vec<(usize, usize)>> = HashMap::new();
    for (from, to) in edges {
        let (Some(from_rank), Some(to_rank)) = (ranks.get(from), ranks.get(to)) else {
            continue;
        };
        if *to_rank != from_rank + 1 {
            continue;
        }
        let (Some(upper), Some(lower)) = (positions.get(from.as_str()), positions.get(to.as_str()))
        else {
            continue;
        };
        by_layer.entry(*from_rank).or_default().push((*upper, *lower));
    }
    by_layer.values().map(|segments| crossing_pairs(segments)).sum()
}

/// Pairs of `(upper, lower)` segments whose ends are in opposite order.
fn crossing_pairs(segments: &[(usize, usize)]) -> usize {
    segments
        .iter()
        .enumerate()
        .map(|(i, a)| {
            segments[i + 1..]
                .iter()
                .filter(|b| (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1))
                .count()
        })
        .sum()
}
