use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;

use crate::model::{Diagram, is_external_anchor};

use super::types::Layer;

/// Partition the diagram's internal nodes into ordered layers.
///
/// Only edges connecting two canvas nodes take part; boundary anchors carry
/// no layer of their own, and self-edges say nothing about depth. Back-edges
/// found by the depth-first pre-pass are excluded before the breadth-first
/// batching, so every remaining cycle-free node lands at its natural depth.
/// Anything still unreached afterwards falls into one trailing layer.
pub(super) fn assign_layers(diagram: &Diagram) -> Vec<Layer> {
    let internal: Vec<&str> = diagram
        .nodes
        .keys()
        .filter(|id| !is_external_anchor(id))
        .map(|id| id.as_str())
        .collect();

    let mut edges: Vec<(&str, &str)> = Vec::new();
    for connector in &diagram.connectors {
        if connector.from == connector.to {
            continue;
        }
        if is_external_anchor(&connector.from) || is_external_anchor(&connector.to) {
            continue;
        }
        if !diagram.nodes.contains_key(&connector.from) || !diagram.nodes.contains_key(&connector.to)
        {
            continue;
        }
        edges.push((connector.from.as_str(), connector.to.as_str()));
    }

    let forward = forward_edges(&internal, &edges);

    let mut in_degree: IndexMap<&str, usize> = internal.iter().map(|&id| (id, 0)).collect();
    let mut outgoing: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for &(from, to) in &forward {
        outgoing.entry(from).or_default().push(to);
        if let Some(degree) = in_degree.get_mut(to) {
            *degree += 1;
        }
    }

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut placed: HashSet<&str> = HashSet::new();
    let mut layers: Vec<Layer> = Vec::new();

    while !queue.is_empty() {
        let batch = queue.len();
        let mut layer = Layer::default();
        for _ in 0..batch {
            let Some(id) = queue.pop_front() else {
                break;
            };
            layer.ids.push(id.to_string());
            placed.insert(id);
            if let Some(targets) = outgoing.get(id) {
                for &target in targets {
                    if let Some(degree) = in_degree.get_mut(target)
                        && *degree > 0
                    {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push_back(target);
                        }
                    }
                }
            }
        }
        if !layer.is_empty() {
            layers.push(layer);
        }
    }

    // Nodes starved by an unresolved cycle keep rendering: collect them, in
    // original order, into one trailing layer.
    let mut overflow = Layer::default();
    for &id in &internal {
        if !placed.contains(id) {
            overflow.ids.push(id.to_string());
        }
    }
    if !overflow.is_empty() {
        layers.push(overflow);
    }

    layers
}

/// Depth-first sweep in enumeration order; edges closing onto a node still
/// on the stack are back-edges and are dropped from the layering graph.
fn forward_edges<'a>(nodes: &[&'a str], edges: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
    let mut adjacency: IndexMap<&str, Vec<(&'a str, &'a str)>> = IndexMap::new();
    for &(from, to) in edges {
        adjacency.entry(from).or_default().push((from, to));
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut on_stack: HashSet<&str> = HashSet::new();
    let mut forward: Vec<(&'a str, &'a str)> = Vec::new();

    // Explicit stack: each frame is (node, next-edge cursor).
    for &root in nodes {
        if visited.contains(root) {
            continue;
        }
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
        visited.insert(root);
        on_stack.insert(root);
        while let Some((node, cursor)) = stack.last().copied() {
            let next = adjacency.get(node).and_then(|out| out.get(cursor).copied());
            match next {
                Some((from, to)) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.1 += 1;
                    }
                    if on_stack.contains(to) {
                        continue; // back-edge, dropped
                    }
                    forward.push((from, to));
                    if !visited.contains(to) {
                        visited.insert(to);
                        on_stack.insert(to);
                        stack.push((to, 0));
                    }
                }
                None => {
                    on_stack.remove(node);
                    stack.pop();
                }
            }
        }
    }

    forward
}
