//! Topological ordering of a [`DependencyGraph`].

use std::collections::{HashMap, VecDeque};

use tracing::warn;

use crate::error::{PulseError, PulseResult};
use crate::graph::{DependencyGraph, EdgeKind};

struct Link {
    to: usize,
    kind: EdgeKind,
    live: bool,
}

/// Orders the graph's candidates so every dependency precedes its dependents.
///
/// Kahn's algorithm over candidate indices with a FIFO ready queue.  The queue
/// starts with the dependency-free modules in discovery order; a module that
/// becomes ready joins the back, behind everything already waiting.  The
/// result is stable for a given discovery order.
///
/// If the walk stalls on a cycle that contains an optional edge, that edge is
/// dropped with a warning and the walk resumes; optional dependencies never
/// make a run fail.  A stall with only required edges left is a cycle error.
///
/// # Errors
///
/// [`PulseError::CycleDetected`] listing every candidate that could not be
/// placed, in discovery order.
pub fn topological_order(graph: &DependencyGraph) -> PulseResult<Vec<String>> {
    let nodes = graph.candidates();
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let mut links: Vec<Vec<Link>> = nodes.iter().map(|_| Vec::new()).collect();
    let mut in_degree = vec![0usize; nodes.len()];
    for edge in graph.edges() {
        let (Some(&from), Some(&to)) = (
            index.get(edge.dependency.as_str()),
            index.get(edge.dependent.as_str()),
        ) else {
            continue;
        };
        links[from].push(Link {
            to,
            kind: edge.kind,
            live: true,
        });
        in_degree[to] += 1;
    }

    let mut ready: VecDeque<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut placed = vec![false; nodes.len()];
    let mut order = Vec::with_capacity(nodes.len());

    loop {
        while let Some(i) = ready.pop_front() {
            placed[i] = true;
            order.push(nodes[i].clone());
            for link in links[i].iter().filter(|l| l.live) {
                in_degree[link.to] -= 1;
                if in_degree[link.to] == 0 {
                    ready.push_back(link.to);
                }
            }
        }

        if order.len() == nodes.len() {
            return Ok(order);
        }

        let Some((from, slot)) = optional_link_on_cycle(&links, &placed) else {
            let remaining = (0..nodes.len())
                .filter(|&i| !placed[i])
                .map(|i| nodes[i].clone())
                .collect();
            return Err(PulseError::CycleDetected { remaining });
        };

        let to = links[from][slot].to;
        warn!(
            module = %nodes[to],
            dependency = %nodes[from],
            "Optional dependency is part of a cycle; ordering constraint dropped"
        );
        links[from][slot].live = false;
        in_degree[to] -= 1;
        if in_degree[to] == 0 {
            ready.push_back(to);
        }
    }
}

/// First live optional link between unplaced nodes that closes a cycle.
fn optional_link_on_cycle(links: &[Vec<Link>], placed: &[bool]) -> Option<(usize, usize)> {
    for (from, outgoing) in links.iter().enumerate() {
        if placed[from] {
            continue;
        }
        for (slot, link) in outgoing.iter().enumerate() {
            if link.live
                && link.kind == EdgeKind::Optional
                && !placed[link.to]
                && reaches(links, placed, link.to, from)
            {
                return Some((from, slot));
            }
        }
    }
    None
}

/// Whether `target` is reachable from `start` over live links among unplaced nodes.
fn reaches(links: &[Vec<Link>], placed: &[bool], start: usize, target: usize) -> bool {
    let mut visited = vec![false; links.len()];
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        if node == target {
            return true;
        }
        if std::mem::replace(&mut visited[node], true) {
            continue;
        }
        stack.extend(
            links[node]
                .iter()
                .filter(|l| l.live && !placed[l.to])
                .map(|l| l.to),
        );
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ModuleDescriptor;
    use crate::graph::GraphBuilder;

    fn order_of(descriptors: &[ModuleDescriptor]) -> PulseResult<Vec<String>> {
        topological_order(&GraphBuilder::new(descriptors).build()?)
    }

    #[test]
    fn dependencies_come_first() {
        let d = vec![
            ModuleDescriptor::new("C").requires(["B"]).optional_any_of(["A", "Z"]),
            ModuleDescriptor::new("B").requires(["A"]),
            ModuleDescriptor::new("A"),
        ];
        assert_eq!(order_of(&d).unwrap(), ["A", "B", "C"]);
    }

    #[test]
    fn ready_modules_are_placed_first_in_first_out() {
        let d = vec![
            ModuleDescriptor::new("zeta"),
            ModuleDescriptor::new("alpha"),
            ModuleDescriptor::new("mid").requires(["zeta"]),
            ModuleDescriptor::new("beta"),
        ];
        // mid becomes ready after zeta and queues behind alpha and beta.
        assert_eq!(order_of(&d).unwrap(), ["zeta", "alpha", "beta", "mid"]);
    }

    #[test]
    fn diamond() {
        let d = vec![
            ModuleDescriptor::new("top").requires(["left", "right"]),
            ModuleDescriptor::new("left").requires(["base"]),
            ModuleDescriptor::new("right").requires(["base"]),
            ModuleDescriptor::new("base"),
        ];
        assert_eq!(order_of(&d).unwrap(), ["base", "left", "right", "top"]);
    }

    #[test]
    fn required_cycle_is_an_error() {
        let d = vec![
            ModuleDescriptor::new("X").requires(["Y"]),
            ModuleDescriptor::new("Y").requires(["X"]),
            ModuleDescriptor::new("free"),
        ];
        match order_of(&d) {
            Err(PulseError::CycleDetected { remaining }) => assert_eq!(remaining, ["X", "Y"]),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn required_self_dependency_is_a_cycle() {
        let d = vec![ModuleDescriptor::new("ouroboros").requires(["ouroboros"])];
        assert!(matches!(
            order_of(&d),
            Err(PulseError::CycleDetected { .. })
        ));
    }

    #[test]
    fn cycle_remainder_includes_blocked_dependents() {
        let d = vec![
            ModuleDescriptor::new("X").requires(["Y"]),
            ModuleDescriptor::new("Y").requires(["X"]),
            ModuleDescriptor::new("downstream").requires(["X"]),
        ];
        match order_of(&d) {
            Err(PulseError::CycleDetected { remaining }) => {
                assert_eq!(remaining, ["X", "Y", "downstream"])
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn optional_edge_in_cycle_is_dropped() {
        let d = vec![
            ModuleDescriptor::new("P").requires(["Q"]),
            ModuleDescriptor::new("Q").optional(["P"]),
            ModuleDescriptor::new("R").optional(["P"]),
        ];
        // Q's optional edge on P closes the loop and is dropped; R keeps its
        // ordering after P.
        assert_eq!(order_of(&d).unwrap(), ["Q", "P", "R"]);
    }

    #[test]
    fn empty_graph() {
        assert!(order_of(&[]).unwrap().is_empty());
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        /// One generated module: bit masks over the modules before it.
        #[derive(Debug, Clone)]
        struct Shape {
            requires: u16,
            optional: u16,
            any_of: u16,
            ghost_required: bool,
            disabled: bool,
        }

        fn shape() -> impl Strategy<Value = Shape> {
            (
                any::<u16>(),
                any::<u16>(),
                any::<u16>(),
                prop::bool::weighted(0.1),
                prop::bool::weighted(0.15),
            )
                .prop_map(|(requires, optional, any_of, ghost_required, disabled)| Shape {
                    requires,
                    optional,
                    any_of,
                    ghost_required,
                    disabled,
                })
        }

        /// Builds an acyclic module set: module `i` only names modules `j < i`
        /// or names that are never discovered.
        fn modules(shapes: &[Shape], reversed: bool) -> (Vec<ModuleDescriptor>, Vec<String>) {
            let name = |i: usize| format!("m{i}");
            let earlier = |mask: u16, i: usize| {
                (0..i).filter(move |j| mask & (1 << j) != 0).map(name)
            };

            let mut descriptors = Vec::new();
            let mut disabled = Vec::new();
            for (i, shape) in shapes.iter().enumerate() {
                let mut desc = ModuleDescriptor::new(name(i))
                    .requires(earlier(shape.requires, i))
                    .optional(earlier(shape.optional, i))
                    .optional(["ghost-optional"]);
                if shape.any_of != 0 {
                    desc = desc.optional_any_of(
                        earlier(shape.any_of, i).chain(["ghost-alternative".to_string()]),
                    );
                }
                if shape.ghost_required {
                    desc = desc.requires(["ghost-required"]);
                }
                if shape.disabled {
                    disabled.push(name(i));
                }
                descriptors.push(desc);
            }
            if reversed {
                descriptors.reverse();
            }
            (descriptors, disabled)
        }

        fn build_and_sort(
            descriptors: &[ModuleDescriptor],
            disabled: &[String],
        ) -> (DependencyGraph, Vec<String>) {
            let graph = GraphBuilder::new(descriptors)
                .disabled(disabled.iter().cloned())
                .build()
                .unwrap();
            let order = topological_order(&graph).unwrap();
            (graph, order)
        }

        proptest! {
            #[test]
            fn every_edge_is_respected_and_order_is_reproducible(
                shapes in prop::collection::vec(shape(), 0..16),
                reversed in any::<bool>(),
            ) {
                let (descriptors, disabled) = modules(&shapes, reversed);
                let (graph, order) = build_and_sort(&descriptors, &disabled);

                prop_assert_eq!(order.len(), graph.candidates().len());
                let position: HashMap<&str, usize> = order
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (name.as_str(), i))
                    .collect();
                for edge in graph.edges() {
                    let dependency = position[edge.dependency.as_str()];
                    let dependent = position[edge.dependent.as_str()];
                    prop_assert!(
                        dependency < dependent,
                        "{} placed after its dependent {}",
                        edge.dependency,
                        edge.dependent
                    );
                }

                let (_, again) = build_and_sort(&descriptors, &disabled);
                prop_assert_eq!(order, again);
            }
        }
    }
}
