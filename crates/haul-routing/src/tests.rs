//! Unit tests for the routing engine and the request board.
//!
//! Fixtures share one layout: a straight road along `z = 0` with single-cell
//! buildings at `z = 1`, so every building's perimeter touches the road at
//! `(x, 0)`.

mod helpers {
    pub use haul_core::{CellCoord, Footprint, LogisticsConfig, ResourceKind, Tick};
    pub use haul_graph::RoadGraph;
    pub use haul_world::{Endpoint, EndpointRegistry, OutputStock};

    pub use crate::{RequestBoard, RouteMode, RoutingEngine};

    pub use haul_core::EndpointId;

    pub fn c(x: i32, z: i32) -> CellCoord {
        CellCoord::new(x, z)
    }

    /// Straight road along `z = 0` covering the given x range.
    pub fn road_row(graph: &mut RoadGraph, xs: std::ops::RangeInclusive<i32>) {
        for x in xs {
            graph.add_segment(c(x, 0));
        }
    }

    /// Producer of `kind` at `(x, 1)` with `amount` units in its pile.
    pub fn producer_at(
        registry: &mut EndpointRegistry,
        x: i32,
        kind: ResourceKind,
        amount: u32,
    ) -> EndpointId {
        registry.insert(
            Endpoint::new(Footprint::single(c(x, 1)))
                .with_output(OutputStock::with_amount(kind, 50, amount)),
        )
    }

    /// Consumer with a single `kind` slot at `(x, 1)`.
    pub fn consumer_at(
        registry: &mut EndpointRegistry,
        x: i32,
        kind: ResourceKind,
        capacity: u32,
    ) -> EndpointId {
        registry.insert(Endpoint::consumer(
            Footprint::single(c(x, 1)),
            &[(kind, capacity)],
        ))
    }

    /// Depot at `(x, 1)`.
    pub fn depot_at(registry: &mut EndpointRegistry, x: i32) -> EndpointId {
        registry.insert(Endpoint::depot(Footprint::single(c(x, 1)), 100))
    }
}

mod engine {
    use super::helpers::*;
    use haul_core::ResourceKind::Wood;

    #[test]
    fn balanced_pairing_is_one_to_one() {
        let mut registry = EndpointRegistry::new();
        let mut graph = RoadGraph::new();
        let config = LogisticsConfig::default();
        road_row(&mut graph, 0..=10);

        let p1 = producer_at(&mut registry, 0, Wood, 10);
        let p2 = producer_at(&mut registry, 2, Wood, 10);
        let c1 = consumer_at(&mut registry, 6, Wood, 20);
        let c2 = consumer_at(&mut registry, 8, Wood, 20);

        let mut engine = RoutingEngine::new();
        engine.force_refresh(p1, &registry, &graph, &config).unwrap();
        engine.force_refresh(p2, &registry, &graph, &config).unwrap();

        let d1 = engine.output_destination(p1).unwrap();
        let d2 = engine.output_destination(p2).unwrap();
        assert_ne!(d1, d2, "two producers must not share one consumer");
        assert_eq!(engine.delivery_load(c1), 1);
        assert_eq!(engine.delivery_load(c2), 1);
    }

    #[test]
    fn fill_ratio_breaks_load_ties() {
        let mut registry = EndpointRegistry::new();
        let mut graph = RoadGraph::new();
        let config = LogisticsConfig::default();
        road_row(&mut graph, 0..=20);

        let p = producer_at(&mut registry, 10, Wood, 10);
        // Equidistant consumers; the left one is half full.
        let half = consumer_at(&mut registry, 5, Wood, 20);
        let empty = consumer_at(&mut registry, 15, Wood, 20);
        registry.get_mut(half).unwrap().deposit(Wood, 10);

        let mut engine = RoutingEngine::new();
        engine.force_refresh(p, &registry, &graph, &config).unwrap();
        assert_eq!(engine.output_destination(p), Some(empty));
    }

    #[test]
    fn distance_breaks_remaining_ties() {
        let mut registry = EndpointRegistry::new();
        let mut graph = RoadGraph::new();
        let config = LogisticsConfig::default();
        road_row(&mut graph, 0..=10);

        let p = producer_at(&mut registry, 0, Wood, 10);
        let near = consumer_at(&mut registry, 4, Wood, 20);
        let _far = consumer_at(&mut registry, 9, Wood, 20);

        let mut engine = RoutingEngine::new();
        engine.force_refresh(p, &registry, &graph, &config).unwrap();
        assert_eq!(engine.output_destination(p), Some(near));
    }

    #[test]
    fn falls_back_to_depot_when_no_consumer() {
        let mut registry = EndpointRegistry::new();
        let mut graph = RoadGraph::new();
        let config = LogisticsConfig::default();
        road_row(&mut graph, 0..=10);

        let p = producer_at(&mut registry, 0, Wood, 10);
        let depot = depot_at(&mut registry, 8);

        let mut engine = RoutingEngine::new();
        engine.force_refresh(p, &registry, &graph, &config).unwrap();
        assert_eq!(engine.output_destination(p), Some(depot));
    }

    #[test]
    fn unreachable_consumer_skipped_in_favor_of_depot() {
        let mut registry = EndpointRegistry::new();
        let mut graph = RoadGraph::new();
        let config = LogisticsConfig::default();
        road_row(&mut graph, 0..=10);
        // Disconnected island far away.
        road_row(&mut graph, 100..=102);

        let p = producer_at(&mut registry, 0, Wood, 10);
        let _island = consumer_at(&mut registry, 101, Wood, 20);
        let depot = depot_at(&mut registry, 8);

        let mut engine = RoutingEngine::new();
        engine.force_refresh(p, &registry, &graph, &config).unwrap();
        assert_eq!(engine.output_destination(p), Some(depot));
    }

    #[test]
    fn mode_follows_producer_consumer_balance() {
        let mut registry = EndpointRegistry::new();
        producer_at(&mut registry, 0, Wood, 0);
        consumer_at(&mut registry, 5, Wood, 20);
        assert_eq!(RoutingEngine::mode_for(&registry, Wood), RouteMode::Exclusive);

        consumer_at(&mut registry, 8, Wood, 20);
        assert_eq!(
            RoutingEngine::mode_for(&registry, Wood),
            RouteMode::Multiplexed
        );
    }

    #[test]
    fn multiplexed_route_rotates_after_batch() {
        let mut registry = EndpointRegistry::new();
        let mut graph = RoadGraph::new();
        let config = LogisticsConfig::default();
        road_row(&mut graph, 0..=12);

        let p = producer_at(&mut registry, 0, Wood, 50);
        let c1 = consumer_at(&mut registry, 5, Wood, 20);
        let c2 = consumer_at(&mut registry, 10, Wood, 20);

        let mut engine = RoutingEngine::new();
        engine.force_refresh(p, &registry, &graph, &config).unwrap();
        assert_eq!(engine.output_destination(p), Some(c1));

        for _ in 0..config.round_robin_batch {
            engine.notify_delivery_completed(p, &registry, &graph, &config);
        }
        assert_eq!(engine.output_destination(p), Some(c2), "batch complete, rotate");
    }

    #[test]
    fn rotation_skips_nearly_full_consumers() {
        let mut registry = EndpointRegistry::new();
        let mut graph = RoadGraph::new();
        let config = LogisticsConfig::default();
        road_row(&mut graph, 0..=12);

        let p = producer_at(&mut registry, 0, Wood, 50);
        let c1 = consumer_at(&mut registry, 5, Wood, 20);
        let c2 = consumer_at(&mut registry, 10, Wood, 20);
        // c2 at 95% fill: excluded from the rotation ring.
        registry.get_mut(c2).unwrap().deposit(Wood, 19);

        let mut engine = RoutingEngine::new();
        engine.force_refresh(p, &registry, &graph, &config).unwrap();
        assert_eq!(engine.output_destination(p), Some(c1));

        for _ in 0..config.round_robin_batch {
            engine.notify_delivery_completed(p, &registry, &graph, &config);
        }
        assert_eq!(engine.output_destination(p), Some(c1), "only c1 remains in the ring");
    }

    #[test]
    fn road_removal_invalidates_route() {
        let mut registry = EndpointRegistry::new();
        let mut graph = RoadGraph::new();
        let config = LogisticsConfig::default();
        road_row(&mut graph, 0..=10);

        let p = producer_at(&mut registry, 0, Wood, 10);
        let consumer = consumer_at(&mut registry, 10, Wood, 20);

        let mut engine = RoutingEngine::new();
        graph.drain_events();
        engine.force_refresh(p, &registry, &graph, &config).unwrap();
        assert_eq!(engine.output_destination(p), Some(consumer));

        // Sever the road between them.
        graph.remove_segment(c(5, 0));
        engine.apply_events(&graph.drain_events());
        engine.tick(Tick(1), &registry, &graph, &config);

        assert_eq!(engine.output_destination(p), None);
        assert_eq!(engine.delivery_load(consumer), 0);
    }

    #[test]
    fn endpoint_removal_clears_references() {
        let mut registry = EndpointRegistry::new();
        let mut graph = RoadGraph::new();
        let config = LogisticsConfig::default();
        road_row(&mut graph, 0..=10);

        let p = producer_at(&mut registry, 0, Wood, 10);
        let consumer = consumer_at(&mut registry, 8, Wood, 20);

        let mut engine = RoutingEngine::new();
        engine.force_refresh(p, &registry, &graph, &config).unwrap();
        assert_eq!(engine.output_destination(p), Some(consumer));

        registry.remove(consumer);
        engine.on_endpoint_removed(consumer);

        assert_eq!(engine.output_destination(p), None);
        assert_eq!(engine.delivery_load(consumer), 0);
    }

    #[test]
    fn retry_cadence_is_staggered_per_endpoint() {
        let mut registry = EndpointRegistry::new();
        let mut graph = RoadGraph::new();
        let config = LogisticsConfig::default();
        road_row(&mut graph, 0..=10);

        let p = producer_at(&mut registry, 0, Wood, 10);
        let _consumer = consumer_at(&mut registry, 8, Wood, 20);

        let phase = haul_core::stagger(config.seed, p.0, config.route_retry_interval);
        let off_phase = (phase + 1) % config.route_retry_interval;

        let mut engine = RoutingEngine::new();
        engine.tick(Tick(off_phase), &registry, &graph, &config);
        assert_eq!(engine.output_destination(p), None, "not yet due");

        engine.tick(Tick(phase), &registry, &graph, &config);
        assert!(engine.output_destination(p).is_some(), "due tick configures");
    }

    #[test]
    fn consumer_gets_input_source() {
        let mut registry = EndpointRegistry::new();
        let mut graph = RoadGraph::new();
        let config = LogisticsConfig::default();
        road_row(&mut graph, 0..=10);

        let p = producer_at(&mut registry, 0, Wood, 10);
        let consumer = consumer_at(&mut registry, 8, Wood, 20);

        let mut engine = RoutingEngine::new();
        engine
            .force_refresh(consumer, &registry, &graph, &config)
            .unwrap();
        assert_eq!(engine.input_source(consumer), Some(p));
    }

    #[test]
    fn force_refresh_unknown_endpoint_errors() {
        let registry = EndpointRegistry::new();
        let graph = RoadGraph::new();
        let config = LogisticsConfig::default();

        let mut engine = RoutingEngine::new();
        assert!(engine
            .force_refresh(EndpointId(7), &registry, &graph, &config)
            .is_err());
    }
}

mod board {
    use super::helpers::*;
    use haul_core::ResourceKind::{Stone, Wood};

    #[test]
    fn registers_below_threshold_and_clears_with_hysteresis() {
        let mut registry = EndpointRegistry::new();
        let mut graph = RoadGraph::new();
        let config = LogisticsConfig::default();
        road_row(&mut graph, 0..=10);

        let consumer = consumer_at(&mut registry, 5, Wood, 100);
        let mut board = RequestBoard::new();

        board.sync(&registry, &graph, &config);
        assert!(board.get(consumer, Wood).is_some(), "empty slot registers");

        // Into the hysteresis band: above register, below clear.
        registry.get_mut(consumer).unwrap().deposit(Wood, 50);
        board.sync(&registry, &graph, &config);
        assert!(board.get(consumer, Wood).is_some(), "stays within the band");

        // Past the clear threshold.
        registry.get_mut(consumer).unwrap().deposit(Wood, 35);
        board.sync(&registry, &graph, &config);
        assert!(board.get(consumer, Wood).is_none(), "withdrawn at 85%");
    }

    #[test]
    fn does_not_register_inside_the_band() {
        let mut registry = EndpointRegistry::new();
        let mut graph = RoadGraph::new();
        let config = LogisticsConfig::default();
        road_row(&mut graph, 0..=10);

        let consumer = consumer_at(&mut registry, 5, Wood, 100);
        registry.get_mut(consumer).unwrap().deposit(Wood, 50);

        let mut board = RequestBoard::new();
        board.sync(&registry, &graph, &config);
        assert!(board.is_empty(), "50% fill never registers");
    }

    #[test]
    fn priority_tracks_shortage_severity() {
        let mut registry = EndpointRegistry::new();
        let mut graph = RoadGraph::new();
        let config = LogisticsConfig::default();
        road_row(&mut graph, 0..=10);

        let starving = consumer_at(&mut registry, 3, Wood, 100);
        let low = consumer_at(&mut registry, 7, Wood, 100);
        registry.get_mut(low).unwrap().deposit(Wood, 24);

        let mut board = RequestBoard::new();
        board.sync(&registry, &graph, &config);

        assert_eq!(board.get(starving, Wood).unwrap().priority, 5);
        assert!(board.get(low, Wood).unwrap().priority <= 2);
    }

    #[test]
    fn best_request_prefers_priority_over_distance() {
        let mut registry = EndpointRegistry::new();
        let mut graph = RoadGraph::new();
        let config = LogisticsConfig::default();
        road_row(&mut graph, 0..=20);

        // Near requester only mildly low; far requester starving.
        let near = consumer_at(&mut registry, 3, Wood, 100);
        registry.get_mut(near).unwrap().deposit(Wood, 20);
        let far = consumer_at(&mut registry, 15, Wood, 100);

        let mut board = RequestBoard::new();
        board.sync(&registry, &graph, &config);

        let from = vec![c(0, 0)];
        let best = board
            .best_request(&graph, &from, Wood, config.board_search_radius)
            .unwrap();
        assert_eq!(best.requester, far);
    }

    #[test]
    fn best_request_filters_kind_and_reachability() {
        let mut registry = EndpointRegistry::new();
        let mut graph = RoadGraph::new();
        let config = LogisticsConfig::default();
        road_row(&mut graph, 0..=10);

        let wood = consumer_at(&mut registry, 5, Wood, 100);
        let _stone = consumer_at(&mut registry, 3, Stone, 100);
        // Off the network entirely; stays on the board but never matches.
        let _stranded = consumer_at(&mut registry, 40, Wood, 100);

        let mut board = RequestBoard::new();
        board.sync(&registry, &graph, &config);
        assert_eq!(board.len(), 3);

        let from = vec![c(0, 0)];
        let best = board
            .best_request(&graph, &from, Wood, config.board_search_radius)
            .unwrap();
        assert_eq!(best.requester, wood);

        assert!(board
            .best_request(&graph, &[], Wood, config.board_search_radius)
            .is_none());
    }

    #[test]
    fn removed_requester_drops_off_the_board() {
        let mut registry = EndpointRegistry::new();
        let mut graph = RoadGraph::new();
        let config = LogisticsConfig::default();
        road_row(&mut graph, 0..=10);

        let consumer = consumer_at(&mut registry, 5, Wood, 100);
        let mut board = RequestBoard::new();
        board.sync(&registry, &graph, &config);
        assert_eq!(board.len(), 1);

        board.remove_requester(consumer);
        assert!(board.is_empty());

        // sync after registry removal also drops stale entries.
        let other = consumer_at(&mut registry, 7, Wood, 100);
        board.sync(&registry, &graph, &config);
        assert!(board.get(other, Wood).is_some());
        registry.remove(other);
        board.sync(&registry, &graph, &config);
        assert!(board.is_empty());
    }
}
