//! Unit tests for haul-core.

mod cell {
    use crate::cell::{CellCoord, Direction};

    #[test]
    fn neighbor_order_is_nesw() {
        let c = CellCoord::new(3, 7);
        assert_eq!(
            c.orthogonal_neighbors(),
            [
                CellCoord::new(3, 6), // north
                CellCoord::new(4, 7), // east
                CellCoord::new(3, 8), // south
                CellCoord::new(2, 7), // west
            ]
        );
    }

    #[test]
    fn manhattan_and_adjacency() {
        let a = CellCoord::new(0, 0);
        let b = CellCoord::new(3, -4);
        assert_eq!(a.manhattan(b), 7);
        assert!(a.is_adjacent(CellCoord::new(1, 0)));
        assert!(!a.is_adjacent(CellCoord::new(1, 1))); // diagonal
        assert!(!a.is_adjacent(a));
    }

    #[test]
    fn direction_between_adjacent_cells() {
        let c = CellCoord::new(0, 0);
        assert_eq!(
            Direction::between(c, CellCoord::new(0, -1)),
            Some(Direction::North)
        );
        assert_eq!(
            Direction::between(c, CellCoord::new(-1, 0)),
            Some(Direction::West)
        );
        assert_eq!(Direction::between(c, CellCoord::new(2, 0)), None);
    }
}

mod footprint {
    use crate::cell::{CellCoord, Footprint, Rotation};

    #[test]
    fn cells_cover_extent() {
        let fp = Footprint::new(CellCoord::new(1, 1), 2, 3, Rotation::R0);
        let cells = fp.cells();
        assert_eq!(cells.len(), 6);
        assert!(cells.contains(&CellCoord::new(1, 1)));
        assert!(cells.contains(&CellCoord::new(2, 3)));
        assert!(!cells.contains(&CellCoord::new(3, 1)));
    }

    #[test]
    fn rotation_swaps_axes() {
        let fp = Footprint::new(CellCoord::new(0, 0), 2, 3, Rotation::R90);
        assert_eq!(fp.extent(), (3, 2));
        assert!(fp.contains(CellCoord::new(2, 1)));
        assert!(!fp.contains(CellCoord::new(1, 2)));
    }

    #[test]
    fn perimeter_excludes_corners_and_interior() {
        let fp = Footprint::new(CellCoord::new(0, 0), 2, 2, Rotation::R0);
        let ring = fp.perimeter();
        assert_eq!(ring.len(), 8);
        // Edge-adjacent cell present; diagonal corner absent.
        assert!(ring.contains(&CellCoord::new(0, -1)));
        assert!(!ring.contains(&CellCoord::new(-1, -1)));
        // Footprint cells are not in their own perimeter.
        for cell in fp.cells() {
            assert!(!ring.contains(&cell));
        }
    }

    #[test]
    fn single_cell_center() {
        let fp = Footprint::single(CellCoord::new(5, 5));
        assert_eq!(fp.center(), CellCoord::new(5, 5));
        assert_eq!(fp.perimeter().len(), 4);
    }
}

mod time {
    use crate::time::Tick;

    #[test]
    fn arithmetic() {
        let t = Tick(10);
        assert_eq!(t.offset(5), Tick(15));
        assert_eq!(Tick(15).since(t), 5);
        assert_eq!(t + 3, Tick(13));
        assert_eq!(Tick(13) - t, 3);
    }

    #[test]
    fn advance() {
        let mut t = Tick::ZERO;
        t.advance();
        t.advance();
        assert_eq!(t, Tick(2));
    }
}

mod config {
    use crate::config::LogisticsConfig;

    #[test]
    fn default_is_valid() {
        assert!(LogisticsConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_hysteresis_rejected() {
        let cfg = LogisticsConfig {
            request_fill_threshold: 0.9,
            request_clear_threshold: 0.3,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn planner_bonus_exceeding_step_cost_rejected() {
        let mut cfg = LogisticsConfig::default();
        cfg.planner.road_reuse_bonus = cfg.planner.step_cost;
        assert!(cfg.validate().is_err());
    }
}

mod rng {
    use crate::rng::stagger;

    #[test]
    fn stagger_is_deterministic_and_bounded() {
        for salt in 0..100 {
            let a = stagger(42, salt, 16);
            let b = stagger(42, salt, 16);
            assert_eq!(a, b);
            assert!(a < 16);
        }
    }

    #[test]
    fn stagger_spreads_salts() {
        // Not a statistical test — just check consecutive salts don't all
        // collapse onto one phase.
        let phases: std::collections::HashSet<u64> =
            (0..16).map(|s| stagger(7, s, 16)).collect();
        assert!(phases.len() > 4);
    }
}

mod ids {
    use crate::ids::EndpointId;

    #[test]
    fn invalid_sentinel() {
        assert_eq!(EndpointId::default(), EndpointId::INVALID);
        assert_ne!(EndpointId(0), EndpointId::INVALID);
    }

    #[test]
    fn index_round_trip() {
        let id = EndpointId::try_from(12usize).unwrap();
        assert_eq!(id.index(), 12);
    }
}
