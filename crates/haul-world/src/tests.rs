//! Unit tests for haul-world.

mod buffers {
    use haul_core::ResourceKind;

    use crate::buffers::{DepotStore, InputStore, OutputStock};

    #[test]
    fn output_withdraw_clamps() {
        let mut stock = OutputStock::with_amount(ResourceKind::Wood, 10, 4);
        assert_eq!(stock.withdraw(6), 4);
        assert_eq!(stock.available(), 0);
        assert_eq!(stock.withdraw(1), 0);
    }

    #[test]
    fn output_deposit_clamps_to_capacity() {
        let mut stock = OutputStock::new(ResourceKind::Stone, 5);
        assert_eq!(stock.deposit(8), 5);
        assert_eq!(stock.deposit(1), 0);
        assert!((stock.fill_ratio() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn input_partial_deposit() {
        let mut store = InputStore::new(&[(ResourceKind::Wood, 10)]);
        store.deposit(ResourceKind::Wood, 7);
        // Only 3 of 5 fit — the other 2 stay with the caller.
        assert_eq!(store.deposit(ResourceKind::Wood, 5), 3);
        assert_eq!(store.space_for(ResourceKind::Wood), 0);
        // No slot for the kind → nothing accepted.
        assert_eq!(store.deposit(ResourceKind::Food, 5), 0);
    }

    #[test]
    fn most_underfilled_ranks_ascending() {
        let mut store = InputStore::new(&[
            (ResourceKind::Wood, 10),
            (ResourceKind::Stone, 10),
            (ResourceKind::Food, 10),
        ]);
        store.deposit(ResourceKind::Wood, 8);
        store.deposit(ResourceKind::Stone, 2);
        store.deposit(ResourceKind::Food, 10); // full → excluded
        assert_eq!(
            store.most_underfilled(3),
            vec![ResourceKind::Stone, ResourceKind::Wood]
        );
        assert_eq!(store.most_underfilled(1), vec![ResourceKind::Stone]);
    }

    #[test]
    fn depot_per_kind_capacity() {
        let mut depot = DepotStore::new(20);
        assert_eq!(depot.deposit(ResourceKind::Wood, 25), 20);
        assert_eq!(depot.deposit(ResourceKind::Ore, 5), 5);
        assert_eq!(depot.total(), 25);
        assert_eq!(depot.withdraw(ResourceKind::Wood, 30), 20);
        assert_eq!(depot.amount(ResourceKind::Wood), 0);
    }
}

mod endpoint {
    use haul_core::{CellCoord, Footprint, ResourceKind};

    use crate::buffers::{InputStore, OutputStock};
    use crate::endpoint::Endpoint;

    fn fp() -> Footprint {
        Footprint::single(CellCoord::new(0, 0))
    }

    #[test]
    fn producer_capabilities() {
        let mut e = Endpoint::producer(fp(), ResourceKind::Wood, 10);
        assert_eq!(e.produced_kind(), Some(ResourceKind::Wood));
        assert!(!e.provides(ResourceKind::Wood)); // empty pile
        e.output.as_mut().unwrap().deposit(3);
        assert!(e.provides(ResourceKind::Wood));
        assert!(!e.provides(ResourceKind::Stone));
        assert!(!e.needs(ResourceKind::Wood));
    }

    #[test]
    fn depot_provides_but_never_needs() {
        let mut e = Endpoint::depot(fp(), 50);
        e.deposit(ResourceKind::Food, 10);
        assert!(e.provides(ResourceKind::Food));
        assert!(!e.needs(ResourceKind::Food));
        assert_eq!(e.delivery_space(ResourceKind::Food), 40);
    }

    #[test]
    fn workshop_consumes_and_produces() {
        // A sawmill: consumes wood, produces planks.
        let e = Endpoint::new(fp())
            .with_output(OutputStock::new(ResourceKind::Planks, 10))
            .with_input(InputStore::new(&[(ResourceKind::Wood, 20)]));
        assert!(e.needs(ResourceKind::Wood));
        assert_eq!(e.produced_kind(), Some(ResourceKind::Planks));
        assert_eq!(e.delivery_space(ResourceKind::Wood), 20);
        assert_eq!(e.delivery_space(ResourceKind::Planks), 0);
    }

    #[test]
    fn restock_output_prefers_own_pile() {
        let mut e = Endpoint::producer(fp(), ResourceKind::Wood, 10);
        assert_eq!(e.restock_output(ResourceKind::Wood, 4), 4);
        assert_eq!(e.output.as_ref().unwrap().available(), 4);
    }
}

mod registry {
    use haul_core::{CellCoord, Footprint, ResourceKind};

    use crate::endpoint::Endpoint;
    use crate::registry::EndpointRegistry;

    fn producer_at(x: i32) -> Endpoint {
        Endpoint::producer(
            Footprint::single(CellCoord::new(x, 0)),
            ResourceKind::Wood,
            10,
        )
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let mut reg = EndpointRegistry::new();
        let a = reg.insert(producer_at(0));
        let b = reg.insert(producer_at(1));
        assert_ne!(a, b);
        assert_eq!(reg.get(a).unwrap().id, a);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn remove_frees_slot_for_reuse() {
        let mut reg = EndpointRegistry::new();
        let a = reg.insert(producer_at(0));
        let _b = reg.insert(producer_at(1));
        assert!(reg.remove(a).is_some());
        assert!(!reg.contains(a));
        assert_eq!(reg.len(), 1);
        // Slot is reused; new endpoint gets the old index.
        let c = reg.insert(producer_at(2));
        assert_eq!(c, a);
        assert_eq!(reg.len(), 2);
        // Double-remove is a no-op.
        let d = reg.remove(c).unwrap();
        assert_eq!(d.footprint.root.x, 2);
        assert!(reg.remove(c).is_none());
    }

    #[test]
    fn capability_scans() {
        let mut reg = EndpointRegistry::new();
        reg.insert(producer_at(0));
        reg.insert(producer_at(1));
        reg.insert(Endpoint::consumer(
            Footprint::single(CellCoord::new(5, 0)),
            &[(ResourceKind::Wood, 10)],
        ));
        reg.insert(Endpoint::depot(Footprint::single(CellCoord::new(9, 0)), 50));
        assert_eq!(reg.count_producers(ResourceKind::Wood), 2);
        assert_eq!(reg.count_consumers(ResourceKind::Wood), 1);
        assert_eq!(reg.depots().count(), 1);
        assert_eq!(reg.count_producers(ResourceKind::Food), 0);
    }
}

mod grid {
    use haul_core::{CellCoord, EndpointId, Footprint, Rotation};

    use crate::grid::GridMap;

    #[test]
    fn footprint_blocks_roads_and_vice_versa() {
        let mut grid = GridMap::new();
        let fp = Footprint::new(CellCoord::new(0, 0), 2, 2, Rotation::R0);
        grid.place_footprint(&fp, EndpointId(0)).unwrap();
        assert!(grid.set_road(CellCoord::new(1, 1), 1.0).is_err());
        assert!(grid.set_road(CellCoord::new(2, 0), 1.0).is_ok());
        let fp2 = Footprint::new(CellCoord::new(2, 0), 1, 1, Rotation::R0);
        assert!(grid.place_footprint(&fp2, EndpointId(1)).is_err());
    }

    #[test]
    fn failed_placement_has_no_side_effects() {
        let mut grid = GridMap::new();
        grid.set_road(CellCoord::new(1, 0), 1.0).unwrap();
        let fp = Footprint::new(CellCoord::new(0, 0), 2, 1, Rotation::R0);
        assert!(grid.place_footprint(&fp, EndpointId(0)).is_err());
        assert!(!grid.is_occupied(CellCoord::new(0, 0)));
    }

    #[test]
    fn road_cells_sorted_and_speed_defaults() {
        let mut grid = GridMap::new();
        grid.set_road(CellCoord::new(3, 0), 2.0).unwrap();
        grid.set_road(CellCoord::new(1, 0), 1.0).unwrap();
        assert_eq!(
            grid.road_cells(),
            vec![CellCoord::new(1, 0), CellCoord::new(3, 0)]
        );
        assert_eq!(grid.speed_multiplier(CellCoord::new(3, 0)), 2.0);
        // Off-road cells report base speed.
        assert_eq!(grid.speed_multiplier(CellCoord::new(9, 9)), 1.0);
        assert!(grid.clear_road(CellCoord::new(1, 0)));
        assert!(!grid.clear_road(CellCoord::new(1, 0)));
    }
}
