//! A small town on one main street: raw producers feed processors, processors
//! feed households, and a depot catches the overflow and services shortages.
//!
//! Run with an optional tick count (default 3000):
//!
//! ```text
//! cargo run -p smalltown -- 5000
//! ```
//!
//! Completed deliveries are written to `deliveries.csv` in the working
//! directory.

use std::fs::File;

use tracing::info;

use haul_core::{CellCoord, EndpointId, Footprint, LogisticsConfig, ResourceKind, SimRng};
use haul_sim::{DeliveryLog, Sim, SimResult};
use haul_world::{Endpoint, InputStore, OutputStock};

use ResourceKind::{Food, Ore, Planks, Tools, Wood};

/// Endpoints of the demo town, in spawn order.
struct Town {
    lumber_camp: EndpointId,
    quarry: EndpointId,
    farm: EndpointId,
    mine: EndpointId,
    sawmill: EndpointId,
    toolsmith: EndpointId,
}

fn main() -> SimResult<()> {
    tracing_subscriber::fmt::init();

    let ticks: u64 = std::env::args()
        .nth(1)
        .and_then(|a| a.parse().ok())
        .unwrap_or(3000);

    let config = LogisticsConfig::default();
    let mut rng = SimRng::new(config.seed);
    let mut sim = Sim::new(config)?;

    // Main street, with a few paved (faster) stretches.
    for x in 0..=28 {
        let multiplier = if rng.chance(0.3) { 1.5 } else { 1.0 };
        sim.add_road(CellCoord::new(x, 0), multiplier)?;
    }

    let at = |x: i32| Footprint::single(CellCoord::new(x, 1));

    let town = Town {
        lumber_camp: sim.spawn_endpoint(
            Endpoint::new(at(2)).with_output(OutputStock::with_amount(Wood, 40, 20)),
        )?,
        quarry: sim.spawn_endpoint(
            Endpoint::new(at(6)).with_output(OutputStock::with_amount(ResourceKind::Stone, 40, 10)),
        )?,
        farm: sim.spawn_endpoint(
            Endpoint::new(at(10)).with_output(OutputStock::with_amount(Food, 60, 30)),
        )?,
        mine: sim.spawn_endpoint(
            Endpoint::new(at(24)).with_output(OutputStock::with_amount(Ore, 40, 10)),
        )?,
        sawmill: sim.spawn_endpoint(
            Endpoint::new(at(16))
                .with_input(InputStore::new(&[(Wood, 30)]))
                .with_output(OutputStock::new(Planks, 30)),
        )?,
        toolsmith: sim.spawn_endpoint(
            Endpoint::new(at(20))
                .with_input(InputStore::new(&[(Planks, 20), (Ore, 20)]))
                .with_output(OutputStock::new(Tools, 20)),
        )?,
    };

    let household_a =
        sim.spawn_endpoint(Endpoint::consumer(at(13), &[(Food, 40), (Tools, 10)]))?;
    let household_b =
        sim.spawn_endpoint(Endpoint::consumer(at(18), &[(Food, 40), (Tools, 10)]))?;
    let depot = sim.spawn_endpoint(Endpoint::depot(at(28), 200))?;

    for id in [
        town.lumber_camp,
        town.quarry,
        town.farm,
        town.mine,
        town.sawmill,
        town.toolsmith,
        depot,
    ] {
        sim.spawn_hauler(id)?;
    }

    let mut log = DeliveryLog::new(File::create("deliveries.csv")?)?;

    info!(ticks, "running small town");
    for t in 0..ticks {
        produce(&mut sim, &mut rng, &town, t);
        sim.tick(&mut log);
    }
    log.finish()?;

    for endpoint in sim.registry.iter() {
        let held: Vec<String> = ResourceKind::ALL
            .iter()
            .filter_map(|&kind| {
                let n = endpoint.available(kind)
                    + endpoint
                        .input
                        .as_ref()
                        .and_then(|i| i.slot(kind))
                        .map_or(0, |s| s.stored);
                (n > 0).then(|| format!("{kind}: {n}"))
            })
            .collect();
        info!(id = %endpoint.id, stock = held.join(", "), "final state");
    }
    info!(%household_a, %household_b, "demo finished; deliveries written to deliveries.csv");
    Ok(())
}

/// The host-side production step: raw piles grow over time and processors
/// convert delivered inputs into their outputs.
fn produce(sim: &mut Sim, rng: &mut SimRng, town: &Town, t: u64) {
    if t % 8 == 0 {
        grow(sim, town.lumber_camp, Wood, rng.gen_range(1..=3));
        grow(sim, town.quarry, ResourceKind::Stone, 1);
        grow(sim, town.farm, Food, rng.gen_range(2..=4));
        grow(sim, town.mine, Ore, 1);
    }
    if t % 10 == 0 {
        convert(sim, town.sawmill, &[(Wood, 2)], Planks, 2);
        convert(sim, town.toolsmith, &[(Planks, 1), (Ore, 1)], Tools, 1);
    }
}

fn grow(sim: &mut Sim, id: EndpointId, kind: ResourceKind, amount: u32) {
    if let Some(endpoint) = sim.registry.get_mut(id) {
        endpoint.restock_output(kind, amount);
    }
}

/// Consume `inputs` from the endpoint's own input store and produce `amount`
/// of `output`, only when every ingredient is available.
fn convert(
    sim: &mut Sim,
    id: EndpointId,
    inputs: &[(ResourceKind, u32)],
    output: ResourceKind,
    amount: u32,
) {
    let Some(endpoint) = sim.registry.get_mut(id) else {
        return;
    };
    let Some(store) = endpoint.input.as_mut() else {
        return;
    };
    let ready = inputs
        .iter()
        .all(|&(kind, n)| store.slot(kind).is_some_and(|s| s.stored >= n));
    if !ready {
        return;
    }
    for &(kind, n) in inputs {
        store.withdraw(kind, n);
    }
    endpoint.restock_output(output, amount);
}
