//! Synthetic downward gamma flux.
//!
//! Stands in for the transport engine: per event it emits one primary, a
//! plausible chain of deposit steps down the stack, and a few interaction
//! and secondary records. Deterministic for a fixed seed regardless of the
//! worker layout, since each event reseeds from its own id.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use readout::{StepContext, VolumePath};
use recorder::{EventRecorder, EventSource, RowSink};
use types::{
    EventId, InteractionRecord, Plane, PrimaryRecord, RegionId, SecondaryRecord, TrackId, Vec3,
};

use crate::geometry::ToyGeometry;

const EVENT_SEED_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

pub struct FluxSource {
    geometry: ToyGeometry,
    seed: u64,
}

impl FluxSource {
    pub fn new(geometry: ToyGeometry, seed: u64) -> Self {
        Self { geometry, seed }
    }

    fn deposit(
        region: i32,
        path: VolumePath,
        edep_mev: f64,
        time_ns: f64,
        pos: Vec3,
        particle: &str,
        pdg: i32,
        track: i32,
        parent: i32,
    ) -> StepContext {
        StepContext {
            region: Some(RegionId(region)),
            edep_mev,
            time_ns,
            path,
            local_pos_mm: pos,
            particle: particle.to_string(),
            pdg,
            track_id: TrackId(track),
            parent_track_id: TrackId(parent),
            is_optical_photon: false,
            on_boundary: false,
        }
    }
}

impl EventSource for FluxSource {
    fn fill_event(
        &self,
        _worker: usize,
        event_id: EventId,
        rec: &mut EventRecorder<Box<dyn RowSink>>,
    ) {
        let mut rng = StdRng::seed_from_u64(self.seed ^ event_id.wrapping_mul(EVENT_SEED_MIX));
        let geo = &self.geometry;

        let energy_mev = rng.gen_range(0.2..2.0);
        let spawn = Vec3::new(
            rng.gen_range(-25.0..25.0),
            rng.gen_range(-25.0..25.0),
            300.0,
        );
        let dir = Vec3::new(
            rng.gen_range(-0.1..0.1),
            rng.gen_range(-0.1..0.1),
            -1.0,
        );
        rec.add_primary(PrimaryRecord {
            index: 0,
            name: "gamma".into(),
            pdg: 22,
            energy_mev,
            dir,
            pos_mm: spawn,
            t0_ns: 0.0,
        });

        // Both trigger panels fire on the way down.
        let segment = rng.gen_range(0..geo.trigger_segments);
        let panel_pos = Vec3::new(spawn.x, spawn.y, 0.0);
        rec.on_step(&Self::deposit(
            0,
            geo.trigger_path(true, segment),
            rng.gen_range(0.1..0.3),
            0.3,
            panel_pos,
            "e-",
            11,
            1,
            0,
        ));
        rec.on_step(&Self::deposit(
            1,
            geo.trigger_path(false, segment),
            rng.gen_range(0.1..0.3),
            0.9,
            panel_pos,
            "e-",
            11,
            1,
            0,
        ));

        // One struck fiber per plane, in the same module.
        let module = rng.gen_range(0..geo.fiber_modules);
        for (region, plane) in [(3, Plane::X), (5, Plane::Y)] {
            let layer = rng.gen_range(0..geo.fiber_layers);
            let row = rng.gen_range(0..geo.fiber_rows);
            rec.on_step(&Self::deposit(
                region,
                geo.fiber_path(plane, module, layer, row),
                rng.gen_range(0.02..0.08),
                0.6,
                panel_pos,
                "e-",
                11,
                1,
                0,
            ));
        }

        if rng.gen_bool(0.35) {
            rec.on_step(&Self::deposit(
                2,
                geo.veto_path(),
                rng.gen_range(0.1..1.0),
                1.1,
                panel_pos,
                "mu-",
                13,
                2,
                0,
            ));
        }

        // Calorimeter: several steps in one crystal, then sometimes a
        // secondary scattering into a neighbor.
        let ix = rng.gen_range(0..geo.crystal_rows);
        let iy = rng.gen_range(0..geo.crystal_rows);
        let steps = rng.gen_range(2..=4);
        for i in 0..steps {
            rec.on_step(&Self::deposit(
                6,
                geo.crystal_path(ix, iy),
                rng.gen_range(0.05..0.3),
                1.5 + 0.1 * i as f64,
                Vec3::new(spawn.x, spawn.y, 10.0),
                "e-",
                11,
                3,
                1,
            ));
        }

        rec.add_interaction(InteractionRecord {
            track_id: TrackId(1),
            parent_track_id: TrackId(0),
            process: "compt".into(),
            volume: "CsICrystalPV".into(),
            pos_mm: Vec3::new(spawn.x, spawn.y, 10.0),
            secondary_energy_mev: energy_mev * rng.gen_range(0.3..0.8),
        });
        rec.add_secondary(SecondaryRecord {
            track_id: TrackId(3),
            parent_track_id: TrackId(1),
            parent_name: "gamma".into(),
            parent_pdg: 22,
            process: "compt".into(),
            birth_volume: "CsICrystalPV".into(),
            name: "e-".into(),
            pdg: 11,
            energy_mev: energy_mev * 0.5,
            dir,
            t0_ns: 1.4,
        });
        // Ionization records exist in the stream but are filtered at drain.
        if rng.gen_bool(0.5) {
            rec.add_interaction(InteractionRecord {
                track_id: TrackId(3),
                parent_track_id: TrackId(1),
                process: "eIoni".into(),
                volume: "CsICrystalPV".into(),
                pos_mm: Vec3::new(spawn.x, spawn.y, 9.0),
                secondary_energy_mev: 0.02,
            });
        }

        if rng.gen_bool(0.3) {
            let jx = (ix + 1) % geo.crystal_rows;
            rec.on_step(&Self::deposit(
                6,
                geo.crystal_path(jx, iy),
                rng.gen_range(0.02..0.1),
                2.2,
                Vec3::new(spawn.x + 25.0, spawn.y, 10.0),
                "e-",
                11,
                4,
                3,
            ));
        }

        // Scintillation photons crossing fiber boundaries; dropped entirely
        // unless the run tracks optics.
        if rng.gen_bool(0.2) {
            let row = rng.gen_range(0..geo.fiber_rows);
            let mut optical = Self::deposit(
                3,
                geo.fiber_path(Plane::X, module, 0, row),
                0.0,
                0.7,
                panel_pos,
                "opticalphoton",
                0,
                5,
                1,
            );
            optical.is_optical_photon = true;
            optical.on_boundary = true;
            rec.on_step(&optical);
        }
    }
}
