//! Identifier newtypes for the registry arrays.
//!
//! Everything in the simulation is cross-referenced by position: a track
//! names its endpoint junctions by slot, a ticket names a worker by slot,
//! and the input format itself is positional.  Wrapping the raw offsets
//! keeps the six namespaces apart at compile time while the value stays a
//! bare `u32` that fits in an atomic cell.
//!
//! The wrappers are deliberately minimal — construct with `TrackId(n)`,
//! read back with `.0` or [`index`](TrackId::index) — because the registry
//! validates every reference once at assembly time and the running tasks
//! only ever pass ids around.

macro_rules! registry_ids {
    ($($(#[$doc:meta])* $name:ident),+ $(,)?) => {$(
        $(#[$doc])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        pub struct $name(pub u32);

        impl $name {
            /// This id as an offset into its registry array.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    )+};
}

registry_ids! {
    /// A junction slot: both a topology node and the turntable occupying it.
    JunctionId,
    /// A slot in the flat track array (turntables first, then segments,
    /// then platforms).
    TrackId,
    /// A station slot.
    StationId,
    /// A train slot.
    TrainId,
    /// A repair-team slot.
    TeamId,
    /// A worker slot.
    WorkerId,
}
