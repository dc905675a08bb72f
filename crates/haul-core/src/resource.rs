//! The closed set of transportable goods.

use std::fmt;

/// A kind of raw material or finished good moved by the logistics subsystem.
///
/// Kept as a closed enum rather than an interned string: routing tables and
/// cargo slots store it by value, and a `u8`-sized discriminant keeps those
/// structures compact.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceKind {
    Wood,
    Stone,
    Ore,
    Planks,
    Tools,
    Food,
}

impl ResourceKind {
    /// Number of kinds; the bound for dense per-kind arrays.
    pub const COUNT: usize = 6;

    /// Every kind, in declaration order (stable iteration for routing passes).
    pub const ALL: [ResourceKind; Self::COUNT] = [
        ResourceKind::Wood,
        ResourceKind::Stone,
        ResourceKind::Ore,
        ResourceKind::Planks,
        ResourceKind::Tools,
        ResourceKind::Food,
    ];

    /// Dense index in `0..COUNT` for per-kind array storage.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn label(self) -> &'static str {
        match self {
            ResourceKind::Wood => "wood",
            ResourceKind::Stone => "stone",
            ResourceKind::Ore => "ore",
            ResourceKind::Planks => "planks",
            ResourceKind::Tools => "tools",
            ResourceKind::Food => "food",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
