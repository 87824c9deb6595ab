//! Typed indices into the topology arenas.
//!
//! Every record of the half-edge store lives in a `Vec` and is addressed by
//! position. The wrappers here keep vertex, half-edge, edge and face indices
//! apart at compile time. The underlying integer is generic ([`MeshIndex`]) so
//! small panels can use `u16` while large nets use `u32` or `u64`. The maximum
//! value of the integer is reserved as the "no element" sentinel, playing the
//! role of `-1` (for example the face of a boundary half-edge).

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Integer types usable as mesh indices.
pub trait MeshIndex:
    Copy + Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Debug + Send + Sync + 'static
{
    /// Largest index that can be stored.
    const MAX: Self;

    /// Sentinel for "no element".
    const INVALID: Self;

    /// Convert from usize.
    ///
    /// # Panics
    /// Debug builds panic if the value does not fit.
    fn from_usize(v: usize) -> Self;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// `true` unless this is the sentinel.
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_mesh_index {
    ($t:ty) => {
        impl MeshIndex for $t {
            const MAX: Self = <$t>::MAX - 1;
            const INVALID: Self = <$t>::MAX;

            #[inline]
            fn from_usize(v: usize) -> Self {
                debug_assert!(
                    v as u128 <= <$t as MeshIndex>::MAX as u128,
                    "index {} too large for {}",
                    v,
                    stringify!($t)
                );
                v as $t
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    };
}

impl_mesh_index!(u16);
impl_mesh_index!(u32);
impl_mesh_index!(u64);

/// Index of a vertex record.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// Index of a half-edge record.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// Index of an edge record (a pair of half-edges).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId<I: MeshIndex = u32>(I);

/// Index of a face record.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Wrap a raw position.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// The "no element" sentinel.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Position in the owning arena.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// The underlying integer.
            #[inline]
            pub fn raw(self) -> I {
                self.0
            }

            /// `true` unless this is the sentinel.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }

            /// `Some(self)` for a real element, `None` for the sentinel.
            #[inline]
            pub fn valid(self) -> Option<Self> {
                if self.is_valid() {
                    Some(self)
                } else {
                    None
                }
            }

            /// Signed form where the sentinel maps to `-1`.
            #[inline]
            pub fn signed(self) -> i64 {
                if self.is_valid() {
                    self.index() as i64
                } else {
                    -1
                }
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(-)", $display)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "HE");
impl_index_type!(EdgeId, "E");
impl_index_type!(FaceId, "F");

impl<I: MeshIndex> HalfEdgeId<I> {
    /// The other half-edge of the consecutive pair allocated with this one.
    #[inline]
    pub fn pair(self) -> Self {
        Self::new(self.index() ^ 1)
    }

    /// The edge owning this half-edge under consecutive-pair allocation.
    #[inline]
    pub fn pair_edge(self) -> EdgeId<I> {
        EdgeId::new(self.index() / 2)
    }
}
