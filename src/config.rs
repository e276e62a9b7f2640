use core::{
    fmt::{self, Debug, Formatter},
    ops::{BitOr, BitOrAssign},
};

/// Config for a single registration
/// ## Fields
/// - `cache_provides`:
///   If `true`, the instance produced by the definition (after inflectors and decorators) will be cached and reused
///   until the identifier is refreshed.
///
///   This does **not** affect the dependencies of the instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub cache_provides: bool,
}

impl Config {
    #[inline]
    #[must_use]
    pub(crate) const fn from_flags(flags: Flags) -> Self {
        Self {
            cache_provides: flags.contains(Flags::CACHE_MODE),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_flags(Flags::default())
    }
}

/// Container-wide behaviour switches, fixed at construction.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flags(u8);

impl Flags {
    /// Type names passed to `register` (as the concrete, or as the identifier with no concrete)
    /// are built by the autowire factory.
    pub const LAZY_BINDING: Self = Self(1);
    /// Any known class can be fetched, even without a registration. Such resolutions are never cached.
    pub const EXTRA_LAZY_BINDING: Self = Self(2);
    /// Resolutions are cached by default.
    pub const CACHE_MODE: Self = Self(4);
    /// The container registers itself under [`crate::Container::ID`].
    pub const REGISTER_CONTAINER: Self = Self(8);

    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    #[must_use]
    pub const fn all() -> Self {
        Self(Self::LAZY_BINDING.0 | Self::EXTRA_LAZY_BINDING.0 | Self::CACHE_MODE.0 | Self::REGISTER_CONTAINER.0)
    }

    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Unknown bits are dropped.
    #[inline]
    #[must_use]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::all().0)
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for Flags {
    /// Lazy binding, extra lazy binding and cache mode.
    fn default() -> Self {
        Self::LAZY_BINDING.union(Self::EXTRA_LAZY_BINDING).union(Self::CACHE_MODE)
    }
}

impl BitOr for Flags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Flags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl Debug for Flags {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        const NAMES: [(Flags, &str); 4] = [
            (Flags::LAZY_BINDING, "LAZY_BINDING"),
            (Flags::EXTRA_LAZY_BINDING, "EXTRA_LAZY_BINDING"),
            (Flags::CACHE_MODE, "CACHE_MODE"),
            (Flags::REGISTER_CONTAINER, "REGISTER_CONTAINER"),
        ];

        let mut set = f.debug_set();
        for (flag, name) in NAMES {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
            }
        }
        set.finish()
    }
}
