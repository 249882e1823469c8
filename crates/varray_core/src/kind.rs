//! Scalar element kinds and the widening lattice
//!
//! Kinds form a closed set. The reachability table is derived once from the
//! direct edge list and is read-only for the rest of the process.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Element kind of an array slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ScalarKind {
    Bool = 0,
    I8 = 1,
    I16 = 2,
    /// UTF-16 code unit.
    Char = 3,
    I32 = 4,
    I64 = 5,
    F32 = 6,
    F64 = 7,
    /// Object reference (nullable).
    Obj = 8,
}

const KIND_COUNT: usize = 9;

/// Reachability table indexed by `[from][to]`.
pub type Lattice = [[bool; KIND_COUNT]; KIND_COUNT];

impl ScalarKind {
    /// Number of kinds.
    pub const COUNT: usize = KIND_COUNT;

    /// Every kind, in table order.
    pub const ALL: [ScalarKind; KIND_COUNT] = [
        ScalarKind::Bool,
        ScalarKind::I8,
        ScalarKind::I16,
        ScalarKind::Char,
        ScalarKind::I32,
        ScalarKind::I64,
        ScalarKind::F32,
        ScalarKind::F64,
        ScalarKind::Obj,
    ];

    /// Row/column of this kind in the lattice table.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::Char => "char",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Obj => "obj",
        }
    }

    /// Shorthand for [`can_widen`].
    #[inline]
    pub fn widens_to(self, to: ScalarKind) -> bool {
        can_widen(self, to)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direct widening edges. Identity and transitive pairs are added by closure.
const EDGES: &[(ScalarKind, ScalarKind)] = &[
    (ScalarKind::I8, ScalarKind::I16),
    (ScalarKind::I16, ScalarKind::I32),
    (ScalarKind::Char, ScalarKind::I32),
    (ScalarKind::I32, ScalarKind::I64),
    (ScalarKind::I64, ScalarKind::F32),
    (ScalarKind::F32, ScalarKind::F64),
];

static LATTICE: Lazy<Lattice> = Lazy::new(build_lattice);

fn build_lattice() -> Lattice {
    let mut reach = [[false; KIND_COUNT]; KIND_COUNT];
    for kind in ScalarKind::ALL {
        reach[kind.index()][kind.index()] = true;
    }
    for &(from, to) in EDGES {
        reach[from.index()][to.index()] = true;
    }

    // Warshall closure over the nine kinds.
    for via in 0..KIND_COUNT {
        for from in 0..KIND_COUNT {
            if !reach[from][via] {
                continue;
            }
            for to in 0..KIND_COUNT {
                if reach[via][to] {
                    reach[from][to] = true;
                }
            }
        }
    }
    reach
}

/// Returns true iff a value of kind `from` may be stored into a slot of kind `to`.
#[inline]
pub fn can_widen(from: ScalarKind, to: ScalarKind) -> bool {
    LATTICE[from.index()][to.index()]
}

/// The full reachability table, rows are `from` and columns are `to`.
pub fn lattice() -> &'static Lattice {
    &LATTICE
}

#[cfg(test)]
mod tests {
    use super::*;
    use ScalarKind::*;

    // Written out by hand, independent of the closure above.
    //            Bool   I8     I16    Char   I32    I64    F32    F64    Obj
    const EXPECTED: Lattice = [
        /* Bool */ [true, false, false, false, false, false, false, false, false],
        /* I8   */ [false, true, true, false, true, true, true, true, false],
        /* I16  */ [false, false, true, false, true, true, true, true, false],
        /* Char */ [false, false, false, true, true, true, true, true, false],
        /* I32  */ [false, false, false, false, true, true, true, true, false],
        /* I64  */ [false, false, false, false, false, true, true, true, false],
        /* F32  */ [false, false, false, false, false, false, true, true, false],
        /* F64  */ [false, false, false, false, false, false, false, true, false],
        /* Obj  */ [false, false, false, false, false, false, false, false, true],
    ];

    #[test]
    fn test_lattice_matches_expected_for_all_pairs() {
        for from in ScalarKind::ALL {
            for to in ScalarKind::ALL {
                assert_eq!(
                    can_widen(from, to),
                    EXPECTED[from.index()][to.index()],
                    "can_widen({from}, {to})"
                );
            }
        }
        assert_eq!(lattice(), &EXPECTED);
    }

    #[test]
    fn test_lattice_spot_checks() {
        assert!(can_widen(I8, F64));
        assert!(!can_widen(F64, I8));
        assert!(!can_widen(Bool, I32));
        assert!(can_widen(Char, I64));
        assert!(!can_widen(I16, Char));
        assert!(!can_widen(Char, I16));
        assert!(!can_widen(I8, Char));
        assert!(!can_widen(I32, Obj));
        assert!(I16.widens_to(F32));
    }

    #[test]
    fn test_kind_index_follows_table_order() {
        for (position, kind) in ScalarKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), position);
        }
    }

    #[test]
    fn test_kind_serde_names() {
        let json = serde_json::to_string(&[Char, F64, Obj]).unwrap();
        assert_eq!(json, r#"["char","f64","obj"]"#);
        let kinds: Vec<ScalarKind> = serde_json::from_str(r#"["bool","i16"]"#).unwrap();
        assert_eq!(kinds, vec![Bool, I16]);
    }
}
