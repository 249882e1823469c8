//! Lattice report and facade smoke run

use crate::settings::SmokeSettings;
use anyhow::{bail, Result};
use varray_core::{can_widen, facade, new_array, new_array_multi, ObjRef, ScalarKind, Value};

/// The widening table, rows are `from` and columns are `to`.
pub fn render_lattice() -> String {
    let mut out = String::from("from\\to");
    for to in ScalarKind::ALL {
        out.push_str(&format!("{:>6}", to.name()));
    }
    out.push('\n');
    for from in ScalarKind::ALL {
        out.push_str(&format!("{:<7}", from.name()));
        for to in ScalarKind::ALL {
            let mark = if can_widen(from, to) { "x" } else { "." };
            out.push_str(&format!("{mark:>6}"));
        }
        out.push('\n');
    }
    out
}

/// Narrowest kind that widens into `kind`, in table order.
fn narrowest_source(kind: ScalarKind) -> ScalarKind {
    ScalarKind::ALL
        .into_iter()
        .find(|&from| can_widen(from, kind))
        .unwrap_or(kind)
}

fn sample(kind: ScalarKind, index: usize) -> Value {
    Value::from_bits(kind, index as u64).unwrap_or_else(|| Value::from(ObjRef::new(index)))
}

/// Write every slot through the widening path and read it back.
pub fn run(settings: &SmokeSettings) -> Result<()> {
    let length = isize::try_from(settings.length)?;
    for &kind in &settings.kinds {
        let source = narrowest_source(kind);
        let mut array = new_array(kind, length)?;

        for index in 0..length {
            let value = sample(source, index as usize);
            facade::set(Some(&mut array), index, value.clone())?;
            let read = facade::get(Some(&array), index)?;
            let expected = value.widen(kind)?;
            if read != expected {
                bail!("{kind} slot {index}: wrote {expected:?}, read {read:?}");
            }
        }
        tracing::info!(%kind, %source, length, "smoke pass");
    }

    if !settings.extents.is_empty() {
        let grid = new_array_multi(ScalarKind::I32, &settings.extents)?;
        tracing::info!(
            extents = ?settings.extents,
            outer = grid.len(),
            component = %grid.component_type(),
            "multi-dimensional allocation"
        );
    }
    Ok(())
}
