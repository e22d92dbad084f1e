//! Right-hand value resolution: constants, sigils, `Add` folding and
//! coercion to the compared field's type.

mod add;
mod coercion;
mod sigil;
mod value;

pub(crate) use coercion::coerce;
pub(crate) use value::right_hand_side;
