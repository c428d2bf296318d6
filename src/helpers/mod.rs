//! Presentation helpers used when rendering model pages.
//!
//! Everything here is a pure function of its inputs. Markup is returned as
//! [`Html`], which is only ever built from escaped text.

mod badges;
mod grouping;
mod html;
mod licenses;

pub use badges::*;
pub use grouping::*;
pub use html::*;
pub use licenses::*;
