//! Model-View-Intent (MVI) primitives shared by every model.
//!
//! A model's slice only moves forward through reducers:
//!
//! ```text
//! Intent ──→ Reducer ──→ ModelData ──→ Subscription
//!    ↑                                     │
//!    └─────────────────────────────────────┘
//! ```
//!
//! - **ModelData**: the value held by one slice of the store
//! - **Intent**: a payload describing one requested change
//! - **Reducer**: pure function folding an intent into the data

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::ModelData;
