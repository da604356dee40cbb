//! Built-in admission and eviction strategies.
//!
//! | Module        | Strategy                                         |
//! |---------------|--------------------------------------------------|
//! | [`admission`] | `NeverAdmit`, `AlwaysAdmit`, `RateLimited`, `AmountLimited` |
//! | [`lru`]       | lowest completed-usage count                     |
//! | [`aging`]     | lowest exponentially decayed recency             |
//! | [`random`]    | uniformly random idle instance                   |

pub mod admission;
pub mod aging;
pub mod lru;
pub mod random;
