//! Request-scoped caches.
//!
//! Both caches live inside a single [ServiceRequest](crate::ServiceRequest) and are dropped with
//! it. Remote documents may change between query evaluations, so nothing cached here is ever
//! visible to another evaluation.
//!
//! Each entry is a [OnceCell](tokio::sync::OnceCell) such that concurrent callers asking for the
//! same key wait for a single computation instead of repeating it.

mod graph;
mod invocation;

pub use graph::GraphCache;
pub use invocation::InvocationDedupCache;

use dashmap::DashMap;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;

pub(crate) type FxDashMap<K, V> = DashMap<K, V, BuildHasherDefault<FxHasher>>;
