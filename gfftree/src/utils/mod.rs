//! Helpers shared across the crate.
//!
//! - The global rayon pool used by every traversal. Its size is read once
//!   from the `GFFTREE_NUM_THREADS` environment variable; unset or invalid
//!   values let rayon decide.
//! - Macros generating plain getters and builder-style `with_*` setters.

use log::debug;
use once_cell::sync::Lazy;
use rayon::{
    ThreadPool,
    ThreadPoolBuilder,
};

pub const NUM_THREADS_ENV: &str = "GFFTREE_NUM_THREADS";

pub static THREAD_POOL: Lazy<ThreadPool> = Lazy::new(|| {
    let num_threads: Option<usize> = std::env::var(NUM_THREADS_ENV)
        .ok()
        .and_then(|str| str.parse::<usize>().ok());
    let pool = ThreadPoolBuilder::new()
        .num_threads(num_threads.unwrap_or(0))
        .thread_name(|idx| format!("gfftree-{idx}"))
        .build()
        .expect("Failed to create thread pool");
    debug!("Traversal pool started with {} threads", pool.current_num_threads());
    pool
});

pub fn n_threads() -> usize {
    THREAD_POOL.current_num_threads()
}

#[macro_export]
macro_rules! getter_fn {
    ($field_name: ident, $field_type: ty) => {
        #[cfg_attr(coverage_nightly, coverage(off))]
        pub fn $field_name(&self) -> &$field_type {
            &self.$field_name
        }
    };
}
pub use getter_fn;

#[macro_export]
macro_rules! with_field_fn {
    ($field_name: ident, $field_type: ty) => {
        paste::paste! {
            #[cfg_attr(coverage_nightly, coverage(off))]
            pub fn [<with_$field_name>](mut self, value: $field_type) -> Self {
                self.$field_name = value;
                self
            }
        }
    };
}
pub use with_field_fn;
