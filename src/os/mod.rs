cfg_if::cfg_if! {
    if #[cfg(unix)]{
        pub(crate) mod unix;
        pub use unix::*;
    }else {
        pub(crate) mod baremetal;
        pub use baremetal::*;
    }
}
