//! Filesystem locations used by configuration and logging.

pub mod xdg;
